//! The managed stylesheet and its media compensation policy.
//!
//! When a page is inverted, the whole document gets an `invert + hue-rotate`
//! filter. Photos, video and other embedded media would come out as
//! negatives, so the same filter is applied to them a second time: two
//! inversions cancel, and media keep their natural colors while everything
//! around them flips.
//!
//! Which elements get that compensating filter is a policy table,
//! [`CompensationPolicy`], from [`ElementCategory`] to a yes/no flag. The
//! default compensates every media category except `<picture>`, whose inner
//! `<img>` is already compensated (compensating both would invert it back).
//!
//! The stylesheet text depends only on configuration. The active scheme and
//! the invert flag live in root-element attributes, matched by attribute
//! selectors, so switching scheme never rewrites the stylesheet.
//!
//! ```rust
//! use nocturne_render::style::{build_stylesheet, CompensationPolicy, ThemeAttributes};
//!
//! let attributes = ThemeAttributes::with_prefix("data-nocturne");
//! let css = build_stylesheet(
//!     &attributes,
//!     "invert(1) hue-rotate(180deg)",
//!     &CompensationPolicy::default(),
//! );
//! assert!(css.contains(r#"html[data-nocturne-scheme="dark"] { color-scheme: dark; }"#));
//! assert!(css.contains(":is(img, svg, video, canvas, iframe, embed, object)"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A category of embedded content that may need compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    /// `<img>`
    Image,
    /// `<picture>`
    Picture,
    /// Inline `<svg>`
    Svg,
    /// `<video>`
    Video,
    /// `<canvas>`
    Canvas,
    /// `<iframe>`
    Iframe,
    /// `<embed>`
    Embed,
    /// `<object>`
    Object,
}

impl ElementCategory {
    /// All categories, in selector order.
    pub const ALL: [ElementCategory; 8] = [
        ElementCategory::Image,
        ElementCategory::Picture,
        ElementCategory::Svg,
        ElementCategory::Video,
        ElementCategory::Canvas,
        ElementCategory::Iframe,
        ElementCategory::Embed,
        ElementCategory::Object,
    ];

    /// The CSS type selector matching this category.
    pub fn selector(self) -> &'static str {
        match self {
            ElementCategory::Image => "img",
            ElementCategory::Picture => "picture",
            ElementCategory::Svg => "svg",
            ElementCategory::Video => "video",
            ElementCategory::Canvas => "canvas",
            ElementCategory::Iframe => "iframe",
            ElementCategory::Embed => "embed",
            ElementCategory::Object => "object",
        }
    }
}

/// Which element categories receive the compensating filter.
///
/// Deserializing merges the given entries over [`Default`], so a config
/// only needs to list the categories it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ElementCategory, bool>",
    into = "BTreeMap<ElementCategory, bool>"
)]
pub struct CompensationPolicy {
    table: BTreeMap<ElementCategory, bool>,
}

impl CompensationPolicy {
    /// A policy that compensates nothing.
    pub fn none() -> Self {
        Self {
            table: ElementCategory::ALL
                .iter()
                .map(|category| (*category, false))
                .collect(),
        }
    }

    /// Sets the flag for one category, returning the policy for chaining.
    pub fn with(mut self, category: ElementCategory, compensate: bool) -> Self {
        self.table.insert(category, compensate);
        self
    }

    /// Whether `category` is compensated.
    pub fn compensates(&self, category: ElementCategory) -> bool {
        self.table.get(&category).copied().unwrap_or(false)
    }

    /// Selectors of the compensated categories, in [`ElementCategory::ALL`] order.
    pub fn selectors(&self) -> Vec<&'static str> {
        ElementCategory::ALL
            .iter()
            .filter(|category| self.compensates(**category))
            .map(|category| category.selector())
            .collect()
    }
}

impl Default for CompensationPolicy {
    fn default() -> Self {
        ElementCategory::ALL
            .iter()
            .fold(Self::none(), |policy, category| {
                policy.with(*category, *category != ElementCategory::Picture)
            })
    }
}

impl From<BTreeMap<ElementCategory, bool>> for CompensationPolicy {
    fn from(entries: BTreeMap<ElementCategory, bool>) -> Self {
        entries
            .into_iter()
            .fold(Self::default(), |policy, (category, compensate)| {
                policy.with(category, compensate)
            })
    }
}

impl From<CompensationPolicy> for BTreeMap<ElementCategory, bool> {
    fn from(policy: CompensationPolicy) -> Self {
        policy.table
    }
}

/// Names of the two root-element attributes carrying the applied theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeAttributes {
    /// Holds the resolved scheme, `light` or `dark`.
    pub scheme: String,
    /// Holds `true` or `false`.
    pub invert: String,
}

impl ThemeAttributes {
    /// Derives `<prefix>-scheme` and `<prefix>-invert`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            scheme: format!("{}-scheme", prefix),
            invert: format!("{}-invert", prefix),
        }
    }
}

/// Renders the managed stylesheet.
pub fn build_stylesheet(
    attributes: &ThemeAttributes,
    filter: &str,
    policy: &CompensationPolicy,
) -> String {
    let mut css = String::new();
    for scheme in ["light", "dark"] {
        css.push_str(&format!(
            "html[{}=\"{}\"] {{ color-scheme: {}; }}\n",
            attributes.scheme, scheme, scheme
        ));
    }

    let inverted = format!("html[{}=\"true\"]", attributes.invert);
    css.push_str(&format!("{} {{ filter: {}; }}\n", inverted, filter));

    let selectors = policy.selectors();
    if !selectors.is_empty() {
        css.push_str(&format!(
            "{} :is({}) {{ filter: {}; }}\n",
            inverted,
            selectors.join(", "),
            filter
        ));
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILTER: &str = "invert(1) hue-rotate(180deg)";

    #[test]
    fn test_default_policy_skips_picture() {
        let policy = CompensationPolicy::default();
        assert!(!policy.compensates(ElementCategory::Picture));
        for category in ElementCategory::ALL {
            if category != ElementCategory::Picture {
                assert!(policy.compensates(category), "{:?}", category);
            }
        }
    }

    #[test]
    fn test_policy_none() {
        assert!(CompensationPolicy::none().selectors().is_empty());
    }

    #[test]
    fn test_policy_with_overrides_entry() {
        let policy = CompensationPolicy::default()
            .with(ElementCategory::Iframe, false)
            .with(ElementCategory::Picture, true);
        assert_eq!(
            policy.selectors(),
            vec!["img", "picture", "svg", "video", "canvas", "embed", "object"]
        );
    }

    #[test]
    fn test_policy_deserialize_merges_over_default() {
        let policy: CompensationPolicy = serde_yaml::from_str("iframe: false\n").unwrap();
        assert!(!policy.compensates(ElementCategory::Iframe));
        assert!(policy.compensates(ElementCategory::Video));
        assert!(!policy.compensates(ElementCategory::Picture));
    }

    #[test]
    fn test_policy_serializes_full_table() {
        let value = serde_json::to_value(CompensationPolicy::default()).unwrap();
        let table = value.as_object().unwrap();
        assert_eq!(table.len(), ElementCategory::ALL.len());
        assert_eq!(table["picture"], serde_json::json!(false));
    }

    #[test]
    fn test_attribute_names() {
        let attributes = ThemeAttributes::with_prefix("data-x");
        assert_eq!(attributes.scheme, "data-x-scheme");
        assert_eq!(attributes.invert, "data-x-invert");
    }

    #[test]
    fn test_stylesheet_rules() {
        let css = build_stylesheet(
            &ThemeAttributes::with_prefix("data-nocturne"),
            FILTER,
            &CompensationPolicy::default(),
        );
        let lines: Vec<&str> = css.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"html[data-nocturne-scheme="light"] { color-scheme: light; }"#,
                r#"html[data-nocturne-scheme="dark"] { color-scheme: dark; }"#,
                r#"html[data-nocturne-invert="true"] { filter: invert(1) hue-rotate(180deg); }"#,
                r#"html[data-nocturne-invert="true"] :is(img, svg, video, canvas, iframe, embed, object) { filter: invert(1) hue-rotate(180deg); }"#,
            ]
        );
    }

    #[test]
    fn test_stylesheet_without_compensation() {
        let css = build_stylesheet(
            &ThemeAttributes::with_prefix("data-nocturne"),
            FILTER,
            &CompensationPolicy::none(),
        );
        assert_eq!(css.lines().count(), 3);
        assert!(!css.contains(":is("));
    }
}
