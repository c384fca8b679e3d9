//! The appearance resolver: decides and applies the page transform.
//!
//! # Decision
//!
//! For the current page the resolver:
//!
//! 1. Takes the page's hostname; an empty hostname means inactive.
//! 2. Looks up the site override; no override means inactive.
//! 3. Resolves the requested mode to a scheme (`system` follows the OS).
//! 4. Samples the page's native brightness, once per resolver.
//! 5. Inverts exactly when the page's brightness disagrees with the scheme.
//!
//! Steps 1–3 and 5 are the pure function [`decide`]. Step 4 is
//! [`compute_page_is_dark`], memoized in the resolver.
//!
//! # Application
//!
//! An active decision ensures a single managed stylesheet exists and then
//! writes the scheme and invert attributes on the root element, skipping
//! writes whose value is already present. An inactive decision removes both
//! attributes and the stylesheet. Every pass recomputes from scratch and
//! overwrites, so the order in which events arrive does not matter.
//!
//! # Brightness memo
//!
//! The brightness sample is taken on the first *active* resolution and kept
//! for the resolver's lifetime: OS preference changes and settings changes
//! reuse it. A page that changes its own background after load keeps the
//! original decision until a new resolver is created (a page reload).
//!
//! ```rust
//! use nocturne_render::{AppearanceResolver, MemoryPage, Resolution, ResolverConfig, ThemeScheme};
//! use serde_json::json;
//!
//! let page = MemoryPage::new("https://example.com/").with_body_background("rgb(255, 255, 255)");
//! let mut resolver = AppearanceResolver::new(page, ResolverConfig::default());
//!
//! let resolution = resolver.settings_changed(&json!({
//!     "defaultMode": "system",
//!     "siteOverrides": { "example.com": "dark" }
//! }));
//!
//! let theme = resolution.applied().unwrap();
//! assert_eq!(theme.scheme, ThemeScheme::Dark);
//! assert!(theme.invert);
//! ```

use once_cell::unsync::OnceCell;
use serde::Serialize;
use serde_json::Value;

use crate::colorspace::{is_dark, relative_luminance, Rgb};
use crate::config::ResolverConfig;
use crate::page::{DocumentSurface, ElementTarget, PageSignals};
use crate::style::{parse_css_color, ThemeAttributes};
use crate::theme::{normalize, ThemeScheme, ThemeSettings};

/// The transform applied to an active page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AppliedTheme {
    /// The resolved scheme.
    pub scheme: ThemeScheme,
    /// Whether the page is color-inverted.
    pub invert: bool,
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// No override applies; the document carries no theme state.
    Inactive,
    /// An override applies and this theme is on the document.
    Active(AppliedTheme),
}

impl Resolution {
    /// The applied theme, if active.
    pub fn applied(&self) -> Option<AppliedTheme> {
        match self {
            Resolution::Inactive => None,
            Resolution::Active(theme) => Some(*theme),
        }
    }

    /// Whether a theme is applied.
    pub fn is_active(&self) -> bool {
        matches!(self, Resolution::Active(_))
    }
}

/// Decides the theme for a hostname.
///
/// `page_is_dark` is only called when an override applies, so callers can
/// defer brightness sampling until it is needed.
pub fn decide(
    settings: &ThemeSettings,
    hostname: &str,
    prefers_dark: bool,
    page_is_dark: impl FnOnce() -> bool,
) -> Resolution {
    if hostname.is_empty() {
        return Resolution::Inactive;
    }
    let Some(mode) = settings.override_for(hostname) else {
        return Resolution::Inactive;
    };

    let scheme = mode.resolve(prefers_dark);
    Resolution::Active(AppliedTheme {
        scheme,
        invert: scheme.needs_inversion(page_is_dark()),
    })
}

/// The page's effective native background.
///
/// Tries the body's computed background, then the root's, skipping colors
/// that are unparseable or near-transparent, and falls back to the
/// configured background (white by default).
pub fn sample_background<P: PageSignals + ?Sized>(page: &P, config: &ResolverConfig) -> Rgb {
    for target in [ElementTarget::Body, ElementTarget::Root] {
        let raw = page.computed_background(target);
        match raw.as_deref().and_then(parse_css_color) {
            Some(color) if !color.is_transparent(config.transparent_alpha) => {
                tracing::trace!(?target, rgb = ?color.rgb, "sampled page background");
                return color.rgb;
            }
            Some(color) => {
                tracing::trace!(?target, alpha = color.alpha, "background is transparent")
            }
            None => tracing::trace!(?target, raw = ?raw, "no background color detected"),
        }
    }
    tracing::trace!(rgb = ?config.fallback_background, "using fallback background");
    config.fallback_background
}

/// Whether the page's native background is dark.
pub fn compute_page_is_dark<P: PageSignals + ?Sized>(page: &P, config: &ResolverConfig) -> bool {
    let background = sample_background(page, config);
    let dark = is_dark(background, config.dark_threshold);
    tracing::debug!(
        luminance = relative_luminance(background),
        page_is_dark = dark,
        "sampled page brightness"
    );
    dark
}

/// Resolves and applies the theme for one page.
///
/// Owns the page handle, the latest normalized settings, the latest OS
/// preference, and the brightness memo.
#[derive(Debug)]
pub struct AppearanceResolver<P> {
    page: P,
    config: ResolverConfig,
    attributes: ThemeAttributes,
    stylesheet: String,
    settings: ThemeSettings,
    prefers_dark: bool,
    page_is_dark: OnceCell<bool>,
}

impl<P: PageSignals + DocumentSurface> AppearanceResolver<P> {
    /// Creates a resolver with default settings and a light OS preference.
    ///
    /// Nothing is written to the page until the first resolution.
    pub fn new(page: P, config: ResolverConfig) -> Self {
        Self {
            attributes: config.attributes(),
            stylesheet: config.stylesheet(),
            page,
            config,
            settings: ThemeSettings::default(),
            prefers_dark: false,
            page_is_dark: OnceCell::new(),
        }
    }

    /// Sets the initial OS preference without resolving.
    pub fn with_prefers_dark(mut self, prefers_dark: bool) -> Self {
        self.prefers_dark = prefers_dark;
        self
    }

    /// Handles a settings-store notification carrying the raw new value.
    pub fn settings_changed(&mut self, raw: &Value) -> Resolution {
        self.settings = normalize(raw);
        self.resolve()
    }

    /// Handles an OS dark-preference change.
    pub fn scheme_preference_changed(&mut self, prefers_dark: bool) -> Resolution {
        self.prefers_dark = prefers_dark;
        self.resolve()
    }

    /// Recomputes the decision and writes it to the document.
    pub fn resolve(&mut self) -> Resolution {
        let hostname = self.page.hostname();
        let resolution = decide(&self.settings, &hostname, self.prefers_dark, || {
            self.page_is_dark()
        });

        match resolution {
            Resolution::Inactive => self.clear(),
            Resolution::Active(theme) => self.apply(theme),
        }
        tracing::debug!(hostname = %hostname, ?resolution, "resolved appearance");
        resolution
    }

    /// The memoized brightness sample, taken now if not yet taken.
    pub fn page_is_dark(&self) -> bool {
        *self
            .page_is_dark
            .get_or_init(|| compute_page_is_dark(&self.page, &self.config))
    }

    /// Whether the brightness sample has been taken.
    pub fn is_brightness_sampled(&self) -> bool {
        self.page_is_dark.get().is_some()
    }

    /// The theme currently on the document, read back from its attributes.
    pub fn applied(&self) -> Option<AppliedTheme> {
        let scheme = match self.page.root_attribute(&self.attributes.scheme)?.as_str() {
            "light" => ThemeScheme::Light,
            "dark" => ThemeScheme::Dark,
            _ => return None,
        };
        let invert = self.page.root_attribute(&self.attributes.invert).as_deref() == Some("true");
        Some(AppliedTheme { scheme, invert })
    }

    /// The current normalized settings.
    pub fn settings(&self) -> &ThemeSettings {
        &self.settings
    }

    /// The last known OS preference.
    pub fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    /// The resolver's configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The managed stylesheet text.
    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    /// The page handle.
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Mutable access to the page handle.
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// Consumes the resolver, returning the page handle.
    pub fn into_page(self) -> P {
        self.page
    }

    fn apply(&mut self, theme: AppliedTheme) {
        let id = &self.config.stylesheet_id;
        if !self.page.has_stylesheet(id) {
            self.page.insert_stylesheet(id, &self.stylesheet);
        }
        write_attribute(&mut self.page, &self.attributes.scheme, theme.scheme.as_str());
        write_attribute(
            &mut self.page,
            &self.attributes.invert,
            if theme.invert { "true" } else { "false" },
        );
    }

    fn clear(&mut self) {
        for name in [&self.attributes.scheme, &self.attributes.invert] {
            if self.page.root_attribute(name).is_some() {
                self.page.remove_root_attribute(name);
            }
        }
        if self.page.has_stylesheet(&self.config.stylesheet_id) {
            self.page.remove_stylesheet(&self.config.stylesheet_id);
        }
    }
}

fn write_attribute<P: DocumentSurface>(page: &mut P, name: &str, value: &str) {
    if page.root_attribute(name).as_deref() != Some(value) {
        page.set_root_attribute(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;
    use crate::theme::ThemeMode;

    fn settings_with(host: &str, mode: ThemeMode) -> ThemeSettings {
        let mut settings = ThemeSettings::default();
        settings.set_site_override(host, mode);
        settings
    }

    #[test]
    fn test_decide_empty_hostname_is_inactive() {
        let mut settings = ThemeSettings::default();
        settings.site_overrides.insert(String::new(), ThemeMode::Dark);
        assert_eq!(
            decide(&settings, "", false, || false),
            Resolution::Inactive
        );
    }

    #[test]
    fn test_decide_without_override_does_not_sample() {
        let settings = settings_with("example.com", ThemeMode::Dark);
        let resolution = decide(&settings, "other.example", false, || {
            panic!("brightness must not be sampled")
        });
        assert_eq!(resolution, Resolution::Inactive);
    }

    #[test]
    fn test_decide_system_mode_follows_os() {
        let settings = settings_with("example.com", ThemeMode::System);
        let dark = decide(&settings, "example.com", true, || false);
        assert_eq!(
            dark.applied(),
            Some(AppliedTheme {
                scheme: ThemeScheme::Dark,
                invert: true
            })
        );
        let light = decide(&settings, "example.com", false, || false);
        assert_eq!(
            light.applied(),
            Some(AppliedTheme {
                scheme: ThemeScheme::Light,
                invert: false
            })
        );
    }

    #[test]
    fn test_decide_light_mode_on_dark_page_inverts() {
        let settings = settings_with("example.com", ThemeMode::Light);
        let resolution = decide(&settings, "example.com", true, || true);
        assert_eq!(
            resolution.applied(),
            Some(AppliedTheme {
                scheme: ThemeScheme::Light,
                invert: true
            })
        );
    }

    #[test]
    fn test_sample_prefers_body() {
        let page = MemoryPage::new("https://example.com/")
            .with_body_background("rgb(10, 10, 10)")
            .with_root_background("rgb(255, 255, 255)");
        assert_eq!(
            sample_background(&page, &ResolverConfig::default()),
            Rgb(10, 10, 10)
        );
    }

    #[test]
    fn test_sample_skips_transparent_body() {
        let page = MemoryPage::new("https://example.com/")
            .with_body_background("rgba(0, 0, 0, 0)")
            .with_root_background("rgb(20, 20, 20)");
        assert_eq!(
            sample_background(&page, &ResolverConfig::default()),
            Rgb(20, 20, 20)
        );
    }

    #[test]
    fn test_sample_skips_unparseable_body() {
        let page = MemoryPage::new("https://example.com/")
            .with_body_background("black")
            .with_root_background("rgb(30, 30, 30)");
        assert_eq!(
            sample_background(&page, &ResolverConfig::default()),
            Rgb(30, 30, 30)
        );
    }

    #[test]
    fn test_sample_falls_back_to_white() {
        let page = MemoryPage::new("https://example.com/")
            .with_body_background("rgba(0, 0, 0, 0.05)")
            .with_root_background("transparent");
        assert_eq!(
            sample_background(&page, &ResolverConfig::default()),
            Rgb::WHITE
        );
        assert!(!compute_page_is_dark(&page, &ResolverConfig::default()));
    }

    #[test]
    fn test_sample_uses_configured_fallback() {
        let config = ResolverConfig {
            fallback_background: Rgb(0, 0, 0),
            ..ResolverConfig::default()
        };
        let page = MemoryPage::new("https://example.com/");
        assert!(compute_page_is_dark(&page, &config));
    }

    #[test]
    fn test_brightness_sampled_lazily() {
        let page = MemoryPage::new("https://example.com/");
        let mut resolver = AppearanceResolver::new(page, ResolverConfig::default());
        assert!(!resolver.is_brightness_sampled());

        resolver.resolve();
        assert!(!resolver.is_brightness_sampled());

        resolver.settings_changed(&serde_json::json!({
            "siteOverrides": { "example.com": "dark" }
        }));
        assert!(resolver.is_brightness_sampled());
    }

    #[test]
    fn test_applied_reads_back_attributes() {
        let page = MemoryPage::new("https://example.com/").with_body_background("rgb(0, 0, 0)");
        let mut resolver = AppearanceResolver::new(page, ResolverConfig::default());
        assert_eq!(resolver.applied(), None);

        let resolution = resolver.settings_changed(&serde_json::json!({
            "siteOverrides": { "example.com": "light" }
        }));
        assert_eq!(resolver.applied(), resolution.applied());
        assert_eq!(
            resolver.page().root_attribute("data-nocturne-invert").as_deref(),
            Some("true")
        );
    }
}
