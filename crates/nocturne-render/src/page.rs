//! Abstractions over the page the engine is running in.
//!
//! The resolver never touches a browser directly. It reads page signals
//! through [`PageSignals`] and writes its result through
//! [`DocumentSurface`]. A browser build implements both over the real DOM
//! (see the `web` feature); tests and the CLI use [`MemoryPage`], which
//! records every mutation so callers can check for redundant writes.

use std::collections::BTreeMap;

/// An element whose computed background the sampler can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTarget {
    /// The `<body>` element.
    Body,
    /// The root `<html>` element.
    Root,
}

/// Read-only signals from the current page.
pub trait PageSignals {
    /// The page location, usually a full URL.
    fn location(&self) -> String;

    /// The computed `background-color` of an element, as the browser reports
    /// it (for example `rgba(0, 0, 0, 0)`). `None` if the element is missing.
    fn computed_background(&self, target: ElementTarget) -> Option<String>;

    /// The page's hostname, empty if the location has none.
    fn hostname(&self) -> String {
        hostname_of(&self.location())
    }
}

/// The document mutations the engine performs.
pub trait DocumentSurface {
    /// Current value of a root-element attribute.
    fn root_attribute(&self, name: &str) -> Option<String>;

    /// Sets a root-element attribute.
    fn set_root_attribute(&mut self, name: &str, value: &str);

    /// Removes a root-element attribute.
    fn remove_root_attribute(&mut self, name: &str);

    /// Whether a stylesheet element with this id exists.
    fn has_stylesheet(&self, id: &str) -> bool;

    /// Appends a stylesheet element to the document head.
    fn insert_stylesheet(&mut self, id: &str, css: &str);

    /// Removes the stylesheet element with this id, if any.
    fn remove_stylesheet(&mut self, id: &str);
}

/// Extracts the hostname from a page location.
///
/// Accepts full URLs, protocol-relative `//host/...` and bare
/// `host[:port][/path]` strings. Scheme, userinfo, port, path, query and
/// fragment are dropped and the result is lower-cased. A scheme not followed
/// by `//` has no authority (`about:blank`, `data:...`, `blob:https://...`),
/// and neither does `file:///tmp/x`; those yield `""`, matching what a
/// browser reports as `location.hostname`.
///
/// ```rust
/// use nocturne_render::hostname_of;
///
/// assert_eq!(hostname_of("https://user@Example.com:8443/a?b#c"), "example.com");
/// assert_eq!(hostname_of("news.example.org/today"), "news.example.org");
/// assert_eq!(hostname_of("//cdn.example.com/app.js"), "cdn.example.com");
/// assert_eq!(hostname_of("about:blank"), "");
/// ```
pub fn hostname_of(location: &str) -> String {
    let location = location.trim();
    let rest = match after_scheme(location) {
        Some(after) => match after.strip_prefix("//") {
            Some(rest) => rest,
            None => return String::new(),
        },
        None => location.strip_prefix("//").unwrap_or(location),
    };

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let host_port = match authority.rfind('@') {
        Some(pos) => &authority[pos + 1..],
        None => authority,
    };

    let host = if host_port.starts_with('[') {
        match host_port.find(']') {
            Some(end) => &host_port[..=end],
            None => host_port,
        }
    } else {
        match host_port.find(':') {
            Some(pos) => &host_port[..pos],
            None => host_port,
        }
    };
    host.to_ascii_lowercase()
}

/// The text after `scheme:`, if `location` starts with a URL scheme.
///
/// `example.com:8080` is a host with a port, not a scheme.
fn after_scheme(location: &str) -> Option<&str> {
    let colon = location.find(':')?;
    let (scheme, after) = (&location[..colon], &location[colon + 1..]);
    let is_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !is_scheme {
        return None;
    }

    let port_end = after.find(['/', '?', '#']).unwrap_or(after.len());
    let port = &after[..port_end];
    if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(after)
}

/// A DOM mutation recorded by [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A root attribute was set.
    SetAttribute {
        /// Attribute name.
        name: String,
        /// New value.
        value: String,
    },
    /// A root attribute was removed.
    RemoveAttribute {
        /// Attribute name.
        name: String,
    },
    /// A stylesheet element was inserted.
    InsertStylesheet {
        /// Element id.
        id: String,
    },
    /// A stylesheet element was removed.
    RemoveStylesheet {
        /// Element id.
        id: String,
    },
}

/// An in-memory page.
///
/// Behaves like a minimal DOM: attribute writes always count as mutations
/// (even when the value is unchanged), and inserting a stylesheet appends a
/// new element even if one with the same id exists. That makes redundant
/// writes by a caller visible in [`mutations`](Self::mutations).
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    location: String,
    body_background: Option<String>,
    root_background: Option<String>,
    attributes: BTreeMap<String, String>,
    stylesheets: Vec<(String, String)>,
    mutations: Vec<Mutation>,
}

impl MemoryPage {
    /// A page at `location` with no computed backgrounds.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Sets the body's computed background.
    pub fn with_body_background(mut self, color: impl Into<String>) -> Self {
        self.body_background = Some(color.into());
        self
    }

    /// Sets the root element's computed background.
    pub fn with_root_background(mut self, color: impl Into<String>) -> Self {
        self.root_background = Some(color.into());
        self
    }

    /// Navigates within the same page lifetime (e.g. a history push).
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Changes the body background after load.
    pub fn set_body_background(&mut self, color: impl Into<String>) {
        self.body_background = Some(color.into());
    }

    /// All root attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// The css of the first stylesheet with this id.
    pub fn stylesheet(&self, id: &str) -> Option<&str> {
        self.stylesheets
            .iter()
            .find(|(sheet_id, _)| sheet_id == id)
            .map(|(_, css)| css.as_str())
    }

    /// Number of stylesheet elements with this id.
    pub fn stylesheet_count(&self, id: &str) -> usize {
        self.stylesheets
            .iter()
            .filter(|(sheet_id, _)| sheet_id == id)
            .count()
    }

    /// Every mutation so far, oldest first.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Drains the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }
}

impl PageSignals for MemoryPage {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn computed_background(&self, target: ElementTarget) -> Option<String> {
        match target {
            ElementTarget::Body => self.body_background.clone(),
            ElementTarget::Root => self.root_background.clone(),
        }
    }
}

impl DocumentSurface for MemoryPage {
    fn root_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_root_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
        self.mutations.push(Mutation::SetAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_root_attribute(&mut self, name: &str) {
        if self.attributes.remove(name).is_some() {
            self.mutations.push(Mutation::RemoveAttribute {
                name: name.to_string(),
            });
        }
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.stylesheet_count(id) > 0
    }

    fn insert_stylesheet(&mut self, id: &str, css: &str) {
        self.stylesheets.push((id.to_string(), css.to_string()));
        self.mutations
            .push(Mutation::InsertStylesheet { id: id.to_string() });
    }

    fn remove_stylesheet(&mut self, id: &str) {
        let before = self.stylesheets.len();
        self.stylesheets.retain(|(sheet_id, _)| sheet_id != id);
        if self.stylesheets.len() != before {
            self.mutations
                .push(Mutation::RemoveStylesheet { id: id.to_string() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_of_urls() {
        assert_eq!(hostname_of("https://example.com/"), "example.com");
        assert_eq!(hostname_of("http://EXAMPLE.com"), "example.com");
        assert_eq!(hostname_of("https://a.b.example.com/x/y"), "a.b.example.com");
        assert_eq!(hostname_of("https://example.com:8443"), "example.com");
        assert_eq!(hostname_of("https://u:p@example.com/"), "example.com");
        assert_eq!(hostname_of("https://example.com?q=1"), "example.com");
        assert_eq!(hostname_of("https://example.com#top"), "example.com");
    }

    #[test]
    fn test_hostname_of_bare_hosts() {
        assert_eq!(hostname_of("example.com"), "example.com");
        assert_eq!(hostname_of("localhost:3000"), "localhost");
        assert_eq!(hostname_of("example.com/path:with:colons"), "example.com");
        assert_eq!(hostname_of("//example.com/x"), "example.com");
        assert_eq!(hostname_of("//Example.com:8080"), "example.com");
    }

    #[test]
    fn test_hostname_of_ipv6() {
        assert_eq!(hostname_of("http://[::1]:8080/"), "[::1]");
    }

    #[test]
    fn test_hostname_of_without_authority() {
        assert_eq!(hostname_of(""), "");
        assert_eq!(hostname_of("about:blank"), "");
        assert_eq!(hostname_of("data:text/html,hi"), "");
        assert_eq!(hostname_of("file:///tmp/page.html"), "");
        assert_eq!(hostname_of("localhost:"), "");
        assert_eq!(hostname_of("blob:https://example.com/0b7e-41c2"), "");
        assert_eq!(hostname_of("view-source:https://example.com/"), "");
    }

    #[test]
    fn test_memory_page_signals() {
        let page = MemoryPage::new("https://example.com/")
            .with_body_background("rgb(1, 2, 3)");
        assert_eq!(page.hostname(), "example.com");
        assert_eq!(
            page.computed_background(ElementTarget::Body).as_deref(),
            Some("rgb(1, 2, 3)")
        );
        assert_eq!(page.computed_background(ElementTarget::Root), None);
    }

    #[test]
    fn test_memory_page_records_mutations() {
        let mut page = MemoryPage::new("https://example.com/");
        page.set_root_attribute("data-x", "1");
        page.set_root_attribute("data-x", "1");
        page.remove_root_attribute("data-x");
        page.remove_root_attribute("data-x");
        page.insert_stylesheet("s", "a{}");
        page.remove_stylesheet("s");
        page.remove_stylesheet("s");

        assert_eq!(page.mutations().len(), 5);
        assert!(page.attributes().is_empty());
        assert!(!page.has_stylesheet("s"));
    }

    #[test]
    fn test_memory_page_allows_duplicate_stylesheets() {
        let mut page = MemoryPage::new("");
        page.insert_stylesheet("s", "a{}");
        page.insert_stylesheet("s", "b{}");
        assert_eq!(page.stylesheet_count("s"), 2);
        assert_eq!(page.stylesheet("s"), Some("a{}"));

        page.remove_stylesheet("s");
        assert_eq!(page.stylesheet_count("s"), 0);
        assert_eq!(page.take_mutations().len(), 3);
        assert!(page.mutations().is_empty());
    }
}
