//! Browser bindings over `web-sys` (feature `web`).
//!
//! [`WebPage`] implements the page traits on the live DOM and
//! [`MediaQuerySignal`] turns `matchMedia("(prefers-color-scheme: dark)")`
//! into a [`ColorSchemeSignal`]. DOM calls that fail are logged and
//! skipped; resolution never aborts on a browser error.

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MediaQueryList, MediaQueryListEvent, Window};

use crate::event::{ListenerId, Listeners};
use crate::page::{DocumentSurface, ElementTarget, PageSignals};
use crate::theme::ColorSchemeSignal;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// The page the code is running in.
#[derive(Debug, Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    /// The current window's page, if running in a browser document.
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    /// The `<style>` element carrying `id`. Other elements that happen to
    /// use the same id belong to the page and are never touched.
    fn managed_stylesheet(&self, id: &str) -> Option<Element> {
        let styles = self.document.get_elements_by_tag_name("style");
        (0..styles.length())
            .filter_map(|index| styles.item(index))
            .find(|element| is_managed_stylesheet(&element.tag_name(), &element.id(), id))
    }

    fn background_of(&self, element: &Element) -> Option<String> {
        let style = self.window.get_computed_style(element).ok().flatten()?;
        style.get_property_value("background-color").ok()
    }
}

impl PageSignals for WebPage {
    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn hostname(&self) -> String {
        self.window
            .location()
            .hostname()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    fn computed_background(&self, target: ElementTarget) -> Option<String> {
        match target {
            ElementTarget::Body => {
                let body = self.document.body()?;
                self.background_of(&body)
            }
            ElementTarget::Root => self.background_of(&self.root()?),
        }
    }
}

impl DocumentSurface for WebPage {
    fn root_attribute(&self, name: &str) -> Option<String> {
        self.root()?.get_attribute(name)
    }

    fn set_root_attribute(&mut self, name: &str, value: &str) {
        if let Some(root) = self.root() {
            if let Err(err) = root.set_attribute(name, value) {
                tracing::warn!("failed to set attribute {}: {:?}", name, err);
            }
        }
    }

    fn remove_root_attribute(&mut self, name: &str) {
        if let Some(root) = self.root() {
            if let Err(err) = root.remove_attribute(name) {
                tracing::warn!("failed to remove attribute {}: {:?}", name, err);
            }
        }
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.managed_stylesheet(id).is_some()
    }

    fn insert_stylesheet(&mut self, id: &str, css: &str) {
        let Some(head) = self.document.head() else {
            tracing::warn!("document has no head; stylesheet {} not inserted", id);
            return;
        };
        let style = match self.document.create_element("style") {
            Ok(style) => style,
            Err(err) => {
                tracing::warn!("failed to create stylesheet {}: {:?}", id, err);
                return;
            }
        };
        style.set_id(id);
        style.set_text_content(Some(css));
        if let Err(err) = head.append_child(&style) {
            tracing::warn!("failed to insert stylesheet {}: {:?}", id, err);
        }
    }

    fn remove_stylesheet(&mut self, id: &str) {
        if let Some(style) = self.managed_stylesheet(id) {
            style.remove();
        }
    }
}

fn is_managed_stylesheet(tag_name: &str, element_id: &str, id: &str) -> bool {
    tag_name.eq_ignore_ascii_case("style") && element_id == id
}

/// The browser's dark-preference media query.
pub struct MediaQuerySignal {
    query: Option<MediaQueryList>,
    listeners: Rc<Listeners<bool>>,
    on_change: Option<Closure<dyn FnMut(MediaQueryListEvent)>>,
}

impl MediaQuerySignal {
    /// Subscribes to the current window's media query.
    ///
    /// Outside a browser window the signal reports light and never changes.
    pub fn new() -> Self {
        let listeners = Rc::new(Listeners::new());
        let query = web_sys::window().and_then(|window| window.match_media(DARK_QUERY).ok().flatten());

        let on_change = query.as_ref().map(|query| {
            let listeners = Rc::clone(&listeners);
            let closure = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
                move |event: MediaQueryListEvent| listeners.emit(&event.matches()),
            );
            if let Err(err) = query
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            {
                tracing::warn!("failed to observe {}: {:?}", DARK_QUERY, err);
            }
            closure
        });

        Self {
            query,
            listeners,
            on_change,
        }
    }
}

impl Default for MediaQuerySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeSignal for MediaQuerySignal {
    fn prefers_dark(&self) -> bool {
        self.query.as_ref().is_some_and(MediaQueryList::matches)
    }

    fn subscribe(&self, listener: Box<dyn FnMut(&bool)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Drop for MediaQuerySignal {
    fn drop(&mut self) {
        if let (Some(query), Some(closure)) = (&self.query, &self.on_change) {
            let _ = query
                .remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_style_elements_are_managed() {
        assert!(is_managed_stylesheet("STYLE", "nocturne-theme", "nocturne-theme"));
        assert!(is_managed_stylesheet("style", "nocturne-theme", "nocturne-theme"));
        assert!(!is_managed_stylesheet("DIV", "nocturne-theme", "nocturne-theme"));
        assert!(!is_managed_stylesheet("LINK", "nocturne-theme", "nocturne-theme"));
        assert!(!is_managed_stylesheet("STYLE", "site-theme", "nocturne-theme"));
    }
}
