//! The OS "prefers dark" signal.
//!
//! Resolution of [`ThemeMode::System`](super::ThemeMode::System) depends on
//! the operating system's color-scheme preference. [`ColorSchemeSignal`]
//! abstracts that preference and its change notifications so the resolver
//! can be driven by the real OS, a browser media query, or a test double.
//!
//! ```rust
//! use nocturne_render::{ColorSchemeSignal, FixedColorScheme};
//!
//! let signal = FixedColorScheme::new(false);
//! signal.set(true);
//! assert!(signal.prefers_dark());
//! ```

use std::cell::Cell;

use dark_light::Mode as OsThemeMode;

use crate::event::{ListenerId, Listeners};

/// A boolean "prefers dark" query with change subscription.
pub trait ColorSchemeSignal {
    /// Current value of the dark-preference query.
    fn prefers_dark(&self) -> bool;

    /// Registers a listener called with the new value on every change.
    fn subscribe(&self, listener: Box<dyn FnMut(&bool)>) -> ListenerId;

    /// Removes a listener registered with [`subscribe`](Self::subscribe).
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

/// Function used to query the OS preference.
pub type SchemeDetector = fn() -> bool;

/// The operating system's color-scheme preference, via `dark-light`.
///
/// `dark-light` has no change notification, so callers that want to react to
/// OS changes call [`poll`](Self::poll) periodically; listeners are notified
/// only when the detected value actually flips.
#[derive(Debug)]
pub struct OsColorScheme {
    detector: SchemeDetector,
    current: Cell<bool>,
    listeners: Listeners<bool>,
}

impl OsColorScheme {
    /// Creates a signal backed by OS detection.
    pub fn new() -> Self {
        Self::with_detector(os_prefers_dark)
    }

    /// Creates a signal with a custom detector.
    ///
    /// Useful for testing or to force a specific preference.
    pub fn with_detector(detector: SchemeDetector) -> Self {
        Self {
            detector,
            current: Cell::new(detector()),
            listeners: Listeners::new(),
        }
    }

    /// Re-queries the OS. Returns `true` and notifies listeners if the
    /// preference changed since the last query.
    pub fn poll(&self) -> bool {
        let detected = (self.detector)();
        if detected == self.current.get() {
            return false;
        }
        tracing::debug!(prefers_dark = detected, "OS color scheme changed");
        self.current.set(detected);
        self.listeners.emit(&detected);
        true
    }
}

impl Default for OsColorScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeSignal for OsColorScheme {
    fn prefers_dark(&self) -> bool {
        self.current.get()
    }

    fn subscribe(&self, listener: Box<dyn FnMut(&bool)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

fn os_prefers_dark() -> bool {
    match dark_light::detect() {
        Ok(OsThemeMode::Dark) => true,
        Ok(_) => false,
        Err(err) => {
            tracing::warn!("OS color scheme detection failed: {}", err);
            false
        }
    }
}

/// A settable preference, for tests and previews.
#[derive(Debug, Default)]
pub struct FixedColorScheme {
    prefers_dark: Cell<bool>,
    listeners: Listeners<bool>,
}

impl FixedColorScheme {
    /// Creates a signal with the given initial value.
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: Cell::new(prefers_dark),
            listeners: Listeners::new(),
        }
    }

    /// Changes the preference, notifying listeners if it differs.
    pub fn set(&self, prefers_dark: bool) {
        if self.prefers_dark.replace(prefers_dark) != prefers_dark {
            self.listeners.emit(&prefers_dark);
        }
    }
}

impl ColorSchemeSignal for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.get()
    }

    fn subscribe(&self, listener: Box<dyn FnMut(&bool)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
