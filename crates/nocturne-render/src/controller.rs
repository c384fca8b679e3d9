//! Event wiring between the resolver and its external collaborators.
//!
//! An [`AppearanceController`] owns a resolver and the two observer
//! registrations that drive it:
//!
//! - a settings-store listener, re-resolving whenever the settings key
//!   changes
//! - a preference-signal listener, re-resolving whenever the OS preference
//!   flips
//!
//! [`activate`](AppearanceController::activate) performs the initial load
//! and resolution, then registers both listeners.
//! [`dispose`](AppearanceController::dispose) unregisters them; dropping the
//! controller does the same.
//!
//! ```rust
//! use std::rc::Rc;
//! use nocturne_render::{
//!     AppearanceController, AppearanceResolver, FixedColorScheme, MemoryPage, MemoryStore,
//!     ResolverConfig, SettingsStore,
//! };
//! use serde_json::json;
//!
//! let store = Rc::new(MemoryStore::new());
//! let signal = Rc::new(FixedColorScheme::new(false));
//! let page = MemoryPage::new("https://example.com/");
//! let resolver = AppearanceResolver::new(page, ResolverConfig::default());
//!
//! let controller = AppearanceController::activate(resolver, store.clone(), signal.clone());
//! assert!(controller.resolver().applied().is_none());
//!
//! store
//!     .set("nocturne.settings", json!({ "siteOverrides": { "example.com": "system" } }))
//!     .unwrap();
//! assert!(controller.resolver().applied().is_some());
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::event::ListenerId;
use crate::page::{DocumentSurface, PageSignals};
use crate::resolver::AppearanceResolver;
use crate::store::{SettingsStore, StoreChange};
use crate::theme::ColorSchemeSignal;

enum Registration {
    Settings {
        store: Rc<dyn SettingsStore>,
        id: ListenerId,
    },
    Scheme {
        signal: Rc<dyn ColorSchemeSignal>,
        id: ListenerId,
    },
}

/// A resolver bound to a settings store and a preference signal.
pub struct AppearanceController<P> {
    resolver: Rc<RefCell<AppearanceResolver<P>>>,
    registrations: Vec<Registration>,
}

impl<P: PageSignals + DocumentSurface + 'static> AppearanceController<P> {
    /// Loads settings, resolves once, and subscribes to both event sources.
    ///
    /// A store read failure is logged and treated as missing settings.
    pub fn activate(
        resolver: AppearanceResolver<P>,
        store: Rc<dyn SettingsStore>,
        signal: Rc<dyn ColorSchemeSignal>,
    ) -> Self {
        let key = resolver.config().storage_key.clone();
        let raw = match store.get(&key) {
            Ok(value) => value.unwrap_or(Value::Null),
            Err(err) => {
                tracing::warn!("failed to read settings '{}': {}", key, err);
                Value::Null
            }
        };

        let resolver = Rc::new(RefCell::new(
            resolver.with_prefers_dark(signal.prefers_dark()),
        ));
        resolver.borrow_mut().settings_changed(&raw);

        let settings_id = {
            let resolver = Rc::clone(&resolver);
            store.subscribe(Box::new(move |change: &StoreChange| {
                if change.key != key {
                    return;
                }
                let null = Value::Null;
                let raw = change.value.as_ref().unwrap_or(&null);
                resolver.borrow_mut().settings_changed(raw);
            }))
        };

        let scheme_id = {
            let resolver = Rc::clone(&resolver);
            signal.subscribe(Box::new(move |prefers_dark: &bool| {
                resolver.borrow_mut().scheme_preference_changed(*prefers_dark);
            }))
        };

        Self {
            resolver,
            registrations: vec![
                Registration::Settings {
                    store,
                    id: settings_id,
                },
                Registration::Scheme {
                    signal,
                    id: scheme_id,
                },
            ],
        }
    }

    /// Borrows the resolver.
    ///
    /// Don't hold the borrow across a store write or signal change: the
    /// listener needs to borrow the resolver mutably.
    pub fn resolver(&self) -> Ref<'_, AppearanceResolver<P>> {
        self.resolver.borrow()
    }

    /// Runs `f` with mutable access to the resolver.
    pub fn with_resolver<R>(&self, f: impl FnOnce(&mut AppearanceResolver<P>) -> R) -> R {
        f(&mut self.resolver.borrow_mut())
    }
}

impl<P> AppearanceController<P> {
    /// Whether the listeners are still registered.
    pub fn is_subscribed(&self) -> bool {
        !self.registrations.is_empty()
    }

    /// Unregisters both listeners. Calling it again is a no-op.
    ///
    /// The document keeps whatever theme was last applied.
    pub fn dispose(&mut self) {
        for registration in self.registrations.drain(..) {
            match registration {
                Registration::Settings { store, id } => {
                    store.unsubscribe(id);
                }
                Registration::Scheme { signal, id } => {
                    signal.unsubscribe(id);
                }
            }
        }
    }
}

impl<P> Drop for AppearanceController<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<P> fmt::Debug for AppearanceController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppearanceController")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
