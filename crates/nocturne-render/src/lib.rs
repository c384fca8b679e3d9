//! # Nocturne Render - Per-Site Theme Resolution
//!
//! `nocturne-render` decides how a web page should look given a user's
//! light/dark preferences, and applies that decision to the document, even
//! when the page has no dark mode of its own.
//!
//! The user picks a mode globally and optionally per site. For a site with
//! an override, the engine compares the requested scheme with the page's
//! native background brightness and, when they disagree, inverts the page
//! while keeping images and video natural.
//!
//! ## Core Concepts
//!
//! - [`ThemeMode`]: a request (`light`, `dark`, `system`)
//! - [`ThemeScheme`]: a resolved scheme (`light`, `dark`)
//! - [`ThemeSettings`]: default mode plus per-hostname overrides, always
//!   produced by [`normalize`] from an untyped blob
//! - [`AppearanceResolver`]: samples page brightness once, decides, and
//!   writes attributes and a stylesheet to the document
//! - [`AppearanceController`]: binds a resolver to a [`SettingsStore`] and a
//!   [`ColorSchemeSignal`], with explicit teardown
//!
//! ## Quick Start
//!
//! ```rust
//! use nocturne_render::{AppearanceResolver, MemoryPage, ResolverConfig, ThemeScheme};
//! use serde_json::json;
//!
//! let page = MemoryPage::new("https://example.com/article")
//!     .with_body_background("rgb(10, 10, 10)");
//! let mut resolver = AppearanceResolver::new(page, ResolverConfig::default());
//!
//! let resolution = resolver.settings_changed(&json!({
//!     "defaultMode": "system",
//!     "siteOverrides": { "example.com": "dark" }
//! }));
//!
//! // Already dark: no inversion needed.
//! let theme = resolution.applied().unwrap();
//! assert_eq!(theme.scheme, ThemeScheme::Dark);
//! assert!(!theme.invert);
//! ```
//!
//! ## Never Fails
//!
//! Resolution is total. Malformed settings become defaults, unreadable
//! background colors fall back to white, and a page without a hostname is
//! simply left alone. Errors ([`ThemeError`]) only come from stores and
//! configuration files.
//!
//! ## Features
//!
//! - **`web`**: [`WebPage`] and [`MediaQuerySignal`] over `web-sys`, for
//!   running inside a browser.

pub mod colorspace;
mod config;
mod controller;
mod error;
mod event;
mod page;
mod resolver;
mod store;
pub mod style;
pub mod theme;
#[cfg(feature = "web")]
mod web;

// Error type
pub use error::ThemeError;

// Theme module exports
pub use theme::{
    normalize, ColorSchemeSignal, FixedColorScheme, OsColorScheme, SchemeDetector, ThemeMode,
    ThemeScheme, ThemeSettings,
};

// Configuration
pub use config::{ResolverConfig, DEFAULT_STORAGE_KEY};

// Page abstractions
pub use page::{hostname_of, DocumentSurface, ElementTarget, MemoryPage, Mutation, PageSignals};

// Resolution
pub use resolver::{
    compute_page_is_dark, decide, sample_background, AppearanceResolver, AppliedTheme, Resolution,
};

// Event wiring
pub use controller::AppearanceController;
pub use event::{ListenerId, Listeners};
pub use store::{
    load_settings, update_settings, FileStore, MemoryStore, SettingsStore, StoreChange,
};

#[cfg(feature = "web")]
pub use web::{MediaQuerySignal, WebPage};
