//! Theme preferences: requested modes, settings, and the OS signal.
//!
//! The engine distinguishes what the user *asked for* from what a page
//! *gets*:
//!
//! - [`ThemeMode`] is a request: `light`, `dark`, or `system`.
//! - [`ThemeScheme`] is a resolved scheme: `light` or `dark`.
//!
//! A mode becomes a scheme by consulting the OS preference, exposed through
//! [`ColorSchemeSignal`]:
//!
//! ```rust
//! use nocturne_render::{ThemeMode, ThemeScheme};
//!
//! assert_eq!(ThemeMode::System.resolve(true), ThemeScheme::Dark);
//! assert_eq!(ThemeMode::Light.resolve(true), ThemeScheme::Light);
//! ```
//!
//! Requests are stored per site in [`ThemeSettings`], which is always
//! produced through [`normalize`] from whatever the settings store holds.

mod mode;
mod settings;
mod signal;

pub use mode::{ThemeMode, ThemeScheme};
pub use settings::{normalize, ThemeSettings};
pub use signal::{ColorSchemeSignal, FixedColorScheme, OsColorScheme, SchemeDetector};
