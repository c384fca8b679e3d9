//! CSS concerns: reading computed colors and writing the managed stylesheet.
//!
//! - [`parse_css_color`] turns a computed `background-color` into an [`Rgba`].
//! - [`build_stylesheet`] renders the rules injected while a theme is active,
//!   including the media compensation described by [`CompensationPolicy`].

mod color;
mod sheet;

pub use color::{parse_css_color, Rgba};
pub use sheet::{build_stylesheet, CompensationPolicy, ElementCategory, ThemeAttributes};
