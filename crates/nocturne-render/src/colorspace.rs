//! Relative luminance for page brightness sampling.
//!
//! # Motivation
//!
//! To decide whether a page is "dark", the engine looks at one number: the
//! relative luminance of its background. Luminance is computed on
//! *linear* light, not on the raw sRGB channel values, because sRGB is gamma
//! encoded: `rgb(128, 128, 128)` is perceived as mid-gray but emits only
//! about a fifth of the light of white.
//!
//! # Formula
//!
//! Each channel is scaled to `0.0..=1.0` and linearized:
//!
//! ```text
//! c <= 0.03928  →  c / 12.92
//! c >  0.03928  →  ((c + 0.055) / 1.055) ^ 2.4
//! ```
//!
//! then weighted by the eye's sensitivity to each primary:
//!
//! ```text
//! L = 0.2126 R + 0.7152 G + 0.0722 B
//! ```
//!
//! The result is `0.0` for black and `1.0` for white.
//!
//! # Example
//!
//! ```rust
//! use nocturne_render::colorspace::{relative_luminance, Rgb};
//!
//! assert_eq!(relative_luminance(Rgb(0, 0, 0)), 0.0);
//! assert!((relative_luminance(Rgb(255, 255, 255)) - 1.0).abs() < 1e-9);
//! assert!(relative_luminance(Rgb(10, 10, 10)) < 0.01);
//! ```

use serde::{Deserialize, Serialize};

// ─── RGB type ───────────────────────────────────────────────────────────────

/// A simple RGB color triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Opaque white, the assumed background when nothing else is known.
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

// ─── Luminance ──────────────────────────────────────────────────────────────

/// Linearization threshold on the `0.0..=1.0` channel scale.
const LINEAR_THRESHOLD: f64 = 0.03928;

const RED_WEIGHT: f64 = 0.2126;
const GREEN_WEIGHT: f64 = 0.7152;
const BLUE_WEIGHT: f64 = 0.0722;

/// Convert an sRGB component (0–255) to linear light (0.0–1.0).
fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= LINEAR_THRESHOLD {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of a color, from `0.0` (black) to `1.0` (white).
pub fn relative_luminance(rgb: Rgb) -> f64 {
    RED_WEIGHT * srgb_to_linear(rgb.0)
        + GREEN_WEIGHT * srgb_to_linear(rgb.1)
        + BLUE_WEIGHT * srgb_to_linear(rgb.2)
}

/// Whether a background color counts as dark.
///
/// A color is dark when its luminance is strictly below `threshold`.
pub fn is_dark(rgb: Rgb, threshold: f64) -> bool {
    relative_luminance(rgb) < threshold
}
