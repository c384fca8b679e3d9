//! Parsing of computed CSS background colors.
//!
//! Browsers report computed background colors in functional RGB notation,
//! so that is the only form the brightness sampler needs to understand:
//!
//! - Legacy comma syntax: `rgb(255, 255, 255)`, `rgba(0, 0, 0, 0.5)`
//! - Modern space syntax: `rgb(255 255 255)`, `rgb(0 0 0 / 50%)`
//! - Percentage channels: `rgb(100%, 0%, 50%)`
//!
//! Everything else (named colors, `transparent`, hex, `hsl()`) is treated as
//! "no color detected", which sends the sampler down its fallback chain.
//!
//! The tokenizer is `cssparser`, so comments, escapes and odd whitespace are
//! handled the way a browser would.
//!
//! # Example
//!
//! ```rust
//! use nocturne_render::colorspace::Rgb;
//! use nocturne_render::style::parse_css_color;
//!
//! let color = parse_css_color("rgba(10, 20, 30, 0.5)").unwrap();
//! assert_eq!(color.rgb, Rgb(10, 20, 30));
//! assert_eq!(color.alpha, 0.5);
//!
//! assert!(parse_css_color("white").is_none());
//! ```

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::colorspace::Rgb;

/// A parsed color with alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Color channels, rounded to 0–255.
    pub rgb: Rgb,
    /// Opacity, 0.0 (transparent) to 1.0 (opaque).
    pub alpha: f32,
}

impl Rgba {
    /// An opaque color.
    pub fn opaque(rgb: Rgb) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    /// Whether this color is see-through enough to be ignored.
    ///
    /// Colors with `alpha <= threshold` don't determine what the user sees,
    /// so the sampler looks past them.
    pub fn is_transparent(&self, threshold: f32) -> bool {
        self.alpha <= threshold
    }
}

/// Parses an `rgb()` / `rgba()` color string.
///
/// Returns `None` for any other color syntax or malformed input.
pub fn parse_css_color(input: &str) -> Option<Rgba> {
    let mut input = ParserInput::new(input);
    let mut parser = Parser::new(&mut input);
    parse_rgb_function(&mut parser).ok()
}

fn parse_rgb_function<'i>(parser: &mut Parser<'i, '_>) -> Result<Rgba, ParseError<'i, ()>> {
    let location = parser.current_source_location();
    let name = parser.expect_function()?.clone();
    if !name.eq_ignore_ascii_case("rgb") && !name.eq_ignore_ascii_case("rgba") {
        return Err(location.new_unexpected_token_error(Token::Function(name)));
    }

    let color = parser.parse_nested_block(|p| parse_rgb_arguments(p))?;
    parser.expect_exhausted()?;
    Ok(color)
}

fn parse_rgb_arguments<'i>(p: &mut Parser<'i, '_>) -> Result<Rgba, ParseError<'i, ()>> {
    let r = parse_channel(p)?;
    let legacy = p.try_parse(|p| p.expect_comma()).is_ok();
    let g = parse_channel(p)?;
    if legacy {
        p.expect_comma()?;
    }
    let b = parse_channel(p)?;

    let alpha = if p.is_exhausted() {
        1.0
    } else {
        if legacy {
            p.expect_comma()?;
        } else {
            p.expect_delim('/')?;
        }
        parse_alpha(p)?
    };
    p.expect_exhausted()?;

    Ok(Rgba {
        rgb: Rgb(r, g, b),
        alpha,
    })
}

fn parse_channel<'i>(p: &mut Parser<'i, '_>) -> Result<u8, ParseError<'i, ()>> {
    let location = p.current_source_location();
    let value = match *p.next()? {
        Token::Number { value, .. } => value,
        Token::Percentage { unit_value, .. } => unit_value * 255.0,
        ref token => return Err(location.new_unexpected_token_error(token.clone())),
    };
    Ok(value.clamp(0.0, 255.0).round() as u8)
}

fn parse_alpha<'i>(p: &mut Parser<'i, '_>) -> Result<f32, ParseError<'i, ()>> {
    let location = p.current_source_location();
    let value = match *p.next()? {
        Token::Number { value, .. } => value,
        Token::Percentage { unit_value, .. } => unit_value,
        ref token => return Err(location.new_unexpected_token_error(token.clone())),
    };
    Ok(value.clamp(0.0, 1.0))
}
