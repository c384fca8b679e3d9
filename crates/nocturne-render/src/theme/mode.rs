//! Requested modes and resolved schemes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

/// A user's requested theme preference.
///
/// `System` defers to the operating system's light/dark preference and is
/// only turned into a concrete [`ThemeScheme`] at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the OS preference.
    #[default]
    System,
}

impl ThemeMode {
    /// All modes, in display order.
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    /// Parses the exact textual form of a mode.
    ///
    /// Matching is case-sensitive: `"Dark"` is not a mode. This is the
    /// predicate the settings normalizer uses to accept stored values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            "system" => Some(ThemeMode::System),
            _ => None,
        }
    }

    /// The persisted textual form.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// Resolves this mode to a concrete scheme.
    ///
    /// `prefers_dark` is the current value of the OS dark-preference query;
    /// it is ignored unless the mode is [`ThemeMode::System`].
    pub fn resolve(self, prefers_dark: bool) -> ThemeScheme {
        match self {
            ThemeMode::Light => ThemeScheme::Light,
            ThemeMode::Dark => ThemeScheme::Dark,
            ThemeMode::System => ThemeScheme::from_prefers_dark(prefers_dark),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ThemeError::InvalidMode(s.to_string()))
    }
}

/// A concrete, resolved color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeScheme {
    /// Light background, dark text.
    Light,
    /// Dark background, light text.
    Dark,
}

impl ThemeScheme {
    /// Maps the OS dark-preference flag to a scheme.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ThemeScheme::Dark
        } else {
            ThemeScheme::Light
        }
    }

    /// The attribute value written to the document.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeScheme::Light => "light",
            ThemeScheme::Dark => "dark",
        }
    }

    /// Whether a page of the given native brightness must be inverted to
    /// look like this scheme.
    ///
    /// Inversion is needed exactly when the page's brightness disagrees with
    /// the scheme.
    ///
    /// | scheme | page dark | invert |
    /// |--------|-----------|--------|
    /// | dark   | no        | yes    |
    /// | dark   | yes       | no     |
    /// | light  | yes       | yes    |
    /// | light  | no        | no     |
    pub fn needs_inversion(self, page_is_dark: bool) -> bool {
        match self {
            ThemeScheme::Dark => !page_is_dark,
            ThemeScheme::Light => page_is_dark,
        }
    }
}

impl fmt::Display for ThemeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
