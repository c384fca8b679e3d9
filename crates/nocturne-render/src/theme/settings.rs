//! The user's theme settings and their normalizer.
//!
//! Settings arrive from an external store as an untyped JSON blob. The
//! store may hold anything: an older schema, a hand-edited file, or a value
//! written by a buggy client. [`normalize`] turns any JSON value into a
//! well-formed [`ThemeSettings`] without ever failing:
//!
//! - a non-object input yields the defaults
//! - `defaultMode` is kept only if it is exactly `light`, `dark` or `system`
//! - `siteOverrides` entries are kept only if their value is a valid mode;
//!   keys are accepted verbatim
//!
//! ```rust
//! use nocturne_render::{normalize, ThemeMode};
//! use serde_json::json;
//!
//! let settings = normalize(&json!({
//!     "defaultMode": "dark",
//!     "siteOverrides": { "example.com": "light", "bad.example": "sepia" }
//! }));
//! assert_eq!(settings.default_mode, ThemeMode::Dark);
//! assert_eq!(settings.override_for("example.com"), Some(ThemeMode::Light));
//! assert_eq!(settings.override_for("bad.example"), None);
//! ```
//!
//! The editing helpers on [`ThemeSettings`] are for UI consumers, which
//! read the whole blob, modify it and write it back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mode::ThemeMode;

const DEFAULT_MODE_KEY: &str = "defaultMode";
const SITE_OVERRIDES_KEY: &str = "siteOverrides";

/// Well-formed theme settings.
///
/// A hostname missing from `site_overrides` means the engine is inactive
/// for that site; `default_mode` is what a newly enabled site starts with.
///
/// Serde goes through the persisted JSON form, so deserializing repairs
/// the input exactly like [`normalize`] and never fails on content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct ThemeSettings {
    /// Mode used when a site is first enabled.
    pub default_mode: ThemeMode,
    /// Per-hostname requested modes.
    pub site_overrides: BTreeMap<String, ThemeMode>,
}

/// Repairs an untyped settings blob into [`ThemeSettings`].
///
/// Pure and total: every input produces a valid value, and
/// `normalize(&normalize(x).to_value()) == normalize(x)`.
pub fn normalize(raw: &Value) -> ThemeSettings {
    let Some(object) = raw.as_object() else {
        return ThemeSettings::default();
    };

    let default_mode = object
        .get(DEFAULT_MODE_KEY)
        .and_then(mode_of)
        .unwrap_or_default();

    let site_overrides = object
        .get(SITE_OVERRIDES_KEY)
        .and_then(Value::as_object)
        .map(|overrides| {
            overrides
                .iter()
                .filter_map(|(host, value)| mode_of(value).map(|mode| (host.clone(), mode)))
                .collect()
        })
        .unwrap_or_default();

    ThemeSettings {
        default_mode,
        site_overrides,
    }
}

impl From<Value> for ThemeSettings {
    fn from(raw: Value) -> Self {
        normalize(&raw)
    }
}

impl From<ThemeSettings> for Value {
    fn from(settings: ThemeSettings) -> Self {
        settings.to_value()
    }
}

fn mode_of(value: &Value) -> Option<ThemeMode> {
    value.as_str().and_then(ThemeMode::parse)
}

impl ThemeSettings {
    /// Normalizes a raw blob. Equivalent to [`normalize`].
    pub fn from_value(raw: &Value) -> Self {
        normalize(raw)
    }

    /// The persisted JSON form.
    pub fn to_value(&self) -> Value {
        let overrides: Map<String, Value> = self
            .site_overrides
            .iter()
            .map(|(host, mode)| (host.clone(), Value::from(mode.as_str())))
            .collect();

        let mut object = Map::new();
        object.insert(
            DEFAULT_MODE_KEY.to_string(),
            Value::from(self.default_mode.as_str()),
        );
        object.insert(SITE_OVERRIDES_KEY.to_string(), Value::Object(overrides));
        Value::Object(object)
    }

    /// The override for `hostname`, if any. Lookup is exact.
    pub fn override_for(&self, hostname: &str) -> Option<ThemeMode> {
        self.site_overrides.get(hostname).copied()
    }

    /// Sets the mode used for newly enabled sites.
    pub fn set_default_mode(&mut self, mode: ThemeMode) {
        self.default_mode = mode;
    }

    /// Sets the override for a host, returning the previous one.
    pub fn set_site_override(&mut self, host: &str, mode: ThemeMode) -> Option<ThemeMode> {
        self.site_overrides.insert(host_key(host), mode)
    }

    /// Enables the engine for a host using the default mode.
    ///
    /// An existing override is left untouched. Returns the host's mode.
    pub fn enable_site(&mut self, host: &str) -> ThemeMode {
        *self
            .site_overrides
            .entry(host_key(host))
            .or_insert(self.default_mode)
    }

    /// Removes the override for a host, returning it.
    pub fn clear_site_override(&mut self, host: &str) -> Option<ThemeMode> {
        self.site_overrides.remove(&host_key(host))
    }
}

fn host_key(host: &str) -> String {
    host.trim().to_ascii_lowercase()
}
