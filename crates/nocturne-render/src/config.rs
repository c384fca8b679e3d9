//! Resolver configuration.
//!
//! Every knob has a default, so a config file only lists what it changes:
//!
//! ```yaml
//! attribute_prefix: data-my-theme
//! dark_threshold: 0.4
//! compensation:
//!   iframe: false
//! ```
//!
//! ```rust
//! use nocturne_render::ResolverConfig;
//!
//! let config = ResolverConfig::from_yaml("dark_threshold: 0.4\n").unwrap();
//! assert_eq!(config.dark_threshold, 0.4);
//! assert_eq!(config.stylesheet_id, "nocturne-theme");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::colorspace::Rgb;
use crate::error::ThemeError;
use crate::style::{build_stylesheet, CompensationPolicy, ThemeAttributes};

/// Storage key the settings blob lives under.
pub const DEFAULT_STORAGE_KEY: &str = "nocturne.settings";

/// Tunable behavior of the appearance resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Settings store key holding the settings blob.
    pub storage_key: String,
    /// Prefix of the root-element attributes (`<prefix>-scheme`, `<prefix>-invert`).
    pub attribute_prefix: String,
    /// Id of the injected stylesheet element.
    pub stylesheet_id: String,
    /// Backgrounds with relative luminance below this are dark.
    pub dark_threshold: f64,
    /// Background colors with alpha at or below this are ignored.
    pub transparent_alpha: f32,
    /// Background assumed when neither body nor root has a usable color.
    pub fallback_background: Rgb,
    /// CSS filter used for inversion and for compensation.
    pub filter: String,
    /// Which embedded content is compensated.
    pub compensation: CompensationPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            attribute_prefix: "data-nocturne".to_string(),
            stylesheet_id: "nocturne-theme".to_string(),
            dark_threshold: 0.5,
            transparent_alpha: 0.05,
            fallback_background: Rgb::WHITE,
            filter: "invert(1) hue-rotate(180deg)".to_string(),
            compensation: CompensationPolicy::default(),
        }
    }
}

impl ResolverConfig {
    /// Parses and validates a YAML config. Empty input yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Config`] on malformed YAML, unknown keys, or
    /// values rejected by [`validate`](Self::validate).
    pub fn from_yaml(yaml: &str) -> Result<Self, ThemeError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Io`] if the file cannot be read, otherwise as
    /// [`from_yaml`](Self::from_yaml).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
        Self::from_yaml(&content).map_err(|e| match e {
            ThemeError::Config(message) => {
                ThemeError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ThemeError> {
        if !(0.0..=1.0).contains(&self.dark_threshold) {
            return Err(ThemeError::config(format!(
                "dark_threshold must be between 0 and 1, got {}",
                self.dark_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.transparent_alpha) {
            return Err(ThemeError::config(format!(
                "transparent_alpha must be between 0 and 1, got {}",
                self.transparent_alpha
            )));
        }
        for (field, value) in [
            ("storage_key", &self.storage_key),
            ("attribute_prefix", &self.attribute_prefix),
            ("stylesheet_id", &self.stylesheet_id),
            ("filter", &self.filter),
        ] {
            if value.trim().is_empty() {
                return Err(ThemeError::config(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    /// The root-element attribute names.
    pub fn attributes(&self) -> ThemeAttributes {
        ThemeAttributes::with_prefix(&self.attribute_prefix)
    }

    /// The managed stylesheet text for this configuration.
    pub fn stylesheet(&self) -> String {
        build_stylesheet(&self.attributes(), &self.filter, &self.compensation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ElementCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(
            ResolverConfig::from_yaml("  \n").unwrap(),
            ResolverConfig::default()
        );
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ResolverConfig::from_yaml(
            r#"
attribute_prefix: data-dusk
fallback_background: [250, 250, 240]
compensation:
  iframe: false
"#,
        )
        .unwrap();
        assert_eq!(config.attribute_prefix, "data-dusk");
        assert_eq!(config.fallback_background, Rgb(250, 250, 240));
        assert!(!config.compensation.compensates(ElementCategory::Iframe));
        assert!(config.compensation.compensates(ElementCategory::Image));
        assert_eq!(config.dark_threshold, 0.5);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_key() {
        let err = ResolverConfig::from_yaml("dark_treshold: 0.4\n").unwrap_err();
        assert!(matches!(err, ThemeError::Config(_)));
    }

    #[test]
    fn test_from_yaml_rejects_out_of_range() {
        assert!(ResolverConfig::from_yaml("dark_threshold: 1.5\n").is_err());
        assert!(ResolverConfig::from_yaml("transparent_alpha: -0.1\n").is_err());
        assert!(ResolverConfig::from_yaml("dark_threshold: .nan\n").is_err());
    }

    #[test]
    fn test_from_yaml_rejects_empty_names() {
        let err = ResolverConfig::from_yaml("stylesheet_id: ''\n").unwrap_err();
        assert!(err.to_string().contains("stylesheet_id"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "storage_key: custom.key").unwrap();

        let config = ResolverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage_key, "custom.key");
    }

    #[test]
    fn test_from_file_not_found() {
        let err = ResolverConfig::from_file("/nonexistent/nocturne.yaml").unwrap_err();
        assert!(matches!(err, ThemeError::Io { .. }));
    }

    #[test]
    fn test_from_file_error_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "dark_threshold: 7").unwrap();

        let err = ResolverConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_stylesheet_uses_prefix() {
        let config = ResolverConfig {
            attribute_prefix: "data-dusk".to_string(),
            ..ResolverConfig::default()
        };
        assert!(config.stylesheet().contains("html[data-dusk-invert=\"true\"]"));
    }
}
