//! Error types for the fallible edges of the engine.
//!
//! Theme resolution itself never fails: malformed settings degrade to
//! defaults and unreadable colors degrade to the fallback background. The
//! errors here come from the places that touch the outside world: settings
//! stores, configuration files, and user-supplied mode names.

use std::io;
use std::path::PathBuf;

/// Errors raised by settings stores, configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A stored settings blob could not be (de)serialized.
    #[error("settings serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A resolver configuration file is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A string is not one of `light`, `dark` or `system`.
    #[error("invalid theme mode '{0}' (expected light, dark or system)")]
    InvalidMode(String),
}

impl ThemeError {
    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_yaml::Error> for ThemeError {
    fn from(err: serde_yaml::Error) -> Self {
        ThemeError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_mode() {
        let err = ThemeError::InvalidMode("sepia".to_string());
        assert!(err.to_string().contains("sepia"));
        assert!(err.to_string().contains("light, dark or system"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let err = ThemeError::io(
            "/tmp/settings.json",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/tmp/settings.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<u32>("[not a number").unwrap_err();
        let err: ThemeError = yaml_err.into();
        assert!(matches!(err, ThemeError::Config(_)));
    }
}
