//! Centralized error handling for mdremix
//!
//! This module provides a unified error type that covers configuration
//! persistence and the failure modes of the navigation engine. Navigation
//! errors never reach the host UI: every public engine operation converts
//! them into a logged warning and a neutral outcome.

use log::warn;
use std::fmt;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A heading ID has no laid-out element (stale ID, not yet rendered)
    HeadingNotFound { id: String },

    /// The intersection observer could not be set up
    ObserverUnavailable(String),

    /// A scroll surface is hidden or has no usable geometry
    SurfaceUnavailable { surface: &'static str },

    /// No surface could be scrolled to the requested heading
    NavigationFailed { id: String },

    /// A manual active-heading override named an untracked heading
    UnknownHeading { id: String },
}

// Implement From traits for convenient error conversion
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Navigation Errors
            Error::HeadingNotFound { id } => {
                write!(f, "No element found for heading '{}'", id)
            }
            Error::ObserverUnavailable(reason) => {
                write!(f, "Intersection observer unavailable: {}", reason)
            }
            Error::SurfaceUnavailable { surface } => {
                write!(f, "Scroll surface '{}' is not available", surface)
            }
            Error::NavigationFailed { id } => {
                write!(f, "Could not navigate to heading '{}'", id)
            }
            Error::UnknownHeading { id } => {
                write!(f, "Heading '{}' is not tracked", id)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::ConfigDirNotFound
            | Error::HeadingNotFound { .. }
            | Error::ObserverUnavailable(_)
            | Error::SurfaceUnavailable { .. }
            | Error::NavigationFailed { .. }
            | Error::UnknownHeading { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_display_heading_not_found() {
        let err = Error::HeadingNotFound {
            id: "heading-4-setup".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No element found for heading 'heading-4-setup'"
        );
    }

    #[test]
    fn test_display_surface_unavailable() {
        let err = Error::SurfaceUnavailable { surface: "preview" };
        assert!(err.to_string().contains("preview"));
    }

    #[test]
    fn test_display_config_dir_not_found() {
        let err = Error::ConfigDirNotFound;
        assert_eq!(err.to_string(), "Configuration directory not found");
    }

    #[test]
    fn test_error_source_config_load() {
        use std::error::Error as StdError;
        let err = Error::ConfigLoad {
            path: PathBuf::from("config.json"),
            source: Box::new(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_none_for_navigation_variants() {
        use std::error::Error as StdError;
        let err = Error::UnknownHeading {
            id: "nope".to_string(),
        };
        assert!(err.source().is_none());

        let err = Error::ObserverUnavailable("no root".to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        let result: Result<i32> = Ok(42);
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        let result: Result<bool> = Err(Error::NavigationFailed {
            id: "heading-0-a".to_string(),
        });
        assert!(!result.unwrap_or_warn_default(false, "navigate"));
    }
}
