//! Error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports

use serde::{Deserialize, Serialize};
use std::fmt;
use territory_geo::GeoError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    InvalidConfigValue = 3004,

    // Input errors (5xxx)
    InputParseError = 5000,
    InvalidRecord = 5001,

    // Geometry errors (6xxx)
    InvalidGeometry = 6001,
    UnsupportedGeometry = 6002,
    InvalidCoordinate = 6003,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            5 => "Input",
            6 => "Geometry",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

#[allow(missing_docs)]
impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// Exit code a CLI should use for this error
    pub fn exit_code(&self) -> i32 {
        match self.code.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            5 | 6 => exit_codes::VALIDATION_ERROR,
            _ => exit_codes::FAILURE,
        }
    }

    // Convenience constructors

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .territory.toml file or pass --config with an existing path")
    }

    pub fn invalid_config_value(key: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfigValue, format!("{}: {}", key, message.into()))
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InputParseError, message)
    }
}

/// Serializable error report for logging and JSON output
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::InputParseError, format!("JSON parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<GeoError> for Error {
    fn from(err: GeoError) -> Self {
        let (code, suggestion) = match &err {
            GeoError::InvalidGeometry(_) => (
                ErrorCode::InvalidGeometry,
                Some("Check the territory boundary: polygons need 3+ vertices, circles a positive radius"),
            ),
            GeoError::UnsupportedGeometry(_) => (
                ErrorCode::UnsupportedGeometry,
                Some("Use a circle (center + radius) or a single Polygon boundary"),
            ),
            GeoError::InvalidCoordinate(_) => (
                ErrorCode::InvalidCoordinate,
                Some("Latitude must be within [-90, 90] and longitude within [-180, 180]"),
            ),
            GeoError::InvalidRecord(_) | GeoError::InvalidWkt(_) => (ErrorCode::InvalidRecord, None),
            GeoError::JsonError(_) => (ErrorCode::InputParseError, None),
        };

        let error = Error::new(code, err.to_string());
        let error = match suggestion {
            Some(s) => error.with_suggestion(s),
            None => error,
        };
        error.with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::InvalidGeometry.to_string(), "E6001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::ConfigParseError.category(), "Configuration");
        assert_eq!(ErrorCode::UnsupportedGeometry.category(), "Geometry");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::file_not_found("/path/to/territories.json")
            .with_context("While loading territories");

        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_geo_error_conversion() {
        let err: Error = GeoError::InvalidGeometry("territory t1: 2 vertices".into()).into();
        assert_eq!(err.code, ErrorCode::InvalidGeometry);
        assert!(err.suggestion.as_deref().unwrap().contains("territory boundary"));
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);

        let err: Error = GeoError::InvalidRecord("no id".into()).into();
        assert_eq!(err.code, ErrorCode::InvalidRecord);
        assert!(err.suggestion.is_none());
    }

    #[test]
    fn test_result_ext_converts_and_adds_context() {
        let result: std::result::Result<(), GeoError> =
            Err(GeoError::UnsupportedGeometry("GeoJSON MultiPolygon".into()));
        let err = result.context("While reading territories.json").unwrap_err();

        assert_eq!(err.code, ErrorCode::UnsupportedGeometry);
        assert_eq!(err.context.as_deref(), Some("While reading territories.json"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::config("bad").exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(Error::io("disk").exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_error_report_serialization() {
        let err: Error = GeoError::InvalidCoordinate("lat 91".into()).into();
        let report = err.with_context("While parsing --point").to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E6003"));
        assert!(json.contains("Geometry"));
        assert!(json.contains("INVALID_COORDINATE"));
    }
}
