//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Territory boundary cannot be tested (too few vertices, bad radius)
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Shape variant the engine does not know how to test
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Backend record is missing fields or has the wrong shape
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Invalid WKT format
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with territory-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid WKT format
    InvalidWkt = 10001,
    /// Invalid coordinate values
    InvalidCoordinate = 10002,
    /// JSON parsing error
    JsonParsing = 10003,
    /// Invalid territory geometry
    InvalidGeometry = 10004,
    /// Unsupported territory geometry
    UnsupportedGeometry = 10005,
    /// Malformed backend record
    InvalidRecord = 10006,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidGeometry(_) => GeoErrorCode::InvalidGeometry,
            GeoError::UnsupportedGeometry(_) => GeoErrorCode::UnsupportedGeometry,
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::InvalidRecord(_) => GeoErrorCode::InvalidRecord,
            GeoError::InvalidWkt(_) => GeoErrorCode::InvalidWkt,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }

    /// Returns true for errors caused by the territory boundary itself.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            GeoError::InvalidGeometry(_) | GeoError::UnsupportedGeometry(_)
        )
    }
}
