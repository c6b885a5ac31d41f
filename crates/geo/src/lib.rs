//! Geofence membership engine for territory tracking.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Circle and polygon containment tests
//! - Per-territory membership aggregation with injected scoring weights
//! - Batch processing with optional parallelism
//! - Parsing of backend territory and pin records
//! - WASM bindings for browser usage
//!
//! Polygon tests use x = longitude, y = latitude throughout.
//!
//! # Example
//!
//! ```
//! use territory_geo::{compute_membership, Category, GeoPoint, ScoringPolicy, TaggedPoint, Territory};
//!
//! let territory = Territory::circle("satellite", GeoPoint::new(23.0225, 72.5714), 2500.0);
//! let points = vec![
//!     TaggedPoint::new(Category::Job, GeoPoint::new(23.0225, 72.5714)),
//!     TaggedPoint::new(Category::Shop, GeoPoint::new(23.0300, 72.5700)),
//!     TaggedPoint::new(Category::Job, GeoPoint::new(23.2000, 72.9000)),
//! ];
//!
//! let result = compute_membership(&territory, &points, &ScoringPolicy::default()).unwrap();
//! assert_eq!(result.contained_points.len(), 2);
//! assert_eq!(result.total_score, 2.0);
//! ```

mod haversine;
mod polygon;
mod shape;
mod category;
pub mod membership;
pub mod batch;
pub mod records;
mod error;

#[cfg(feature = "wasm")]
mod wasm;

pub use haversine::{distance_meters, haversine_distance, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use polygon::is_inside_polygon;
pub use shape::{is_inside_circle, BoundingBox, Circle, Polygon, Shape, Territory};
pub use category::Category;
pub use membership::{compute_membership, MembershipEngine, MembershipResult, ScoringPolicy, TaggedPoint};
pub use batch::{compute_memberships, territories_containing};
pub use error::{GeoError, GeoErrorCode, Result};

/// A geographic point with latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point.
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lng` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true if both values are finite and within range.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Checks the point, returning `InvalidCoordinate` when out of range.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({}, {}) is outside lat [-90, 90] / lng [-180, 180]",
                self.lat, self.lng
            )))
        }
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

impl std::str::FromStr for GeoPoint {
    type Err = GeoError;

    /// Parses `"lat,lng"` and range-checks the result.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected LAT,LNG, got: {}", s)))?;

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("invalid latitude: {}", lat.trim())))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("invalid longitude: {}", lng.trim())))?;

        let point = GeoPoint::new(lat, lng);
        point.validate()?;
        Ok(point)
    }
}
