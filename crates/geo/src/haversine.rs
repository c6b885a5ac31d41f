//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::GeoPoint;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two points in meters.
///
/// Symmetric in its arguments and zero only for identical points. Inputs are
/// not range-checked; see [`GeoPoint::validate`].
///
/// # Example
/// ```
/// use territory_geo::{distance_meters, GeoPoint};
///
/// let ahmedabad = GeoPoint::new(23.0225, 72.5714);
/// let gandhinagar = GeoPoint::new(23.2156, 72.6369);
///
/// let meters = distance_meters(&ahmedabad, &gandhinagar);
/// assert!((meters - 22_500.0).abs() < 1_000.0);
/// ```
#[inline]
pub fn distance_meters(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine_with_radius(from, to, EARTH_RADIUS_M)
}

/// Calculates the great-circle distance between two points in kilometers.
///
/// # Example
/// ```
/// use territory_geo::{haversine_distance, GeoPoint};
///
/// let berlin = GeoPoint::new(52.5200, 13.4050);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = haversine_distance(&berlin, &paris);
/// assert!((distance - 878.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine_with_radius(from, to, EARTH_RADIUS_KM)
}

#[inline]
fn haversine_with_radius(from: &GeoPoint, to: &GeoPoint, radius: f64) -> f64 {
    let (lat1, lng1) = from.to_radians();
    let (lat2, lng2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lng = lng2 - lng1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * radius * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BERLIN: GeoPoint = GeoPoint { lat: 52.5200, lng: 13.4050 };
    const PARIS: GeoPoint = GeoPoint { lat: 48.8566, lng: 2.3522 };
    const NEW_YORK: GeoPoint = GeoPoint { lat: 40.7128, lng: -74.0060 };
    const TOKYO: GeoPoint = GeoPoint { lat: 35.6762, lng: 139.6503 };
    const AHMEDABAD: GeoPoint = GeoPoint { lat: 23.0225, lng: 72.5714 };

    #[test]
    fn test_berlin_to_paris() {
        let distance = haversine_distance(&BERLIN, &PARIS);
        // Expected: ~878 km
        assert!((distance - 878.0).abs() < 5.0, "Berlin-Paris: {}", distance);
    }

    #[test]
    fn test_new_york_to_tokyo() {
        let distance = haversine_distance(&NEW_YORK, &TOKYO);
        // Expected: ~10,838 km
        assert!((distance - 10838.0).abs() < 50.0, "NYC-Tokyo: {}", distance);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(distance_meters(&AHMEDABAD, &AHMEDABAD), 0.0);
    }

    #[test]
    fn test_meters_and_kilometers_agree() {
        let km = haversine_distance(&BERLIN, &PARIS);
        let meters = distance_meters(&BERLIN, &PARIS);
        assert!((meters - km * 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree along a meridian is R * pi / 180.
        let a = GeoPoint::new(23.0, 72.5);
        let b = GeoPoint::new(24.0, 72.5);
        let expected = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert!((distance_meters(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let d = distance_meters(&a, &b);
        assert!(d.is_finite());
        assert!((d - EARTH_RADIUS_M * std::f64::consts::PI).abs() < 1.0);
    }

    fn point() -> impl Strategy<Value = GeoPoint> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in point(), b in point()) {
            prop_assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
        }

        #[test]
        fn prop_distance_to_self_is_zero(a in point()) {
            prop_assert_eq!(distance_meters(&a, &a), 0.0);
        }

        #[test]
        fn prop_distance_is_non_negative(a in point(), b in point()) {
            prop_assert!(distance_meters(&a, &b) >= 0.0);
        }
    }
}
