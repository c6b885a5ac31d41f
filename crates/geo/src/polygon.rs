//! Point-in-polygon test by ray casting (even-odd rule).
//!
//! Axis convention: x is longitude, y is latitude. The ray runs from the query
//! point towards increasing longitude.

use crate::{GeoError, GeoPoint, Result};

/// Minimum number of vertices for a testable polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Tests whether `point` lies inside the polygon described by `vertices`.
///
/// The vertex list is implicitly closed: the last vertex connects back to the
/// first. A repeated closing vertex is ignored, so `[a, b, a]` counts as two
/// vertices. A point exactly on an edge may be reported either way.
///
/// # Errors
/// `InvalidGeometry` if there are fewer than 3 distinct ring vertices or a
/// vertex is not finite.
///
/// # Example
/// ```
/// use territory_geo::{is_inside_polygon, GeoPoint};
///
/// let square = [
///     GeoPoint::new(23.0, 72.5),
///     GeoPoint::new(23.0, 72.6),
///     GeoPoint::new(23.1, 72.6),
///     GeoPoint::new(23.1, 72.5),
/// ];
///
/// assert!(is_inside_polygon(&GeoPoint::new(23.05, 72.55), &square).unwrap());
/// assert!(!is_inside_polygon(&GeoPoint::new(23.5, 73.0), &square).unwrap());
/// ```
pub fn is_inside_polygon(point: &GeoPoint, vertices: &[GeoPoint]) -> Result<bool> {
    let ring = open_ring(vertices);
    check_vertices(ring)?;
    Ok(ray_cast(point, ring))
}

/// The vertex list without a trailing vertex equal to the first.
pub(crate) fn open_ring(vertices: &[GeoPoint]) -> &[GeoPoint] {
    match vertices {
        [first, .., last] if first == last => &vertices[..vertices.len() - 1],
        _ => vertices,
    }
}

/// Validates a vertex list for ray casting.
pub(crate) fn check_vertices(vertices: &[GeoPoint]) -> Result<()> {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return Err(GeoError::InvalidGeometry(format!(
            "polygon needs at least {} vertices, got {}",
            MIN_POLYGON_VERTICES,
            vertices.len()
        )));
    }

    if let Some((idx, v)) = vertices
        .iter()
        .enumerate()
        .find(|(_, v)| !v.lat.is_finite() || !v.lng.is_finite())
    {
        return Err(GeoError::InvalidGeometry(format!(
            "vertex {} is not finite: ({}, {})",
            idx, v.lat, v.lng
        )));
    }

    Ok(())
}

/// Even-odd ray casting over an already validated vertex list.
pub(crate) fn ray_cast(point: &GeoPoint, vertices: &[GeoPoint]) -> bool {
    let (px, py) = (point.lng, point.lat);
    let n = vertices.len();

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (vertices[i].lng, vertices[i].lat);
        let (xj, yj) = (vertices[j].lng, vertices[j].lat);

        // The first clause guarantees yi != yj, so the division is safe.
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(23.0, 72.5),
            GeoPoint::new(23.0, 72.6),
            GeoPoint::new(23.1, 72.6),
            GeoPoint::new(23.1, 72.5),
        ]
    }

    /// A "U" shape open to the north: the notch between the arms is outside.
    fn u_shape() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(23.0, 72.5),
            GeoPoint::new(23.0, 72.8),
            GeoPoint::new(23.3, 72.8),
            GeoPoint::new(23.3, 72.7),
            GeoPoint::new(23.1, 72.7),
            GeoPoint::new(23.1, 72.6),
            GeoPoint::new(23.3, 72.6),
            GeoPoint::new(23.3, 72.5),
        ]
    }

    #[test]
    fn test_point_inside_square() {
        assert!(is_inside_polygon(&GeoPoint::new(23.05, 72.55), &square()).unwrap());
    }

    #[test]
    fn test_point_outside_square() {
        assert!(!is_inside_polygon(&GeoPoint::new(23.5, 73.0), &square()).unwrap());
        assert!(!is_inside_polygon(&GeoPoint::new(23.05, 72.4), &square()).unwrap());
        assert!(!is_inside_polygon(&GeoPoint::new(22.9, 72.55), &square()).unwrap());
    }

    #[test]
    fn test_axis_order_is_not_swapped() {
        // Same numbers with lat/lng exchanged land far outside the square.
        assert!(!is_inside_polygon(&GeoPoint::new(72.55, 23.05), &square()).unwrap());
    }

    #[test]
    fn test_concave_polygon() {
        let u = u_shape();
        // Arms
        assert!(is_inside_polygon(&GeoPoint::new(23.2, 72.55), &u).unwrap());
        assert!(is_inside_polygon(&GeoPoint::new(23.2, 72.75), &u).unwrap());
        // Base
        assert!(is_inside_polygon(&GeoPoint::new(23.05, 72.65), &u).unwrap());
        // Notch
        assert!(!is_inside_polygon(&GeoPoint::new(23.2, 72.65), &u).unwrap());
    }

    #[test]
    fn test_triangle() {
        let triangle = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ];
        assert!(is_inside_polygon(&GeoPoint::new(2.0, 2.0), &triangle).unwrap());
        assert!(!is_inside_polygon(&GeoPoint::new(6.0, 6.0), &triangle).unwrap());
    }

    #[test]
    fn test_two_vertices_is_invalid_geometry() {
        let line = [GeoPoint::new(23.0, 72.5), GeoPoint::new(23.1, 72.6)];
        let result = is_inside_polygon(&GeoPoint::new(23.05, 72.55), &line);
        assert!(matches!(result, Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_empty_polygon_is_invalid_geometry() {
        let result = is_inside_polygon(&GeoPoint::new(23.05, 72.55), &[]);
        assert!(matches!(result, Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_non_finite_vertex_is_invalid_geometry() {
        let mut vertices = square();
        vertices[2].lng = f64::NAN;
        let result = is_inside_polygon(&GeoPoint::new(23.05, 72.55), &vertices);
        assert!(matches!(result, Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_closed_two_point_ring_is_invalid_geometry() {
        let a = GeoPoint::new(23.0, 72.5);
        let ring = [a, GeoPoint::new(23.1, 72.6), a];
        let result = is_inside_polygon(&GeoPoint::new(23.05, 72.55), &ring);
        assert!(matches!(result, Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_open_ring() {
        let mut closed = square();
        closed.push(closed[0]);
        assert_eq!(open_ring(&closed), &square()[..]);
        assert_eq!(open_ring(&square()), &square()[..]);
        assert!(open_ring(&[]).is_empty());

        let single = [GeoPoint::new(1.0, 1.0)];
        assert_eq!(open_ring(&single).len(), 1);
    }

    #[test]
    fn test_repeated_closing_vertex_does_not_change_result() {
        let mut closed = square();
        closed.push(closed[0]);
        for p in [GeoPoint::new(23.05, 72.55), GeoPoint::new(23.5, 73.0)] {
            assert_eq!(ray_cast(&p, &closed), ray_cast(&p, &square()));
        }
    }

    proptest! {
        #[test]
        fn prop_rotation_does_not_change_containment(
            lat in 22.9f64..23.4,
            lng in 72.4f64..72.9,
            shift in 0usize..8,
        ) {
            let point = GeoPoint::new(lat, lng);
            let original = u_shape();
            let mut rotated = original.clone();
            rotated.rotate_left(shift);

            prop_assert_eq!(
                is_inside_polygon(&point, &original).unwrap(),
                is_inside_polygon(&point, &rotated).unwrap()
            );
        }
    }
}
