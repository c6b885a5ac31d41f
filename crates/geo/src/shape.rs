//! Territory shapes and the circular containment test.

use crate::polygon::{check_vertices, open_ring, ray_cast};
use crate::{distance_meters, GeoError, GeoPoint, Result};
use serde::{Deserialize, Serialize};

/// A circular geofence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the circle
    pub center: GeoPoint,
    /// Radius in meters, must be positive
    pub radius_meters: f64,
}

impl Circle {
    /// Creates a new circle.
    #[inline]
    pub const fn new(center: GeoPoint, radius_meters: f64) -> Self {
        Self { center, radius_meters }
    }

    /// Checks that the radius is positive and the center is finite.
    pub fn validate(&self) -> Result<()> {
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(GeoError::InvalidGeometry(format!(
                "circle radius must be positive, got {}",
                self.radius_meters
            )));
        }
        if !self.center.lat.is_finite() || !self.center.lng.is_finite() {
            return Err(GeoError::InvalidGeometry(format!(
                "circle center is not finite: ({}, {})",
                self.center.lat, self.center.lng
            )));
        }
        Ok(())
    }
}

/// Tests whether `point` lies within `circle`.
///
/// Boundary inclusive: a point exactly `radius_meters` from the center is inside.
///
/// # Example
/// ```
/// use territory_geo::{is_inside_circle, Circle, GeoPoint};
///
/// let circle = Circle::new(GeoPoint::new(23.0225, 72.5714), 2500.0);
/// assert!(is_inside_circle(&GeoPoint::new(23.0225, 72.5714), &circle));
/// assert!(!is_inside_circle(&GeoPoint::new(23.2, 72.9), &circle));
/// ```
#[inline]
pub fn is_inside_circle(point: &GeoPoint, circle: &Circle) -> bool {
    distance_meters(point, &circle.center) <= circle.radius_meters
}

/// A polygonal geofence, implicitly closed.
///
/// Deserialization goes through [`Polygon::new`], so a closed ring loses its
/// repeated closing vertex on every path into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolygonRecord")]
pub struct Polygon {
    /// Boundary vertices in order, without a repeated closing vertex
    pub vertices: Vec<GeoPoint>,
}

#[derive(Deserialize)]
struct PolygonRecord {
    vertices: Vec<GeoPoint>,
}

impl From<PolygonRecord> for Polygon {
    fn from(record: PolygonRecord) -> Self {
        Polygon::new(record.vertices)
    }
}

impl Polygon {
    /// Creates a polygon, dropping a trailing vertex equal to the first.
    pub fn new(mut vertices: Vec<GeoPoint>) -> Self {
        let len = open_ring(&vertices).len();
        vertices.truncate(len);
        Self { vertices }
    }

    /// Checks that the polygon can be ray cast.
    ///
    /// A closing vertex left in `vertices` by direct construction does not
    /// count towards the minimum.
    pub fn validate(&self) -> Result<()> {
        check_vertices(open_ring(&self.vertices))
    }

    /// Tests whether `point` lies inside the polygon.
    pub fn contains(&self, point: &GeoPoint) -> Result<bool> {
        crate::is_inside_polygon(point, &self.vertices)
    }

    /// Returns the inclusive bounding box, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }
}

/// An axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Smallest box containing all points.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            north: first.lat,
            south: first.lat,
            east: first.lng,
            west: first.lng,
        };

        Some(points[1..].iter().fold(init, |bbox, p| Self {
            north: bbox.north.max(p.lat),
            south: bbox.south.min(p.lat),
            east: bbox.east.max(p.lng),
            west: bbox.west.min(p.lng),
        }))
    }

    /// Inclusive containment.
    #[inline]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng <= self.east
            && point.lng >= self.west
    }
}

/// Boundary of a territory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Radius around a center point
    Circle(Circle),
    /// Pincode-style boundary
    Polygon(Polygon),
}

impl Shape {
    /// Lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "circle",
            Shape::Polygon(_) => "polygon",
        }
    }

    /// Checks that the shape can be tested.
    pub fn validate(&self) -> Result<()> {
        match self {
            Shape::Circle(circle) => circle.validate(),
            Shape::Polygon(polygon) => polygon.validate(),
        }
    }

    /// All coordinates that define the shape.
    fn coordinates(&self) -> Vec<GeoPoint> {
        match self {
            Shape::Circle(circle) => vec![circle.center],
            Shape::Polygon(polygon) => polygon.vertices.clone(),
        }
    }
}

/// A named geofenced region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    /// Backend identifier
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Geofence boundary
    pub shape: Shape,
}

impl Territory {
    /// Creates a territory with the given shape.
    pub fn new(id: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: id.into(),
            name: None,
            shape,
        }
    }

    /// Creates a circular territory.
    pub fn circle(id: impl Into<String>, center: GeoPoint, radius_meters: f64) -> Self {
        Self::new(id, Shape::Circle(Circle::new(center, radius_meters)))
    }

    /// Creates a polygonal territory.
    pub fn polygon(id: impl Into<String>, vertices: Vec<GeoPoint>) -> Self {
        Self::new(id, Shape::Polygon(Polygon::new(vertices)))
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Checks the boundary geometry.
    pub fn validate(&self) -> Result<()> {
        self.shape.validate().map_err(|e| match e {
            GeoError::InvalidGeometry(msg) => {
                GeoError::InvalidGeometry(format!("territory {}: {}", self.id, msg))
            }
            other => other,
        })
    }

    /// Range-checks every coordinate of the boundary.
    pub fn validate_coordinates(&self) -> Result<()> {
        self.shape
            .coordinates()
            .iter()
            .try_for_each(GeoPoint::validate)
            .map_err(|e| match e {
                GeoError::InvalidCoordinate(msg) => {
                    GeoError::InvalidCoordinate(format!("territory {}: {}", self.id, msg))
                }
                other => other,
            })
    }

    /// Tests whether `point` lies within the territory.
    pub fn contains(&self, point: &GeoPoint) -> Result<bool> {
        Ok(self.prepare()?.contains(point))
    }

    /// Validates once and returns a test that can run on many points.
    pub(crate) fn prepare(&self) -> Result<PreparedShape<'_>> {
        self.validate()?;
        Ok(match &self.shape {
            Shape::Circle(circle) => PreparedShape::Circle(circle),
            Shape::Polygon(polygon) => PreparedShape::Polygon {
                vertices: open_ring(&polygon.vertices),
                // validate() guarantees at least 3 vertices
                bbox: BoundingBox::from_points(&polygon.vertices).ok_or_else(|| {
                    GeoError::InvalidGeometry(format!("territory {}: empty polygon", self.id))
                })?,
            },
        })
    }
}

/// A validated shape ready for repeated containment tests.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PreparedShape<'a> {
    Circle(&'a Circle),
    Polygon {
        vertices: &'a [GeoPoint],
        bbox: BoundingBox,
    },
}

impl PreparedShape<'_> {
    #[inline]
    pub(crate) fn contains(&self, point: &GeoPoint) -> bool {
        match self {
            PreparedShape::Circle(circle) => is_inside_circle(point, circle),
            // Anything outside the inclusive box is also outside by ray casting.
            PreparedShape::Polygon { vertices, bbox } => {
                bbox.contains(point) && ray_cast(point, vertices)
            }
        }
    }
}
