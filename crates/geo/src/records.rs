//! Parsing of backend JSON records into engine values.
//!
//! Locations are accepted as:
//! - `{"lat": .., "lng": ..}` or `{"latitude": .., "longitude": ..}`
//! - GeoJSON point: `{"type": "Point", "coordinates": [lng, lat]}`
//! - WKT string: `POINT(lng lat)`
//!
//! Territories are accepted as a circle (`center` + `radius`), a `boundary`
//! of `[lat, lng]` pairs, a GeoJSON `Polygon` under `coordinates`, or the
//! engine's own serialized form under `shape`. GeoJSON and WKT are lng-first;
//! everything else is lat-first.

use crate::{Category, GeoError, GeoPoint, Polygon, Result, Shape, TaggedPoint, Territory};
use serde_json::Value;
use tracing::warn;

/// Parse a location from any supported encoding.
///
/// # Returns
/// * `Some(GeoPoint)` if parsing succeeds
/// * `None` if the value is null or not a location
///
/// # Example
/// ```
/// use territory_geo::records::parse_location;
/// use serde_json::json;
///
/// let point = parse_location(&json!({"lat": 23.0225, "lng": 72.5714})).unwrap();
/// assert_eq!(point.lat, 23.0225);
///
/// // GeoJSON is lng-first
/// let point = parse_location(&json!({"type": "Point", "coordinates": [72.5714, 23.0225]})).unwrap();
/// assert_eq!(point.lat, 23.0225);
///
/// let point = parse_location(&json!("POINT(72.5714 23.0225)")).unwrap();
/// assert_eq!(point.lng, 72.5714);
/// ```
pub fn parse_location(value: &Value) -> Option<GeoPoint> {
    if value.is_null() {
        return None;
    }

    if value.is_object() {
        if let (Some(lat), Some(lng)) = (
            value.get("lat").and_then(Value::as_f64),
            value.get("lng").and_then(Value::as_f64),
        ) {
            return Some(GeoPoint::new(lat, lng));
        }

        if let (Some(lat), Some(lng)) = (
            value.get("latitude").and_then(Value::as_f64),
            value.get("longitude").and_then(Value::as_f64),
        ) {
            return Some(GeoPoint::new(lat, lng));
        }

        if let Some(coords) = value.get("coordinates").and_then(Value::as_array) {
            if coords.len() >= 2 {
                let lng = coords[0].as_f64()?;
                let lat = coords[1].as_f64()?;
                return Some(GeoPoint::new(lat, lng));
            }
        }
    }

    if let Some(wkt) = value.as_str() {
        return parse_wkt_point(wkt).ok();
    }

    None
}

/// Parse a WKT POINT string.
///
/// Format: `POINT(longitude latitude)`
pub fn parse_wkt_point(wkt: &str) -> Result<GeoPoint> {
    let wkt = wkt.trim();

    if !wkt.starts_with("POINT(") && !wkt.starts_with("POINT (") {
        return Err(GeoError::InvalidWkt(format!("Expected POINT, got: {}", wkt)));
    }

    let start = wkt.find('(').ok_or_else(|| GeoError::InvalidWkt("Missing '('".into()))?;
    let end = wkt.find(')').ok_or_else(|| GeoError::InvalidWkt("Missing ')'".into()))?;

    if start >= end {
        return Err(GeoError::InvalidWkt("Invalid parentheses".into()));
    }

    let parts: Vec<&str> = wkt[start + 1..end].split_whitespace().collect();

    if parts.len() != 2 {
        return Err(GeoError::InvalidWkt(format!(
            "Expected 2 coordinates, got {}",
            parts.len()
        )));
    }

    let lng: f64 = parts[0]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid longitude: {}", parts[0])))?;
    let lat: f64 = parts[1]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid latitude: {}", parts[1])))?;

    Ok(GeoPoint::new(lat, lng))
}

/// Parse one territory record.
///
/// # Errors
/// * `UnsupportedGeometry` for a shape type other than circle or polygon
/// * `InvalidRecord` when the record has no id or no recognizable boundary
///
/// Geometry is not validated here; the engine does that before computing.
///
/// # Example
/// ```
/// use territory_geo::{records::parse_territory, Shape};
/// use serde_json::json;
///
/// let territory = parse_territory(&json!({
///     "id": "t-1",
///     "name": "Satellite",
///     "center": {"lat": 23.0225, "lng": 72.5714},
///     "radius": 2500
/// })).unwrap();
///
/// assert!(matches!(territory.shape, Shape::Circle(_)));
/// ```
pub fn parse_territory(value: &Value) -> Result<Territory> {
    let id = record_id(value)
        .ok_or_else(|| GeoError::InvalidRecord("territory record has no id".into()))?;

    let shape = parse_shape(value).map_err(|e| match e {
        GeoError::InvalidRecord(msg) => GeoError::InvalidRecord(format!("territory {}: {}", id, msg)),
        GeoError::UnsupportedGeometry(msg) => {
            GeoError::UnsupportedGeometry(format!("territory {}: {}", id, msg))
        }
        other => other,
    })?;

    let mut territory = Territory::new(id, shape);
    if let Some(name) = value.get("name").and_then(Value::as_str) {
        territory = territory.with_name(name);
    }
    Ok(territory)
}

/// Parse an array of territory records.
pub fn parse_territories(value: &Value) -> Result<Vec<Territory>> {
    records(value, "territories")?.iter().map(parse_territory).collect()
}

fn parse_shape(value: &Value) -> Result<Shape> {
    if let Some(shape) = value.get("shape") {
        return parse_native_shape(shape);
    }

    if let Some(center) = value.get("center") {
        let center = parse_location(center)
            .ok_or_else(|| GeoError::InvalidRecord("center is not a location".into()))?;
        let radius = value
            .get("radius")
            .or_else(|| value.get("radius_meters"))
            .or_else(|| value.get("radiusMeters"))
            .and_then(Value::as_f64)
            .ok_or_else(|| GeoError::InvalidRecord("circle has no numeric radius".into()))?;
        return Ok(Shape::Circle(crate::Circle::new(center, radius)));
    }

    if let Some(boundary) = value.get("boundary") {
        return Ok(Shape::Polygon(Polygon::new(parse_lat_lng_pairs(boundary)?)));
    }

    if let Some(geojson) = value.get("coordinates").filter(|c| c.is_object()) {
        return parse_geojson_geometry(geojson);
    }

    Err(GeoError::InvalidRecord(
        "expected one of shape, center/radius, boundary, or GeoJSON coordinates".into(),
    ))
}

/// The engine's own `{"type": "circle" | "polygon", ...}` form.
fn parse_native_shape(shape: &Value) -> Result<Shape> {
    let kind = shape
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoError::InvalidRecord("shape has no type".into()))?;

    match kind {
        "circle" | "polygon" => Ok(serde_json::from_value(shape.clone())?),
        other => Err(GeoError::UnsupportedGeometry(format!("shape type {}", other))),
    }
}

/// GeoJSON geometry: only `Polygon` is supported; its first ring is the outer boundary.
fn parse_geojson_geometry(geometry: &Value) -> Result<Shape> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoError::InvalidRecord("GeoJSON geometry has no type".into()))?;

    if kind != "Polygon" {
        return Err(GeoError::UnsupportedGeometry(format!("GeoJSON {}", kind)));
    }

    let rings = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| GeoError::InvalidRecord("GeoJSON polygon has no rings".into()))?;

    let outer = rings
        .first()
        .ok_or_else(|| GeoError::InvalidRecord("GeoJSON polygon has no rings".into()))?;

    if rings.len() > 1 {
        warn!(holes = rings.len() - 1, "Ignoring GeoJSON polygon holes");
    }

    let vertices = pairs(outer)?
        .into_iter()
        .map(|(lng, lat)| GeoPoint::new(lat, lng))
        .collect();

    Ok(Shape::Polygon(Polygon::new(vertices)))
}

fn parse_lat_lng_pairs(value: &Value) -> Result<Vec<GeoPoint>> {
    Ok(pairs(value)?
        .into_iter()
        .map(|(lat, lng)| GeoPoint::new(lat, lng))
        .collect())
}

/// Reads `[[a, b], ...]` without deciding which axis comes first.
fn pairs(value: &Value) -> Result<Vec<(f64, f64)>> {
    let array = value
        .as_array()
        .ok_or_else(|| GeoError::InvalidRecord("boundary is not an array".into()))?;

    array
        .iter()
        .enumerate()
        .map(|(idx, pair)| {
            let parsed = match pair.as_array().map(|p| p.as_slice()) {
                Some([a, b, ..]) => a.as_f64().zip(b.as_f64()),
                _ => None,
            };
            parsed.ok_or_else(|| {
                GeoError::InvalidRecord(format!("boundary vertex {} is not a number pair", idx))
            })
        })
        .collect()
}

/// Parse one pin, post, or comment record into tagged points.
///
/// A record with several tags in `type` yields one point per tag, in tag
/// order. Records without `type` get `default_category`.
///
/// # Errors
/// `InvalidRecord` for a missing location, an empty tag list, or a non-string tag.
///
/// # Example
/// ```
/// use territory_geo::{records::parse_point_record, Category};
/// use serde_json::json;
///
/// let pin = json!({
///     "id": "pin-7",
///     "location": {"lat": 23.03, "lng": 72.58},
///     "type": ["job", "office"]
/// });
///
/// let points = parse_point_record(&pin, &Category::Comment).unwrap();
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[1].category, Category::Office);
/// ```
pub fn parse_point_record(value: &Value, default_category: &Category) -> Result<Vec<TaggedPoint>> {
    let id = record_id(value);
    let label = id.as_deref().unwrap_or("<no id>");

    let location = value
        .get("location")
        .and_then(parse_location)
        .ok_or_else(|| GeoError::InvalidRecord(format!("record {}: missing or invalid location", label)))?;

    let categories = match value.get("type") {
        None | Some(Value::Null) => vec![default_category.clone()],
        Some(Value::String(tag)) => vec![Category::from(tag.as_str())],
        Some(Value::Array(tags)) if tags.is_empty() => {
            return Err(GeoError::InvalidRecord(format!("record {}: empty type list", label)));
        }
        Some(Value::Array(tags)) => tags
            .iter()
            .map(|tag| {
                tag.as_str().map(Category::from).ok_or_else(|| {
                    GeoError::InvalidRecord(format!("record {}: type tags must be strings", label))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(GeoError::InvalidRecord(format!(
                "record {}: type must be a string or an array of strings",
                label
            )));
        }
    };

    Ok(categories
        .into_iter()
        .map(|category| TaggedPoint {
            id: id.clone(),
            category,
            location,
        })
        .collect())
}

/// Parse an array of point records, flattening multi-tag records in order.
pub fn parse_point_records(value: &Value, default_category: &Category) -> Result<Vec<TaggedPoint>> {
    let mut points = Vec::new();
    for record in records(value, "points")? {
        points.extend(parse_point_record(record, default_category)?);
    }
    Ok(points)
}

fn records<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| GeoError::InvalidRecord(format!("expected an array of {}", what)))
}

/// String or numeric id, also accepting Mongo-style `_id`.
/// The `id` (or `_id`) of a backend record, string or numeric.
pub fn record_id(value: &Value) -> Option<String> {
    let id = value.get("id").or_else(|| value.get("_id"))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
