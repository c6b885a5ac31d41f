//! WASM bindings for the geo crate.
//!
//! These bindings let the territory dashboard run containment and membership
//! checks in the browser. Inputs and outputs are JSON strings in the same
//! record formats the backend serves.

use crate::records::{parse_point_records, parse_territories, parse_territory};
use crate::{Category, Circle, GeoPoint, MembershipEngine, Polygon, ScoringPolicy};
use wasm_bindgen::prelude::*;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_json(input: &str) -> Result<serde_json::Value, JsValue> {
    serde_json::from_str(input).map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))
}

/// Empty input means "every point weighs 1".
fn parse_policy(weights_json: &str) -> Result<ScoringPolicy, JsValue> {
    if weights_json.trim().is_empty() {
        return Ok(ScoringPolicy::default());
    }
    serde_json::from_str(weights_json).map_err(|e| JsValue::from_str(&format!("Invalid weights: {}", e)))
}

/// Distance between two points in meters.
#[wasm_bindgen(js_name = distanceMeters)]
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    crate::distance_meters(&GeoPoint::new(lat1, lng1), &GeoPoint::new(lat2, lng2))
}

/// Whether a point lies within a circle (boundary inclusive).
#[wasm_bindgen(js_name = isInsideCircle)]
pub fn is_inside_circle(lat: f64, lng: f64, center_lat: f64, center_lng: f64, radius_meters: f64) -> Result<bool, JsValue> {
    let circle = Circle::new(GeoPoint::new(center_lat, center_lng), radius_meters);
    circle.validate().map_err(js_error)?;
    Ok(crate::is_inside_circle(&GeoPoint::new(lat, lng), &circle))
}

/// Whether a point lies within a boundary given as JSON `[[lat, lng], ...]`.
///
/// A closed ring is accepted; its repeated closing vertex is dropped.
#[wasm_bindgen(js_name = isInsidePolygon)]
pub fn is_inside_polygon(lat: f64, lng: f64, boundary_json: &str) -> Result<bool, JsValue> {
    let pairs: Vec<[f64; 2]> = serde_json::from_str(boundary_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    let polygon = Polygon::new(pairs.iter().map(|[lat, lng]| GeoPoint::new(*lat, *lng)).collect());

    polygon.contains(&GeoPoint::new(lat, lng)).map_err(js_error)
}

/// Membership of one territory record over an array of point records.
///
/// # Arguments
/// * `territory_json` - Territory record
/// * `points_json` - Array of pin/post/comment records
/// * `weights_json` - Scoring policy (`{"weights": {...}, "default_weight": 1}`), or empty
///
/// # Returns
/// JSON string `{territoryId, containedPoints, counts, totalScore}`
#[wasm_bindgen(js_name = computeMembership)]
pub fn compute_membership(territory_json: &str, points_json: &str, weights_json: &str) -> Result<String, JsValue> {
    let territory = parse_territory(&parse_json(territory_json)?).map_err(js_error)?;
    let points = parse_point_records(&parse_json(points_json)?, &Category::Post).map_err(js_error)?;
    let engine = MembershipEngine::new(parse_policy(weights_json)?);

    let result = engine.compute(&territory, &points).map_err(js_error)?;

    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Membership of every territory record, without the point lists.
///
/// # Returns
/// JSON array of `{territoryId, counts, totalScore}` in territory order
#[wasm_bindgen(js_name = computeMemberships)]
pub fn compute_memberships(territories_json: &str, points_json: &str, weights_json: &str) -> Result<String, JsValue> {
    let territories = parse_territories(&parse_json(territories_json)?).map_err(js_error)?;
    let points = parse_point_records(&parse_json(points_json)?, &Category::Post).map_err(js_error)?;
    let engine = MembershipEngine::new(parse_policy(weights_json)?);

    let results = engine.compute_all_sequential(&territories, &points).map_err(js_error)?;
    let summaries: Vec<_> = results.iter().map(|r| r.summary_json()).collect();

    serde_json::to_string(&summaries).map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}
