//! Territory membership aggregation.
//!
//! Given one territory and a snapshot of tagged points, collect the points the
//! territory contains, count them by category, and score them with a weight
//! table supplied by the caller.

use crate::shape::PreparedShape;
use crate::{Category, GeoPoint, Result, Territory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A point of interest with a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedPoint {
    /// Source record identifier, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Category used for grouping and scoring
    pub category: Category,
    /// Where the point is
    pub location: GeoPoint,
}

impl TaggedPoint {
    /// Creates an anonymous tagged point.
    pub fn new(category: Category, location: GeoPoint) -> Self {
        Self {
            id: None,
            category,
            location,
        }
    }

    /// Sets the source record identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Weight table for the composite score.
///
/// Categories missing from `weights` score `default_weight` per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Per-category weight
    #[serde(default)]
    pub weights: BTreeMap<Category, f64>,
    /// Weight for categories without an entry
    #[serde(default = "default_weight")]
    pub default_weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for ScoringPolicy {
    /// Every point weighs 1.
    fn default() -> Self {
        Self {
            weights: BTreeMap::new(),
            default_weight: default_weight(),
        }
    }
}

impl ScoringPolicy {
    /// Creates a policy from a weight table.
    pub fn new(weights: BTreeMap<Category, f64>) -> Self {
        Self {
            weights: weights.into_iter().map(|(c, w)| (c.normalized(), w)).collect(),
            default_weight: default_weight(),
        }
    }

    /// Sets one category's weight.
    pub fn with_weight(mut self, category: Category, weight: f64) -> Self {
        self.weights.insert(category.normalized(), weight);
        self
    }

    /// Sets the fallback weight.
    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Weight applied to each point of `category`.
    #[inline]
    pub fn weight_for(&self, category: &Category) -> f64 {
        self.weights
            .get(&category.normalized())
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Weighted sum over category counts, in category order.
    pub fn score(&self, counts: &BTreeMap<Category, usize>) -> f64 {
        counts
            .iter()
            .map(|(category, &count)| count as f64 * self.weight_for(category))
            .sum()
    }
}

/// Aggregated membership of one territory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResult {
    /// Territory the result belongs to
    pub territory_id: String,
    /// Contained points, in input order
    pub contained_points: Vec<TaggedPoint>,
    /// Number of contained points per category
    #[serde(rename = "counts")]
    pub counts_by_category: BTreeMap<Category, usize>,
    /// Weighted sum of the counts
    pub total_score: f64,
}

impl MembershipResult {
    /// Total number of contained points.
    pub fn total_points(&self) -> usize {
        self.contained_points.len()
    }

    /// Count for one category, zero when absent.
    pub fn count(&self, category: &Category) -> usize {
        self.counts_by_category
            .get(&category.normalized())
            .copied()
            .unwrap_or(0)
    }

    /// Compact JSON form without the point list.
    pub fn summary_json(&self) -> serde_json::Value {
        serde_json::json!({
            "territoryId": self.territory_id,
            "counts": self.counts_by_category,
            "totalScore": self.total_score,
        })
    }
}

/// Membership computation with a fixed scoring policy.
///
/// Holds no mutable state; one engine can serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct MembershipEngine {
    policy: ScoringPolicy,
    strict_coordinates: bool,
}

impl MembershipEngine {
    /// Creates an engine with the given policy.
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            policy,
            strict_coordinates: false,
        }
    }

    /// Range-check every coordinate before computing.
    pub fn with_strict_coordinates(mut self, strict: bool) -> Self {
        self.strict_coordinates = strict;
        self
    }

    /// The scoring policy in use.
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Checks the territory (and, in strict mode, the points) without computing.
    pub fn check(&self, territory: &Territory, points: &[TaggedPoint]) -> Result<()> {
        self.prepare_territory(territory)?;
        self.check_points(points)
    }

    /// Validates the boundary (and its coordinates in strict mode) once and
    /// returns the shape ready for containment tests.
    pub(crate) fn prepare_territory<'t>(&self, territory: &'t Territory) -> Result<PreparedShape<'t>> {
        let shape = territory.prepare()?;
        if self.strict_coordinates {
            territory.validate_coordinates()?;
        }
        Ok(shape)
    }

    pub(crate) fn check_points(&self, points: &[TaggedPoint]) -> Result<()> {
        if self.strict_coordinates {
            points.iter().try_for_each(|p| p.location.validate())?;
        }
        Ok(())
    }

    /// Computes the membership of `territory` over `points`.
    ///
    /// # Errors
    /// `InvalidGeometry` for a bad boundary, `InvalidCoordinate` in strict mode.
    /// Nothing is computed when an error is returned.
    pub fn compute(&self, territory: &Territory, points: &[TaggedPoint]) -> Result<MembershipResult> {
        self.check_points(points)?;
        let shape = self.prepare_territory(territory)?;
        Ok(self.aggregate(territory, shape, points))
    }

    /// Counts and scores the points inside an already prepared territory.
    pub(crate) fn aggregate(
        &self,
        territory: &Territory,
        shape: PreparedShape<'_>,
        points: &[TaggedPoint],
    ) -> MembershipResult {
        let contained_points: Vec<TaggedPoint> = points
            .iter()
            .filter(|p| shape.contains(&p.location))
            .cloned()
            .collect();

        let mut counts_by_category = BTreeMap::new();
        for point in &contained_points {
            *counts_by_category.entry(point.category.normalized()).or_insert(0) += 1;
        }

        let total_score = self.policy.score(&counts_by_category);

        debug!(
            territory = %territory.id,
            shape = territory.shape.kind(),
            tested = points.len(),
            contained = contained_points.len(),
            total_score,
            "Computed territory membership"
        );

        MembershipResult {
            territory_id: territory.id.clone(),
            contained_points,
            counts_by_category,
            total_score,
        }
    }
}

/// Computes the membership of one territory with the given policy.
///
/// # Example
/// ```
/// use territory_geo::{compute_membership, Category, GeoPoint, ScoringPolicy, TaggedPoint, Territory};
///
/// let square = Territory::polygon("p1", vec![
///     GeoPoint::new(23.0, 72.5),
///     GeoPoint::new(23.0, 72.6),
///     GeoPoint::new(23.1, 72.6),
///     GeoPoint::new(23.1, 72.5),
/// ]);
/// let points = [TaggedPoint::new(Category::Office, GeoPoint::new(23.05, 72.55))];
/// let policy = ScoringPolicy::default().with_weight(Category::Office, 2.5);
///
/// let result = compute_membership(&square, &points, &policy).unwrap();
/// assert_eq!(result.count(&Category::Office), 1);
/// assert_eq!(result.total_score, 2.5);
/// ```
pub fn compute_membership(
    territory: &Territory,
    points: &[TaggedPoint],
    policy: &ScoringPolicy,
) -> Result<MembershipResult> {
    MembershipEngine::new(policy.clone()).compute(territory, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoError;

    const CENTER: GeoPoint = GeoPoint::new(23.0225, 72.5714);

    fn satellite() -> Territory {
        Territory::circle("satellite", CENTER, 2500.0)
    }

    fn points() -> Vec<TaggedPoint> {
        vec![
            TaggedPoint::new(Category::Job, CENTER).with_id("pin-1"),
            TaggedPoint::new(Category::Landmark, GeoPoint::new(23.2, 72.9)).with_id("pin-2"),
            TaggedPoint::new(Category::Job, GeoPoint::new(23.03, 72.57)).with_id("pin-3"),
            TaggedPoint::new(Category::Shop, GeoPoint::new(23.02, 72.58)).with_id("pin-4"),
        ]
    }

    #[test]
    fn test_counts_and_default_score() {
        let result = compute_membership(&satellite(), &points(), &ScoringPolicy::default()).unwrap();

        assert_eq!(result.territory_id, "satellite");
        assert_eq!(result.count(&Category::Job), 2);
        assert_eq!(result.count(&Category::Shop), 1);
        assert_eq!(result.count(&Category::Landmark), 0);
        assert_eq!(result.total_points(), 3);
        assert_eq!(result.total_score, 3.0);
    }

    #[test]
    fn test_contained_points_keep_input_order() {
        let result = compute_membership(&satellite(), &points(), &ScoringPolicy::default()).unwrap();
        let ids: Vec<_> = result
            .contained_points
            .iter()
            .map(|p| p.id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["pin-1", "pin-3", "pin-4"]);
    }

    #[test]
    fn test_weighted_score() {
        let policy = ScoringPolicy::default()
            .with_weight(Category::Job, 2.0)
            .with_weight(Category::Shop, 0.5);
        let result = compute_membership(&satellite(), &points(), &policy).unwrap();
        assert_eq!(result.total_score, 4.5);
    }

    #[test]
    fn test_missing_weight_uses_default_weight() {
        let policy = ScoringPolicy::default()
            .with_weight(Category::Job, 2.0)
            .with_default_weight(0.25);
        let result = compute_membership(&satellite(), &points(), &policy).unwrap();
        assert_eq!(result.total_score, 4.25);
    }

    #[test]
    fn test_empty_points_is_not_an_error() {
        let result = compute_membership(&satellite(), &[], &ScoringPolicy::default()).unwrap();
        assert!(result.contained_points.is_empty());
        assert!(result.counts_by_category.is_empty());
        assert_eq!(result.total_score, 0.0);
    }

    #[test]
    fn test_invalid_polygon_produces_no_result() {
        let line = Territory::polygon("line", vec![GeoPoint::new(23.0, 72.5), GeoPoint::new(23.1, 72.6)]);
        let result = compute_membership(&line, &points(), &ScoringPolicy::default());
        assert!(matches!(result, Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_invalid_radius_produces_no_result() {
        let territory = Territory::circle("zero", CENTER, 0.0);
        let result = compute_membership(&territory, &points(), &ScoringPolicy::default());
        assert!(matches!(result, Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_strict_mode_rejects_bad_point() {
        let mut pts = points();
        pts.push(TaggedPoint::new(Category::Job, GeoPoint::new(123.0, 72.5)));

        let lenient = MembershipEngine::default();
        assert!(lenient.compute(&satellite(), &pts).is_ok());

        let strict = MembershipEngine::default().with_strict_coordinates(true);
        assert!(matches!(
            strict.compute(&satellite(), &pts),
            Err(GeoError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let policy = ScoringPolicy::default().with_weight(Category::Job, 0.1);
        let first = compute_membership(&satellite(), &points(), &policy).unwrap();
        let second = compute_membership(&satellite(), &points(), &policy).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_score.to_bits(), second.total_score.to_bits());
    }

    #[test]
    fn test_result_json_shape() {
        let result = compute_membership(&satellite(), &points(), &ScoringPolicy::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["territoryId"], "satellite");
        assert_eq!(json["counts"]["job"], 2);
        assert_eq!(json["counts"]["shop"], 1);
        assert_eq!(json["totalScore"], 3.0);
        assert_eq!(json["containedPoints"].as_array().unwrap().len(), 3);

        let summary = result.summary_json();
        assert!(summary.get("containedPoints").is_none());
        assert_eq!(summary["counts"]["job"], 2);
    }

    #[test]
    fn test_tags_differing_in_case_count_together() {
        let points = vec![
            TaggedPoint::new(Category::from("School"), CENTER),
            TaggedPoint::new(Category::from("school"), CENTER),
            TaggedPoint::new(Category::Other("job".into()), CENTER),
            TaggedPoint::new(Category::Job, CENTER),
        ];
        let policy = ScoringPolicy::default().with_weight(Category::Other("SCHOOL".into()), 2.0);
        let result = compute_membership(&satellite(), &points, &policy).unwrap();

        assert_eq!(result.counts_by_category.len(), 2);
        assert_eq!(result.count(&Category::Other("school".into())), 2);
        assert_eq!(result.count(&Category::Job), 2);
        assert_eq!(result.total_score, 6.0);

        assert_eq!(result.summary_json()["counts"], serde_json::json!({"job": 2, "school": 2}));
    }

    #[test]
    fn test_check_reports_invalid_territory_without_computing() {
        let engine = MembershipEngine::default();
        assert!(engine.check(&satellite(), &points()).is_ok());

        let line = Territory::polygon("line", vec![GeoPoint::new(23.0, 72.5), GeoPoint::new(23.1, 72.6)]);
        assert!(matches!(engine.check(&line, &[]), Err(GeoError::InvalidGeometry(_))));
    }

    #[test]
    fn test_policy_deserializes_from_tags() {
        let policy: ScoringPolicy =
            serde_json::from_str(r#"{"weights": {"job": 2.0, "school": 3.0}}"#).unwrap();
        assert_eq!(policy.weight_for(&Category::Job), 2.0);
        assert_eq!(policy.weight_for(&Category::Other("school".into())), 3.0);
        assert_eq!(policy.weight_for(&Category::Shop), 1.0);
    }
}
