//! Batch membership over many territories with optional parallelism.
//!
//! Territories are independent of one another, so the batch is a plain map
//! over the territory list. With the `parallel` feature the map runs on the
//! rayon pool.

use crate::membership::{MembershipEngine, MembershipResult, ScoringPolicy, TaggedPoint};
use crate::shape::PreparedShape;
use crate::{GeoPoint, Result, Territory};
use tracing::debug;

impl MembershipEngine {
    /// Computes the membership of every territory over the same point set.
    ///
    /// All inputs are checked first, in territory order, so the same bad input
    /// always yields the same error and no result is produced. Output order
    /// equals `territories` order.
    pub fn compute_all(
        &self,
        territories: &[Territory],
        points: &[TaggedPoint],
    ) -> Result<Vec<MembershipResult>> {
        let prepared = self.prepare_all(territories, points)?;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            Ok(prepared
                .into_par_iter()
                .map(|(territory, shape)| self.aggregate(territory, shape, points))
                .collect())
        }

        #[cfg(not(feature = "parallel"))]
        {
            Ok(self.aggregate_in_order(prepared, points))
        }
    }

    /// Same as [`compute_all`](Self::compute_all), on the calling thread only.
    ///
    /// For callers without a thread pool, such as the WASM bindings.
    pub fn compute_all_sequential(
        &self,
        territories: &[Territory],
        points: &[TaggedPoint],
    ) -> Result<Vec<MembershipResult>> {
        let prepared = self.prepare_all(territories, points)?;
        Ok(self.aggregate_in_order(prepared, points))
    }

    fn prepare_all<'t>(
        &self,
        territories: &'t [Territory],
        points: &[TaggedPoint],
    ) -> Result<Vec<(&'t Territory, PreparedShape<'t>)>> {
        self.check_points(points)?;
        let prepared = territories
            .iter()
            .map(|territory| self.prepare_territory(territory).map(|shape| (territory, shape)))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            territories = territories.len(),
            points = points.len(),
            "Computing batch membership"
        );
        Ok(prepared)
    }

    fn aggregate_in_order(
        &self,
        prepared: Vec<(&Territory, PreparedShape<'_>)>,
        points: &[TaggedPoint],
    ) -> Vec<MembershipResult> {
        prepared
            .into_iter()
            .map(|(territory, shape)| self.aggregate(territory, shape, points))
            .collect()
    }
}

/// Computes the membership of every territory with the given policy.
///
/// # Example
/// ```
/// use territory_geo::{compute_memberships, Category, GeoPoint, ScoringPolicy, TaggedPoint, Territory};
///
/// let territories = vec![
///     Territory::circle("satellite", GeoPoint::new(23.0225, 72.5714), 2500.0),
///     Territory::circle("gandhinagar", GeoPoint::new(23.2156, 72.6369), 5000.0),
/// ];
/// let points = vec![TaggedPoint::new(Category::Job, GeoPoint::new(23.0225, 72.5714))];
///
/// let results = compute_memberships(&territories, &points, &ScoringPolicy::default()).unwrap();
/// assert_eq!(results[0].total_points(), 1);
/// assert_eq!(results[1].total_points(), 0);
/// ```
pub fn compute_memberships(
    territories: &[Territory],
    points: &[TaggedPoint],
    policy: &ScoringPolicy,
) -> Result<Vec<MembershipResult>> {
    MembershipEngine::new(policy.clone()).compute_all(territories, points)
}

/// Ids of the territories that contain `point`, in territory order.
///
/// # Errors
/// The first territory (in order) with invalid geometry.
pub fn territories_containing<'a>(point: &GeoPoint, territories: &'a [Territory]) -> Result<Vec<&'a str>> {
    let mut ids = Vec::new();
    for territory in territories {
        if territory.contains(point)? {
            ids.push(territory.id.as_str());
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, GeoError};

    fn territories() -> Vec<Territory> {
        vec![
            Territory::circle("satellite", GeoPoint::new(23.0225, 72.5714), 2500.0),
            Territory::polygon(
                "navrangpura",
                vec![
                    GeoPoint::new(23.0, 72.5),
                    GeoPoint::new(23.0, 72.6),
                    GeoPoint::new(23.1, 72.6),
                    GeoPoint::new(23.1, 72.5),
                ],
            ),
            Territory::circle("gandhinagar", GeoPoint::new(23.2156, 72.6369), 5000.0),
        ]
    }

    fn points() -> Vec<TaggedPoint> {
        vec![
            TaggedPoint::new(Category::Job, GeoPoint::new(23.0225, 72.5714)),
            TaggedPoint::new(Category::Shop, GeoPoint::new(23.09, 72.51)),
            TaggedPoint::new(Category::Post, GeoPoint::new(23.2156, 72.6369)),
            TaggedPoint::new(Category::Comment, GeoPoint::new(24.0, 73.0)),
        ]
    }

    #[test]
    fn test_batch_preserves_territory_order() {
        let results = compute_memberships(&territories(), &points(), &ScoringPolicy::default()).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.territory_id.as_str()).collect();
        assert_eq!(ids, ["satellite", "navrangpura", "gandhinagar"]);
    }

    #[test]
    fn test_batch_counts() {
        let results = compute_memberships(&territories(), &points(), &ScoringPolicy::default()).unwrap();

        assert_eq!(results[0].count(&Category::Job), 1);
        assert_eq!(results[0].total_points(), 1);

        // Square covers both the Satellite center and the shop.
        assert_eq!(results[1].count(&Category::Job), 1);
        assert_eq!(results[1].count(&Category::Shop), 1);

        assert_eq!(results[2].count(&Category::Post), 1);
        assert_eq!(results[2].total_points(), 1);
    }

    #[test]
    fn test_batch_matches_single_computation() {
        let policy = ScoringPolicy::default().with_weight(Category::Shop, 3.0);
        let engine = MembershipEngine::new(policy);
        let batch = engine.compute_all(&territories(), &points()).unwrap();

        for (territory, result) in territories().iter().zip(&batch) {
            assert_eq!(&engine.compute(territory, &points()).unwrap(), result);
        }
    }

    #[test]
    fn test_batch_fails_on_first_invalid_territory() {
        let mut list = territories();
        list.insert(1, Territory::polygon("broken", vec![GeoPoint::new(23.0, 72.5)]));
        list.push(Territory::circle("also-broken", GeoPoint::new(23.0, 72.5), -1.0));

        let err = compute_memberships(&list, &points(), &ScoringPolicy::default()).unwrap_err();
        assert!(matches!(err, GeoError::InvalidGeometry(_)));
        assert!(err.to_string().contains("broken"));
        assert!(!err.to_string().contains("also-broken"));
    }

    #[test]
    fn test_sequential_batch_matches_default_batch() {
        let mut list = territories();
        for i in 0..40 {
            let offset = i as f64 * 0.01;
            list.push(Territory::circle(
                format!("ring-{i}"),
                GeoPoint::new(23.0 + offset, 72.5 + offset),
                1500.0 + i as f64 * 100.0,
            ));
        }
        let engine = MembershipEngine::new(ScoringPolicy::default().with_weight(Category::Job, 2.5));

        let sequential = engine.compute_all_sequential(&list, &points()).unwrap();
        assert_eq!(sequential.len(), list.len());
        assert_eq!(engine.compute_all(&list, &points()).unwrap(), sequential);
        for (territory, result) in list.iter().zip(&sequential) {
            assert_eq!(result.territory_id, territory.id);
        }
    }

    #[test]
    fn test_sequential_batch_fails_on_first_invalid_territory() {
        let mut list = territories();
        list.insert(2, Territory::circle("broken", GeoPoint::new(23.0, 72.5), 0.0));

        let err = MembershipEngine::default()
            .compute_all_sequential(&list, &points())
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_batch_with_no_territories() {
        let results = compute_memberships(&[], &points(), &ScoringPolicy::default()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_territories_containing() {
        let list = territories();
        let ids = territories_containing(&GeoPoint::new(23.0225, 72.5714), &list).unwrap();
        assert_eq!(ids, ["satellite", "navrangpura"]);

        let none = territories_containing(&GeoPoint::new(24.0, 73.0), &list).unwrap();
        assert!(none.is_empty());
    }
}
