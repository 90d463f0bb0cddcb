//! Proximity query planning.
//!
//! A search runs in two phases:
//!
//! ```text
//! plan:    center + radius -> precision -> covering set -> key ranges
//! execute: one range query per key -> union by id -> exact distance filter
//!          -> sort nearest first -> limit
//! ```
//!
//! The covering set is normally the center cell and its eight neighbors.
//! When even precision-1 cells are too small for the radius (continental
//! radii, or a center on a pole), further rings of neighbors are added until
//! the block contains the whole circle. Either way it is a rectangular
//! over-approximation of the search circle, so rows come back that lie
//! outside the radius. They are dropped
//! by the exact distance filter. Rows for different keys never overlap for
//! well-formed stores, but the union tolerates overlap (and any arrival
//! order) so callers may run the range queries in parallel.

use crate::compute::geohash::cells::{covered_radius, precision_for_radius, rings_for_radius};
use crate::compute::geohash::codec::encode_point;
use crate::compute::geohash::neighbors::{CoveringSet, expand_rings, neighbors_with_self};
use crate::compute::spatial::{DistanceMetric, distance_between};
use crate::compute::validation::{validate_coordinate, validate_radius};
use crate::config::PlannerConfig;
use crate::error::{Result, SpotError};
use crate::record::{GeoRecord, IndexedLocation, Located};
use crate::source::{CandidateSource, KeyRange};
use rustc_hash::FxHashSet;
use spothash_types::coordinate::Coordinate;
use std::cmp::Ordering;

/// The covering set of geohash keys for a center at `precision`: the
/// center's cell followed by its neighbors.
///
/// # Examples
///
/// ```
/// use spothash::{Coordinate, candidate_keys};
///
/// let keys = candidate_keys(&Coordinate::new(57.64911, 10.40744), 6)?;
/// assert_eq!(keys.len(), 9);
/// assert_eq!(keys[0], "u4pruy");
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn candidate_keys(center: &Coordinate, precision: usize) -> Result<CoveringSet> {
    let hash = encode_point(center, precision)?;
    neighbors_with_self(&hash)
}

/// A row that passed the exact distance filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<R> {
    pub row: R,
    /// Distance from the search center, in the metric's unit
    pub distance: f64,
}

fn sort_nearest_first<R: Located>(matches: &mut [Match<R>]) {
    matches.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.row.id().cmp(b.row.id()))
    });
}

/// Keep the rows within `radius` of `center`, nearest first.
///
/// `radius` is in the unit of `metric`: meters for every metric except
/// `Euclidean`, which measures degrees.
///
/// This is the final step of every search. It is exposed for callers that
/// issue the range queries themselves.
///
/// # Examples
///
/// ```
/// use spothash::{Coordinate, DistanceMetric, GeoRecord, filter_within_radius};
///
/// let center = Coordinate::new(52.3676, 4.9041);
/// let rows = vec![
///     GeoRecord::new("dam", Coordinate::new(52.3731, 4.8926), 12, ())?,
///     GeoRecord::new("utrecht", Coordinate::new(52.0907, 5.1214), 12, ())?,
/// ];
///
/// let near = filter_within_radius(&center, 2_000.0, rows, DistanceMetric::Haversine);
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].row.id, "dam");
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn filter_within_radius<R, I>(
    center: &Coordinate,
    radius: f64,
    rows: I,
    metric: DistanceMetric,
) -> Vec<Match<R>>
where
    R: Located,
    I: IntoIterator<Item = R>,
{
    let mut matches: Vec<Match<R>> = rows
        .into_iter()
        .filter_map(|row| {
            let distance = distance_between(center, &row.coordinate(), metric);
            (distance <= radius).then_some(Match { row, distance })
        })
        .collect();
    sort_nearest_first(&mut matches);
    matches
}

/// Everything needed to run a proximity search against a store.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub center: Coordinate,
    pub radius_meters: f64,
    /// Precision of the query keys
    pub precision: usize,
    /// Rings of neighbors around the center cell; 1 unless precision-1
    /// cells are too small for the radius
    pub rings: usize,
    /// Covering set, center cell first
    pub keys: CoveringSet,
    /// One prefix range per key, in key order
    pub ranges: Vec<KeyRange>,
}

impl QueryPlan {
    /// Whether a stored geohash falls inside one of the planned ranges.
    pub fn covers(&self, geohash: &str) -> bool {
        self.ranges.iter().any(|range| range.contains(geohash))
    }
}

/// Statistics about a search execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of range queries issued
    pub keys_queried: usize,

    /// Rows returned by the source (before deduplication and filtering)
    pub candidates_examined: usize,

    /// Rows seen more than once across ranges
    pub duplicates_skipped: usize,

    /// Rows inside the covering cells but beyond the radius
    pub false_positives: usize,

    /// Matches returned (after the result limit)
    pub matches: usize,
}

/// Plans and executes proximity searches according to a [`PlannerConfig`].
///
/// # Examples
///
/// ```
/// use spothash::{Coordinate, MemoryStore, ProximityPlanner};
///
/// let planner = ProximityPlanner::default();
/// let mut store = MemoryStore::new();
/// store.upsert(planner.record("dam", Coordinate::new(52.3731, 4.8926), "Dam Square")?);
/// store.upsert(planner.record("zoo", Coordinate::new(52.3664, 4.9163), "Artis")?);
///
/// let near = planner.search(&Coordinate::new(52.3728, 4.8936), 250.0, &store)?;
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].row.data, "Dam Square");
/// # Ok::<(), spothash::SpotError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProximityPlanner {
    config: PlannerConfig,
}

impl ProximityPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate().map_err(SpotError::Config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Index a coordinate for storage at the configured storage precision.
    pub fn index_location(&self, coord: Coordinate) -> Result<IndexedLocation> {
        IndexedLocation::new(coord, self.config.storage_precision)
    }

    /// Build a record indexed at the configured storage precision.
    pub fn record<T>(
        &self,
        id: impl Into<String>,
        coord: Coordinate,
        data: T,
    ) -> Result<GeoRecord<T>> {
        GeoRecord::new(id, coord, self.config.storage_precision, data)
    }

    /// Work out which key ranges to query for a search.
    ///
    /// Uses the configured query precision if set, otherwise the largest
    /// precision whose covering set contains the whole search circle. The
    /// precision never exceeds the storage precision, since a prefix longer
    /// than the stored keys matches nothing.
    ///
    /// A derived precision is chosen for the radius widened by
    /// [`DistanceMetric::coverage_radius`], so geodesic searches do not miss
    /// rows the spherical bound would leave out. When precision 1 still does
    /// not cover that radius the plan expands rings of neighbors until it
    /// does, which can reach all 32 top-level cells.
    pub fn plan(&self, center: &Coordinate, radius_meters: f64) -> Result<QueryPlan> {
        validate_coordinate(center)?;
        validate_radius(radius_meters)?;

        let coverage_radius = self.config.metric.coverage_radius(radius_meters);
        let precision = match self.config.query_precision {
            Some(fixed) => {
                let covered = covered_radius(center, fixed)?;
                if covered < radius_meters {
                    log::warn!(
                        "Query precision {} covers only {:.1} m around {}; \
                        matches beyond that but within {} m may be missed",
                        fixed,
                        covered,
                        center,
                        radius_meters
                    );
                }
                fixed
            }
            None => precision_for_radius(center, coverage_radius)?,
        }
        .min(self.config.storage_precision);

        let rings = if self.config.query_precision.is_none() && precision == 1 {
            rings_for_radius(center, precision, coverage_radius)?
        } else {
            1
        };
        let keys = if rings == 1 {
            candidate_keys(center, precision)?
        } else {
            let hash = encode_point(center, precision)?;
            expand_rings(&hash, rings)?.into_iter().collect()
        };
        let ranges = keys.iter().map(|key| KeyRange::for_prefix(key)).collect();

        log::debug!(
            "Planned search around {} within {} m: precision {}, {} rings, {} keys",
            center,
            radius_meters,
            precision,
            rings,
            keys.len()
        );

        Ok(QueryPlan {
            center: *center,
            radius_meters,
            precision,
            rings,
            keys,
            ranges,
        })
    }

    /// Run a plan against a candidate source.
    pub fn execute<S: CandidateSource>(
        &self,
        plan: &QueryPlan,
        source: &S,
    ) -> Result<Vec<Match<S::Row>>> {
        self.execute_with_stats(plan, source)
            .map(|(matches, _)| matches)
    }

    /// Run a plan and report how much work it took.
    pub fn execute_with_stats<S: CandidateSource>(
        &self,
        plan: &QueryPlan,
        source: &S,
    ) -> Result<(Vec<Match<S::Row>>, SearchStats)> {
        let mut stats = SearchStats::default();
        let mut seen = FxHashSet::default();
        let mut matches = Vec::new();

        for range in &plan.ranges {
            let rows = source.query_range(range)?;
            stats.keys_queried += 1;
            log::trace!("Key {} returned {} rows", range.prefix(), rows.len());

            for row in rows {
                stats.candidates_examined += 1;
                if !seen.insert(row.id().to_string()) {
                    stats.duplicates_skipped += 1;
                    continue;
                }

                let distance = distance_between(&plan.center, &row.coordinate(), self.config.metric);
                if distance <= plan.radius_meters {
                    matches.push(Match { row, distance });
                } else {
                    stats.false_positives += 1;
                }
            }
        }

        sort_nearest_first(&mut matches);
        if let Some(limit) = self.config.max_results {
            matches.truncate(limit);
        }
        stats.matches = matches.len();

        log::debug!(
            "Search examined {} candidates, {} matched ({} false positives)",
            stats.candidates_examined,
            stats.matches,
            stats.false_positives
        );

        Ok((matches, stats))
    }

    /// Plan and execute a search for rows within `radius_meters` of `center`.
    pub fn search<S: CandidateSource>(
        &self,
        center: &Coordinate,
        radius_meters: f64,
        source: &S,
    ) -> Result<Vec<Match<S::Row>>> {
        let plan = self.plan(center, radius_meters)?;
        self.execute(&plan, source)
    }

    /// Like [`search`](Self::search), also returning execution statistics.
    pub fn search_with_stats<S: CandidateSource>(
        &self,
        center: &Coordinate,
        radius_meters: f64,
        source: &S,
    ) -> Result<(Vec<Match<S::Row>>, SearchStats)> {
        let plan = self.plan(center, radius_meters)?;
        self.execute_with_stats(&plan, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryStore;
    use std::cell::RefCell;

    const AMSTERDAM: Coordinate = Coordinate::new(52.3676, 4.9041);

    /// Source that returns every row for every range, to exercise the union.
    struct EverythingSource {
        rows: Vec<GeoRecord<()>>,
        calls: RefCell<usize>,
    }

    impl CandidateSource for EverythingSource {
        type Row = GeoRecord<()>;

        fn query_range(&self, _range: &KeyRange) -> Result<Vec<Self::Row>> {
            *self.calls.borrow_mut() += 1;
            Ok(self.rows.clone())
        }
    }

    struct FailingSource;

    impl CandidateSource for FailingSource {
        type Row = GeoRecord<()>;

        fn query_range(&self, _range: &KeyRange) -> Result<Vec<Self::Row>> {
            Err(SpotError::Source("backend unavailable".to_string()))
        }
    }

    #[test]
    fn test_candidate_keys_reference() {
        let keys = candidate_keys(&Coordinate::new(57.64911, 10.40744), 6).unwrap();
        assert_eq!(
            keys.as_slice(),
            &[
                "u4pruy", "u4pruz", "u4prvp", "u4prvn", "u4prvj", "u4pruv", "u4prut", "u4pruw",
                "u4prux"
            ]
        );
    }

    #[test]
    fn test_candidate_keys_is_deterministic() {
        let a = candidate_keys(&AMSTERDAM, 7).unwrap();
        let b = candidate_keys(&AMSTERDAM, 7).unwrap();
        assert_eq!(a, b);
        assert!(candidate_keys(&Coordinate::new(0.0, 200.0), 7).is_err());
    }

    #[test]
    fn test_plan_derives_precision_from_radius() {
        let planner = ProximityPlanner::default();
        let plan = planner.plan(&AMSTERDAM, 50.0).unwrap();
        assert_eq!(plan.precision, 7);
        assert_eq!(plan.rings, 1);
        assert_eq!(plan.keys.len(), 9);
        assert_eq!(plan.ranges.len(), 9);
        assert_eq!(plan.ranges[0], KeyRange::for_prefix(&plan.keys[0]));
        assert!(plan.covers(&encode_point(&AMSTERDAM, 12).unwrap()));
    }

    #[test]
    fn test_plan_respects_fixed_and_storage_precision() {
        let config = PlannerConfig::default().with_query_precision(5);
        let planner = ProximityPlanner::new(config).unwrap();
        assert_eq!(planner.plan(&AMSTERDAM, 10.0).unwrap().precision, 5);

        let config = PlannerConfig::default().with_storage_precision(6);
        let planner = ProximityPlanner::new(config).unwrap();
        assert_eq!(planner.plan(&AMSTERDAM, 1.0).unwrap().precision, 6);
    }

    #[test]
    fn test_plan_rejects_invalid_input() {
        let planner = ProximityPlanner::default();
        assert!(matches!(
            planner.plan(&AMSTERDAM, -1.0),
            Err(SpotError::InvalidRadius(_))
        ));
        assert!(matches!(
            planner.plan(&Coordinate::new(f64::NAN, 0.0), 10.0),
            Err(SpotError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PlannerConfig {
            max_results: Some(0),
            ..PlannerConfig::default()
        };
        assert!(matches!(
            ProximityPlanner::new(config),
            Err(SpotError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_planar_metric() {
        let config = PlannerConfig {
            metric: DistanceMetric::Euclidean,
            ..PlannerConfig::default()
        };
        assert!(matches!(
            ProximityPlanner::new(config),
            Err(SpotError::Config(_))
        ));
    }

    #[test]
    fn test_geodesic_plan_widens_coverage() {
        let radius = covered_radius(&AMSTERDAM, 7).unwrap() * 0.999;

        let haversine = ProximityPlanner::default();
        assert_eq!(haversine.plan(&AMSTERDAM, radius).unwrap().precision, 7);

        let geodesic = ProximityPlanner::new(PlannerConfig {
            metric: DistanceMetric::Geodesic,
            ..PlannerConfig::default()
        })
        .unwrap();
        let plan = geodesic.plan(&AMSTERDAM, radius).unwrap();
        assert_eq!(plan.precision, 6);
        assert_eq!(plan.rings, 1);
        assert!(covered_radius(&AMSTERDAM, 6).unwrap() >= radius * 1.01);
    }

    #[test]
    fn test_plan_expands_rings_past_coarsest_precision() {
        let planner = ProximityPlanner::default();

        let plan = planner.plan(&AMSTERDAM, 8_000_000.0).unwrap();
        assert_eq!(plan.precision, 1);
        assert_eq!(plan.rings, 4);
        assert_eq!(plan.keys.len(), 32);
        assert_eq!(plan.keys[0], "u");
        assert_eq!(plan.ranges.len(), 32);

        let pole = planner.plan(&Coordinate::new(90.0, 0.0), 1_000.0).unwrap();
        assert_eq!(pole.precision, 1);
        assert_eq!(pole.keys.len(), 32);

        let fixed = ProximityPlanner::new(PlannerConfig::default().with_query_precision(1))
            .unwrap()
            .plan(&AMSTERDAM, 8_000_000.0)
            .unwrap();
        assert_eq!(fixed.rings, 1);
        assert_eq!(fixed.keys.len(), 9);
    }

    #[test]
    fn test_search_filters_and_sorts() {
        let planner = ProximityPlanner::default();
        let store: MemoryStore<&str> = [
            ("near", 52.3680, 4.9045),
            ("nearer", 52.3677, 4.9042),
            ("edge-of-cell", 52.3690, 4.9070),
            ("far", 52.0907, 5.1214),
        ]
        .into_iter()
        .map(|(id, lat, lon)| planner.record(id, Coordinate::new(lat, lon), id).unwrap())
        .collect();

        let (matches, stats) = planner.search_with_stats(&AMSTERDAM, 100.0, &store).unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.row.id.as_str()).collect();
        assert_eq!(ids, vec!["nearer", "near"]);
        assert!(matches[0].distance < matches[1].distance);
        assert_eq!(stats.keys_queried, 9);
        assert_eq!(stats.matches, 2);
        assert_eq!(stats.candidates_examined, 2 + stats.false_positives);
    }

    #[test]
    fn test_execute_unions_overlapping_rows() {
        let rows = vec![
            GeoRecord::new("a", AMSTERDAM, 12, ()).unwrap(),
            GeoRecord::new("b", Coordinate::new(52.0, 5.0), 12, ()).unwrap(),
        ];
        let source = EverythingSource {
            rows,
            calls: RefCell::new(0),
        };

        let planner = ProximityPlanner::default();
        let plan = planner.plan(&AMSTERDAM, 100.0).unwrap();
        let (matches, stats) = planner.execute_with_stats(&plan, &source).unwrap();

        assert_eq!(*source.calls.borrow(), 9);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].row.id, "a");
        assert_eq!(stats.candidates_examined, 18);
        assert_eq!(stats.duplicates_skipped, 16);
        assert_eq!(stats.false_positives, 1);
    }

    #[test]
    fn test_max_results_limits_nearest() {
        let planner =
            ProximityPlanner::new(PlannerConfig::default().with_max_results(2)).unwrap();
        let store: MemoryStore<()> = (0..5)
            .map(|i| {
                let coord = Coordinate::new(52.3676 + i as f64 * 0.0001, 4.9041);
                planner.record(format!("spot-{}", i), coord, ()).unwrap()
            })
            .collect();

        let matches = planner.search(&AMSTERDAM, 1_000.0, &store).unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.row.id.as_str()).collect();
        assert_eq!(ids, vec!["spot-0", "spot-1"]);
    }

    #[test]
    fn test_source_errors_propagate() {
        let planner = ProximityPlanner::default();
        let err = planner.search(&AMSTERDAM, 100.0, &FailingSource).unwrap_err();
        assert!(matches!(err, SpotError::Source(_)));
    }

    #[test]
    fn test_filter_within_radius_zero() {
        let rows = vec![
            GeoRecord::new("here", AMSTERDAM, 12, ()).unwrap(),
            GeoRecord::new("there", Coordinate::new(52.3677, 4.9041), 12, ()).unwrap(),
        ];
        let matches = filter_within_radius(&AMSTERDAM, 0.0, &rows, DistanceMetric::Haversine);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].row.id, "here");
        assert_eq!(matches[0].distance, 0.0);
    }
}
