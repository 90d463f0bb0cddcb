//! Distance calculations for exact-radius filtering, built on the geo crate.

use geo::{Distance, Euclidean, Geodesic, Haversine, Rhumb};
use serde::{Deserialize, Serialize};
use spothash_types::coordinate::Coordinate;
use std::str::FromStr;

/// Mean Earth radius in meters, the sphere geo's `Haversine` measures on.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Upper bound on how much longer the Haversine distance between two points
/// can be than their WGS84 geodesic distance, as a fraction. Short
/// north-south arcs at the equator come closest, at about 0.56%.
pub const GEODESIC_COVERAGE_MARGIN: f64 = 0.01;

/// Distance metrics for the final radius filter.
///
/// - **Haversine**: Fast spherical distance, good for most lon/lat calculations
/// - **Geodesic**: More accurate ellipsoidal distance (Karney 2013), slower
/// - **Rhumb**: Constant bearing distance, useful for navigation
/// - **Euclidean**: Planar distance in degrees; only meaningful for projected
///   coordinates or relative comparisons. The planner rejects it because
///   search radii are in meters.
///
/// Covered-radius guarantees are computed on the Haversine sphere. The
/// planner widens the covering radius for `Geodesic` by
/// [`GEODESIC_COVERAGE_MARGIN`] (see [`DistanceMetric::coverage_radius`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Geodesic,
    Rhumb,
    Euclidean,
}

impl DistanceMetric {
    /// Whether [`distance_between`] returns meters for this metric.
    /// `Euclidean` works in degrees and cannot be compared with a radius in
    /// meters.
    pub const fn measures_meters(self) -> bool {
        !matches!(self, DistanceMetric::Euclidean)
    }

    /// Radius on the Haversine sphere that contains every point within
    /// `radius_meters` of a center by this metric.
    ///
    /// Rhumb distances are never shorter than great-circle distances on the
    /// same sphere, so only `Geodesic` needs widening.
    pub fn coverage_radius(self, radius_meters: f64) -> f64 {
        match self {
            DistanceMetric::Geodesic => radius_meters * (1.0 + GEODESIC_COVERAGE_MARGIN),
            _ => radius_meters,
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "haversine" => Ok(DistanceMetric::Haversine),
            "geodesic" => Ok(DistanceMetric::Geodesic),
            "rhumb" => Ok(DistanceMetric::Rhumb),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            other => Err(format!("Unknown distance metric: {}", other)),
        }
    }
}

/// Calculate the distance between two coordinates using the specified metric.
///
/// Returns meters for every metric except `Euclidean`, which returns degrees.
///
/// # Examples
///
/// ```rust
/// use spothash::{Coordinate, DistanceMetric, compute::spatial::distance_between};
///
/// let amsterdam = Coordinate::new(52.3676, 4.9041);
/// let rotterdam = Coordinate::new(51.9244, 4.4777);
///
/// let dist = distance_between(&amsterdam, &rotterdam, DistanceMetric::Haversine);
/// assert!(dist > 55_000.0 && dist < 60_000.0);
/// ```
pub fn distance_between(a: &Coordinate, b: &Coordinate, metric: DistanceMetric) -> f64 {
    let (p1, p2) = (a.to_point(), b.to_point());
    match metric {
        DistanceMetric::Haversine => Haversine.distance(p1, p2),
        DistanceMetric::Geodesic => Geodesic.distance(p1, p2),
        DistanceMetric::Rhumb => Rhumb.distance(p1, p2),
        DistanceMetric::Euclidean => Euclidean.distance(p1, p2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_metrics_agree_roughly() {
        let nyc = Coordinate::new(40.7128, -74.0060);
        let la = Coordinate::new(34.0522, -118.2437);

        let hav = distance_between(&nyc, &la, DistanceMetric::Haversine);
        let geo = distance_between(&nyc, &la, DistanceMetric::Geodesic);
        let rhumb = distance_between(&nyc, &la, DistanceMetric::Rhumb);

        assert!(hav > 3_900_000.0 && hav < 4_000_000.0);
        assert!((hav - geo).abs() / geo < 0.01);
        // Rhumb lines are never shorter than the great circle
        assert!(rhumb >= hav);
    }

    #[test]
    fn test_zero_distance() {
        let p = Coordinate::new(52.3676, 4.9041);
        assert_eq!(distance_between(&p, &p, DistanceMetric::Haversine), 0.0);
        assert_eq!(distance_between(&p, &p, DistanceMetric::Euclidean), 0.0);
    }

    #[test]
    fn test_haversine_uses_mean_radius() {
        // A quarter meridian on the mean sphere
        let equator = Coordinate::new(0.0, 0.0);
        let pole = Coordinate::new(90.0, 0.0);
        let d = distance_between(&equator, &pole, DistanceMetric::Haversine);
        let expected = EARTH_RADIUS_METERS * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn test_geodesic_within_coverage_margin() {
        let pairs = [
            ((0.0, 0.0), (1.0, 0.0)),
            ((0.0, 0.0), (0.0, 1.0)),
            ((-0.5, 30.0), (0.5, 30.0)),
            ((52.3676, 4.9041), (52.3731, 4.8926)),
            ((60.0, 10.0), (61.0, 10.0)),
            ((89.9, 0.0), (89.995, 100.0)),
            ((40.7128, -74.0060), (34.0522, -118.2437)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let a = Coordinate::new(lat1, lon1);
            let b = Coordinate::new(lat2, lon2);
            let geodesic = distance_between(&a, &b, DistanceMetric::Geodesic);
            let haversine = distance_between(&a, &b, DistanceMetric::Haversine);
            assert!(
                haversine <= DistanceMetric::Geodesic.coverage_radius(geodesic),
                "{} -> {}: haversine {} geodesic {}",
                a,
                b,
                haversine,
                geodesic
            );
        }
        assert_eq!(DistanceMetric::Haversine.coverage_radius(100.0), 100.0);
        assert_eq!(DistanceMetric::Rhumb.coverage_radius(100.0), 100.0);
        assert!(!DistanceMetric::Euclidean.measures_meters());
        assert!(DistanceMetric::Geodesic.measures_meters());
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!(
            "Geodesic".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Geodesic
        );
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_metric_serde() {
        let json = serde_json::to_string(&DistanceMetric::Rhumb).unwrap();
        assert_eq!(json, r#""rhumb""#);
    }
}
