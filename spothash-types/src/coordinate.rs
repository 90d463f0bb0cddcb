use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A geographic coordinate as a latitude/longitude pair in degrees.
///
/// Unlike `geo::Point`, which is ordered `(x, y)` = `(longitude, latitude)`,
/// a `Coordinate` is constructed latitude first, which is how locations are
/// usually written down. Conversions to and from `geo::Point` swap the axes
/// accordingly.
///
/// Construction does not validate. Use [`Coordinate::is_valid`] or the
/// validation helpers of the main crate before encoding.
///
/// # Examples
///
/// ```
/// use spothash_types::coordinate::Coordinate;
///
/// let aalborg = Coordinate::new(57.64911, 10.40744);
/// assert!(aalborg.is_valid());
///
/// let off_world = Coordinate::new(91.0, 0.0);
/// assert!(!off_world.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns true when both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&self.latitude)
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&self.longitude)
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coord: Coordinate) -> Self {
        coord.to_point()
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<(f64, f64)> for Coordinate {
    /// Interprets the tuple as `(latitude, longitude)`.
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion_swaps_axes() {
        let coord = Coordinate::new(40.7128, -74.0060);
        let point: Point = coord.into();
        assert_eq!(point.x(), -74.0060);
        assert_eq!(point.y(), 40.7128);

        let back = Coordinate::from(point);
        assert_eq!(back, coord);
    }

    #[test]
    fn test_validity_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.0001, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_serde_field_names() {
        let coord = Coordinate::new(52.3676, 4.9041);
        let json = serde_json::to_string(&coord).unwrap();
        assert_eq!(json, r#"{"latitude":52.3676,"longitude":4.9041}"#);
    }
}
