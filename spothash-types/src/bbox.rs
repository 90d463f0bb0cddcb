use crate::coordinate::Coordinate;
use geo::Rect;
use serde::{Deserialize, Serialize};

/// The latitude/longitude rectangle covered by a geohash cell.
///
/// Bounds are in degrees. A cell produced by bisection never crosses the
/// antimeridian, so `min_longitude <= max_longitude` always holds for cells.
///
/// # Examples
///
/// ```
/// use spothash_types::bbox::CellBounds;
/// use spothash_types::coordinate::Coordinate;
///
/// let world = CellBounds::world();
/// assert_eq!(world.center(), Coordinate::new(0.0, 0.0));
/// assert_eq!(world.height(), 180.0);
/// assert_eq!(world.width(), 360.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl CellBounds {
    pub const fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// The whole lat/lon plane, the starting box for every encode.
    pub const fn world() -> Self {
        Self::new(-90.0, 90.0, -180.0, 180.0)
    }

    /// Center of the cell.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_latitude - self.min_latitude
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_longitude - self.min_longitude
    }

    /// Half the height, i.e. the latitude error of the cell center.
    pub fn latitude_error(&self) -> f64 {
        self.height() / 2.0
    }

    /// Half the width, i.e. the longitude error of the cell center.
    pub fn longitude_error(&self) -> f64 {
        self.width() / 2.0
    }

    /// Check if a coordinate lies within the cell (edges inclusive).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.latitude >= self.min_latitude
            && coord.latitude <= self.max_latitude
            && coord.longitude >= self.min_longitude
            && coord.longitude <= self.max_longitude
    }

    /// Whether the cell touches the north pole.
    pub fn touches_north_pole(&self) -> bool {
        self.max_latitude >= 90.0
    }

    /// Whether the cell touches the south pole.
    pub fn touches_south_pole(&self) -> bool {
        self.min_latitude <= -90.0
    }

    /// Convert to a `geo::Rect` in (x = longitude, y = latitude) space.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            geo::coord! { x: self.min_longitude, y: self.min_latitude },
            geo::coord! { x: self.max_longitude, y: self.max_latitude },
        )
    }
}

impl Default for CellBounds {
    fn default() -> Self {
        Self::world()
    }
}

impl From<CellBounds> for Rect<f64> {
    fn from(bounds: CellBounds) -> Self {
        bounds.to_rect()
    }
}
