//! Write path: the geohash index key and the records that carry it.

use crate::compute::geohash::codec::{decode_bounds, encode_point};
use crate::compute::validation::validate_precision;
use crate::error::{Result, SpotError};
use serde::{Deserialize, Serialize};
use spothash_types::coordinate::Coordinate;

/// Anything the proximity planner can filter: an id for deduplication and a
/// coordinate for the exact distance check.
pub trait Located {
    fn id(&self) -> &str;

    fn coordinate(&self) -> Coordinate;
}

/// The location fields stored on a record: raw latitude/longitude plus the
/// geohash index key derived from them.
///
/// The geohash is only ever produced by encoding the coordinate. It is
/// recomputed and overwritten whenever the coordinate changes and is never
/// edited on its own, so the two cannot drift apart.
///
/// # Examples
///
/// ```
/// use spothash::{Coordinate, IndexedLocation};
///
/// let mut location = IndexedLocation::new(Coordinate::new(52.3676, 4.9041), 12)?;
/// assert_eq!(location.geohash(), "u173zt5p3u1v");
///
/// let changed = location.relocate(Coordinate::new(52.3702, 4.8952))?;
/// assert!(changed);
/// assert_eq!(location.precision(), 12);
/// # Ok::<(), spothash::SpotError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedLocation {
    geohash: String,
    latitude: f64,
    longitude: f64,
}

impl IndexedLocation {
    /// Encode `coord` at `precision` (12 for stored keys).
    pub fn new(coord: Coordinate, precision: usize) -> Result<Self> {
        let geohash = encode_point(&coord, precision)?;
        Ok(Self {
            geohash,
            latitude: coord.latitude,
            longitude: coord.longitude,
        })
    }

    /// Rebuild from stored fields, checking that the key matches the
    /// coordinate. Use when reading rows back from the store.
    pub fn from_parts(geohash: &str, coord: Coordinate) -> Result<Self> {
        let cell = decode_bounds(geohash)?;
        if !cell.contains(&coord) {
            return Err(SpotError::invalid_geohash(
                geohash,
                format!("does not contain stored coordinate {}", coord),
            ));
        }
        Ok(Self {
            geohash: geohash.to_string(),
            latitude: coord.latitude,
            longitude: coord.longitude,
        })
    }

    pub fn geohash(&self) -> &str {
        &self.geohash
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn precision(&self) -> usize {
        self.geohash.len()
    }

    /// Move to a new coordinate, re-encoding at the current precision.
    ///
    /// Returns whether the index key changed. On error the location is left
    /// untouched.
    pub fn relocate(&mut self, coord: Coordinate) -> Result<bool> {
        let geohash = encode_point(&coord, self.precision())?;
        let changed = geohash != self.geohash;
        self.geohash = geohash;
        self.latitude = coord.latitude;
        self.longitude = coord.longitude;
        Ok(changed)
    }

    /// Re-encode the same coordinate at a different precision.
    pub fn reindex(&mut self, precision: usize) -> Result<()> {
        validate_precision(precision)?;
        self.geohash = encode_point(&self.coordinate(), precision)?;
        Ok(())
    }
}

/// A record as the remote store holds it: an id, its indexed location and an
/// arbitrary payload (name, rating, photos, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord<T> {
    pub id: String,
    pub location: IndexedLocation,
    pub data: T,
}

impl<T> GeoRecord<T> {
    /// Create a record, encoding its location at `precision`.
    pub fn new(
        id: impl Into<String>,
        coord: Coordinate,
        precision: usize,
        data: T,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            location: IndexedLocation::new(coord, precision)?,
            data,
        })
    }

    pub fn geohash(&self) -> &str {
        self.location.geohash()
    }
}

impl<T> Located for GeoRecord<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn coordinate(&self) -> Coordinate {
        self.location.coordinate()
    }
}

impl<L: Located + ?Sized> Located for &L {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn coordinate(&self) -> Coordinate {
        (**self).coordinate()
    }
}
