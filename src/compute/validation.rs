//! Validation for coordinates, precisions, radii and geohash strings.
//!
//! Encoding out-of-range input silently yields a degenerate cell, so every
//! public entry point checks its input here first.

use crate::compute::geohash::codec::{MAX_PRECISION, char_index};
use crate::error::{Result, SpotError};
use geo::Point;
use spothash_types::coordinate::Coordinate;

/// Validates that latitude and longitude are finite and within range.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use spothash::compute::validation::validate_coordinate;
/// use spothash::Coordinate;
///
/// assert!(validate_coordinate(&Coordinate::new(52.3676, 4.9041)).is_ok());
///
/// // Invalid latitude
/// assert!(validate_coordinate(&Coordinate::new(95.0, 4.9)).is_err());
///
/// // Invalid longitude
/// assert!(validate_coordinate(&Coordinate::new(52.3, 200.0)).is_err());
/// ```
pub fn validate_coordinate(coord: &Coordinate) -> Result<()> {
    let (lat, lon) = (coord.latitude, coord.longitude);

    if !lat.is_finite() {
        return Err(SpotError::InvalidCoordinate(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !lon.is_finite() {
        return Err(SpotError::InvalidCoordinate(format!(
            "Longitude must be finite, got: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(SpotError::InvalidCoordinate(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(SpotError::InvalidCoordinate(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    Ok(())
}

/// Validates a `geo::Point` interpreted as (x = longitude, y = latitude).
pub fn validate_point(point: &Point) -> Result<()> {
    validate_coordinate(&Coordinate::from(*point))
}

/// Validates multiple coordinates, reporting the index of the first bad one.
///
/// # Examples
///
/// ```
/// use spothash::compute::validation::validate_coordinates;
/// use spothash::Coordinate;
///
/// let coords = vec![
///     Coordinate::new(52.37, 4.90),
///     Coordinate::new(52.36, 4.88),
///     Coordinate::new(52.35, 999.0), // Invalid
/// ];
///
/// assert!(validate_coordinates(&coords).is_err());
/// ```
pub fn validate_coordinates(coords: &[Coordinate]) -> Result<()> {
    for (idx, coord) in coords.iter().enumerate() {
        validate_coordinate(coord).map_err(|e| {
            SpotError::InvalidCoordinate(format!("Coordinate at index {}: {}", idx, e))
        })?;
    }
    Ok(())
}

/// Validates a geohash precision (character length).
pub fn validate_precision(precision: usize) -> Result<()> {
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(SpotError::InvalidPrecision {
            precision,
            max: MAX_PRECISION,
        });
    }
    Ok(())
}

/// Validates a search radius in meters. Zero is allowed and matches only
/// coincident points.
pub fn validate_radius(radius_meters: f64) -> Result<()> {
    if !radius_meters.is_finite() || radius_meters < 0.0 {
        return Err(SpotError::InvalidRadius(radius_meters));
    }
    Ok(())
}

/// Validates that a string is a non-empty geohash over the base-32 alphabet.
///
/// Only lowercase characters are accepted: stored index keys are lowercase,
/// and a mixed-case prefix would never match them in a range query.
///
/// # Examples
///
/// ```
/// use spothash::compute::validation::validate_geohash;
///
/// assert!(validate_geohash("u4pruy").is_ok());
/// assert!(validate_geohash("").is_err());
/// assert!(validate_geohash("u4pa").is_err()); // 'a' is not in the alphabet
/// assert!(validate_geohash("U4PRUY").is_err());
/// ```
pub fn validate_geohash(geohash: &str) -> Result<()> {
    if geohash.is_empty() {
        return Err(SpotError::invalid_geohash(geohash, "geohash is empty"));
    }

    if geohash.len() > MAX_PRECISION {
        return Err(SpotError::invalid_geohash(
            geohash,
            format!("length exceeds maximum precision {}", MAX_PRECISION),
        ));
    }

    if let Some((pos, ch)) = geohash
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii() || char_index(*ch as u8).is_none())
    {
        return Err(SpotError::invalid_geohash(
            geohash,
            format!("character {:?} at position {} is not in the alphabet", ch, pos),
        ));
    }

    Ok(())
}
