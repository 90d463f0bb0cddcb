//! Cell geometry: sizes, covered radius and radius-driven precision.

use super::codec::{BITS_PER_CHAR, MAX_PRECISION, decode_bounds, encode_unchecked};
use crate::compute::spatial::EARTH_RADIUS_METERS;
use crate::compute::validation::{validate_coordinate, validate_precision, validate_radius};
use crate::error::Result;
use spothash_types::coordinate::Coordinate;

/// Height and width in degrees of every cell at `precision`.
///
/// Longitude takes the extra bit when `5 * precision` is odd, so odd
/// precisions have cells twice as wide (in degrees) as they are tall.
pub fn cell_size_degrees(precision: usize) -> Result<(f64, f64)> {
    validate_precision(precision)?;
    let bits = precision * BITS_PER_CHAR;
    let lat_bits = bits / 2;
    let lon_bits = bits - lat_bits;
    let height = 180.0 / 2f64.powi(lat_bits as i32);
    let width = 360.0 / 2f64.powi(lon_bits as i32);
    Ok((height, width))
}

/// Approximate height and width in meters of a cell at `precision` and
/// `latitude` on a spherical Earth.
pub fn cell_size_meters(precision: usize, latitude: f64) -> Result<(f64, f64)> {
    validate_coordinate(&Coordinate::new(latitude, 0.0))?;
    let (height, width) = cell_size_degrees(precision)?;
    let height_m = EARTH_RADIUS_METERS * height.to_radians();
    let width_m = EARTH_RADIUS_METERS * width.to_radians() * latitude.to_radians().cos();
    Ok((height_m, width_m.abs()))
}

/// The radius in meters around `center` that its covering set at `precision`
/// is guaranteed to contain.
///
/// This is the great-circle distance from `center` to the nearest edge of the
/// 3 × 3 block formed by its cell and the eight neighbors. Distances to the
/// north and south edges run along the meridian; distances to the east and
/// west edges are distances to a meridian (a great circle), which bound the
/// distance to the edge segment from below. Where a neighbor row is missing
/// because the cell touches a pole, the block ends at the pole.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::covered_radius;
/// use spothash::Coordinate;
///
/// let amsterdam = Coordinate::new(52.3676, 4.9041);
/// let radius = covered_radius(&amsterdam, 7)?;
/// assert!(radius > 90.0 && radius < 110.0);
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn covered_radius(center: &Coordinate, precision: usize) -> Result<f64> {
    covered_radius_with_rings(center, precision, 1)
}

/// Like [`covered_radius`], for the block of cells within `rings` neighbor
/// steps of the center cell (see
/// [`expand_rings`](super::neighbors::expand_rings)).
///
/// Rows stop at the poles and columns wrap around the antimeridian. Once the
/// columns go all the way around, a block that reaches a pole covers the
/// whole cap, and a block that reaches both poles covers the globe: the
/// radius is then infinite.
pub fn covered_radius_with_rings(
    center: &Coordinate,
    precision: usize,
    rings: usize,
) -> Result<f64> {
    validate_coordinate(center)?;
    validate_precision(precision)?;

    let hash = encode_unchecked(center.latitude, center.longitude, precision);
    let cell = decode_bounds(&hash)?;
    let span = rings as f64;
    let (height, width) = (cell.height() * span, cell.width() * span);

    let north = (cell.max_latitude + height).min(90.0);
    let south = (cell.min_latitude - height).max(-90.0);
    let east = cell.max_longitude + width;
    let west = cell.min_longitude - width;
    let wraps = east - west >= 360.0;

    let to_parallel = |edge: f64, pole: f64, delta_deg: f64| {
        if wraps && edge == pole {
            f64::INFINITY
        } else {
            EARTH_RADIUS_METERS * delta_deg.to_radians()
        }
    };
    let cos_lat = center.latitude.to_radians().cos();
    let to_meridian = |delta_deg: f64| {
        if wraps {
            return f64::INFINITY;
        }
        let delta = delta_deg.min(90.0).to_radians();
        EARTH_RADIUS_METERS * (cos_lat * delta.sin()).clamp(0.0, 1.0).asin()
    };

    let radius = to_parallel(north, 90.0, north - center.latitude)
        .min(to_parallel(south, -90.0, center.latitude - south))
        .min(to_meridian(east - center.longitude))
        .min(to_meridian(center.longitude - west));

    Ok(radius.max(0.0))
}

/// The fewest rings around the cell of `center` at `precision` whose block
/// is guaranteed to contain every point within `radius_meters`.
///
/// Always at least 1. Enough rings to reach both poles and wrap all the way
/// around cover the globe, so the answer is bounded.
pub fn rings_for_radius(center: &Coordinate, precision: usize, radius_meters: f64) -> Result<usize> {
    validate_radius(radius_meters)?;
    let (height, width) = cell_size_degrees(precision)?;
    let max_rings = ((180.0 / height) as usize).max((360.0 / width) as usize / 2);

    for rings in 1..max_rings {
        if covered_radius_with_rings(center, precision, rings)? >= radius_meters {
            return Ok(rings);
        }
    }
    Ok(max_rings.max(1))
}

/// The largest precision whose covering set around `center` is guaranteed to
/// contain every point within `radius_meters`.
///
/// Falls back to precision 1 when even the coarsest cells cannot cover the
/// radius (very large radii, or centers at a pole). One ring of neighbors is
/// then not enough; [`rings_for_radius`] gives how many are.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::precision_for_radius;
/// use spothash::Coordinate;
///
/// let amsterdam = Coordinate::new(52.3676, 4.9041);
/// assert_eq!(precision_for_radius(&amsterdam, 50.0)?, 7);
/// assert!(precision_for_radius(&amsterdam, 5_000.0)? <= 5);
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn precision_for_radius(center: &Coordinate, radius_meters: f64) -> Result<usize> {
    validate_coordinate(center)?;
    validate_radius(radius_meters)?;

    for precision in (1..=MAX_PRECISION).rev() {
        if covered_radius(center, precision)? >= radius_meters {
            return Ok(precision);
        }
    }

    log::debug!(
        "Radius of {} m around {} exceeds what one ring of precision-1 cells covers",
        radius_meters,
        center
    );
    Ok(1)
}
