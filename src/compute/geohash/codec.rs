//! Geohash encoding and decoding.
//!
//! A geohash interleaves longitude and latitude bisections, longitude first,
//! and packs every 5 bits (most significant first) into one base-32 character.

use crate::compute::validation::{validate_coordinate, validate_geohash, validate_precision};
use crate::error::{Result, SpotError};
use spothash_types::bbox::CellBounds;
use spothash_types::coordinate::Coordinate;

/// The geohash base-32 alphabet ("a", "i", "l" and "o" are omitted).
pub const ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision used for stored index keys.
pub const DEFAULT_PRECISION: usize = 12;

/// Longest supported geohash. 12 characters carry 60 bits, about the
/// resolution an `f64` degree value can still bisect meaningfully.
pub const MAX_PRECISION: usize = 12;

pub(crate) const BITS_PER_CHAR: usize = 5;

const INVALID: u8 = u8::MAX;

const DECODE_TABLE: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Index of an alphabet character, or `None` for bytes outside the alphabet.
pub const fn char_index(byte: u8) -> Option<u8> {
    if byte >= 128 {
        return None;
    }
    match DECODE_TABLE[byte as usize] {
        INVALID => None,
        idx => Some(idx),
    }
}

/// Encode a latitude/longitude pair as a geohash of `precision` characters.
///
/// # Errors
///
/// Returns `InvalidCoordinate` for non-finite or out-of-range input and
/// `InvalidPrecision` unless `1 <= precision <= 12`.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::encode;
///
/// let hash = encode(57.64911, 10.40744, 6)?;
/// assert_eq!(hash, "u4pruy");
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> Result<String> {
    validate_coordinate(&Coordinate::new(latitude, longitude))?;
    validate_precision(precision)?;
    Ok(encode_unchecked(latitude, longitude, precision))
}

/// Encode a [`Coordinate`]. Delegates to [`encode`].
pub fn encode_point(coord: &Coordinate, precision: usize) -> Result<String> {
    encode(coord.latitude, coord.longitude, precision)
}

/// Bisection loop without input checks. Callers have validated the input.
pub(crate) fn encode_unchecked(latitude: f64, longitude: f64, precision: usize) -> String {
    let mut bounds = CellBounds::world();
    let mut hash = String::with_capacity(precision);
    let mut buffer: u8 = 0;
    let mut bit = 0;
    let mut even = true;

    while hash.len() < precision {
        if even {
            let mid = (bounds.min_longitude + bounds.max_longitude) / 2.0;
            if longitude >= mid {
                buffer |= 1 << (4 - bit);
                bounds.min_longitude = mid;
            } else {
                bounds.max_longitude = mid;
            }
        } else {
            let mid = (bounds.min_latitude + bounds.max_latitude) / 2.0;
            if latitude >= mid {
                buffer |= 1 << (4 - bit);
                bounds.min_latitude = mid;
            } else {
                bounds.max_latitude = mid;
            }
        }
        even = !even;

        if bit < BITS_PER_CHAR - 1 {
            bit += 1;
        } else {
            hash.push(ALPHABET[buffer as usize] as char);
            buffer = 0;
            bit = 0;
        }
    }

    hash
}

/// Decode a geohash into the cell it denotes.
///
/// # Examples
///
/// ```
/// use spothash::compute::geohash::decode_bounds;
/// use spothash::Coordinate;
///
/// let cell = decode_bounds("u4pruy")?;
/// assert!(cell.contains(&Coordinate::new(57.64911, 10.40744)));
/// # Ok::<(), spothash::SpotError>(())
/// ```
pub fn decode_bounds(geohash: &str) -> Result<CellBounds> {
    validate_geohash(geohash)?;

    let mut bounds = CellBounds::world();
    let mut even = true;

    for (pos, byte) in geohash.bytes().enumerate() {
        let Some(value) = char_index(byte) else {
            return Err(SpotError::invalid_geohash(
                geohash,
                format!("byte 0x{:02x} at position {} is not in the alphabet", byte, pos),
            ));
        };
        for shift in (0..BITS_PER_CHAR).rev() {
            let upper = (value >> shift) & 1 == 1;
            if even {
                let mid = (bounds.min_longitude + bounds.max_longitude) / 2.0;
                if upper {
                    bounds.min_longitude = mid;
                } else {
                    bounds.max_longitude = mid;
                }
            } else {
                let mid = (bounds.min_latitude + bounds.max_latitude) / 2.0;
                if upper {
                    bounds.min_latitude = mid;
                } else {
                    bounds.max_latitude = mid;
                }
            }
            even = !even;
        }
    }

    Ok(bounds)
}

/// Decode a geohash into its center plus latitude and longitude errors
/// (half the cell height and width, in degrees).
pub fn decode(geohash: &str) -> Result<(Coordinate, f64, f64)> {
    let bounds = decode_bounds(geohash)?;
    Ok((
        bounds.center(),
        bounds.latitude_error(),
        bounds.longitude_error(),
    ))
}
