//! # Geohash indexing
//!
//! Remote document stores generally cannot answer "everything within 2 km of
//! here". They can, however, range-scan an indexed string field. A geohash
//! turns a coordinate into such a string: shared prefixes denote nearby
//! cells, so a proximity search becomes a handful of prefix range scans.
//!
//! ## Write path
//!
//! ```text
//! 1. A record is created or its coordinate edited
//! 2. encode(lat, lon, 12) -> "u173zt5p3u1v"
//! 3. The key is stored next to the raw lat/lon and overwritten on every edit
//! ```
//!
//! ## Read path
//!
//! ```text
//! 1. Pick a precision whose cells are at least as large as the search radius
//! 2. Encode the search center at that precision
//! 3. Expand to the cell plus its 8 neighbors (the covering set)
//! 4. Range-scan the store once per key prefix
//! 5. Union the rows and drop those beyond the exact great-circle radius
//! ```
//!
//! Cell membership is a rectangular approximation of a circle, so step 5 is
//! required: the covering set contains false positives, and without the
//! neighbor ring a point just across a cell edge would be missed.
//!
//! ## Precision guide
//!
//! | Precision | Cell size (approx, at the equator) |
//! |-----------|------------------------------------|
//! | 1         | 5,000km × 5,000km                  |
//! | 3         | 156km × 156km                      |
//! | 4         | 39km × 19.5km                      |
//! | 5         | 4.9km × 4.9km                      |
//! | 6         | 1.2km × 0.61km                     |
//! | 7         | 153m × 153m                        |
//! | 8         | 38m × 19m                          |
//! | 9         | 4.8m × 4.8m                        |
//! | 12        | 3.7cm × 1.9cm                      |
//!
//! Cells narrow east-west with latitude; see [`cells::covered_radius`] for the
//! exact guarantee at a given center.
//!
//! ## Examples
//!
//! ```rust
//! use spothash::compute::geohash::{encode, neighbors_with_self};
//!
//! let stored = encode(52.3676, 4.9041, 12)?;
//! let cover = neighbors_with_self(&encode(52.3676, 4.9041, 7)?)?;
//! assert!(cover.iter().any(|key| stored.starts_with(key.as_str())));
//! # Ok::<(), spothash::SpotError>(())
//! ```

pub mod cells;
pub mod codec;
pub mod neighbors;

pub use cells::{
    cell_size_degrees, cell_size_meters, covered_radius, covered_radius_with_rings,
    precision_for_radius, rings_for_radius,
};
pub use codec::{
    ALPHABET, DEFAULT_PRECISION, MAX_PRECISION, decode, decode_bounds, encode, encode_point,
};
pub use neighbors::{
    CoveringSet, EVEN_TABLES, Neighbors, ODD_TABLES, ParityTables, adjacent, expand_rings,
    neighbors, neighbors_with_self,
};
