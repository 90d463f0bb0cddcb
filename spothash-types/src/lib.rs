//! # spothash-types
//!
//! Value types shared by the spothash geohash index:
//!
//! - **Coordinates**: `Coordinate`, a latitude/longitude pair
//! - **Cells**: `CellBounds`, the rectangle a geohash denotes
//! - **Directions**: `Direction`, the eight compass steps between cells
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's primitives.
//!
//! ## Examples
//!
//! ```rust
//! use spothash_types::coordinate::Coordinate;
//! use geo::Point;
//!
//! let amsterdam = Coordinate::new(52.3676, 4.9041);
//! let point: Point = amsterdam.into();
//! assert_eq!(point.x(), 4.9041);
//! ```

pub mod bbox;
pub mod coordinate;
pub mod direction;
