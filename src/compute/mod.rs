//! Compute layer: geohash encoding, neighbor expansion, cell geometry,
//! distances and input validation.
//!
//! Everything here is pure and synchronous. Functions may be called from any
//! number of threads without coordination.

pub mod geohash;
pub mod spatial;
pub mod validation;

pub use spatial::{DistanceMetric, distance_between};
