//! Geohash indexing and proximity query planning for location directories
//! whose backing store can only range-scan an indexed string field.
//!
//! - **Write path**: encode each record's coordinate into a geohash key
//!   ([`IndexedLocation`]) and overwrite it whenever the coordinate changes
//! - **Read path**: expand a search center into the covering set of keys
//!   ([`candidate_keys`]), range-query the store once per key, and keep only
//!   the rows within the exact great-circle radius ([`ProximityPlanner`])
//!
//! ```rust
//! use spothash::{Coordinate, MemoryStore, ProximityPlanner};
//!
//! let planner = ProximityPlanner::default();
//! let mut store = MemoryStore::new();
//! store.upsert(planner.record("vondelpark", Coordinate::new(52.3580, 4.8686), "park")?);
//! store.upsert(planner.record("rijksmuseum", Coordinate::new(52.3600, 4.8852), "museum")?);
//!
//! let center = Coordinate::new(52.3590, 4.8830);
//! let nearby = planner.search(&center, 500.0, &store)?;
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].row.id, "rijksmuseum");
//! # Ok::<(), spothash::SpotError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod planner;
pub mod record;
pub mod source;

pub use error::{Result, SpotError};

pub use spothash_types::bbox::CellBounds;
pub use spothash_types::coordinate::Coordinate;
pub use spothash_types::direction::Direction;

pub use compute::geohash::{
    ALPHABET, CoveringSet, DEFAULT_PRECISION, MAX_PRECISION, Neighbors, adjacent,
    covered_radius, covered_radius_with_rings, decode, decode_bounds, encode, encode_point,
    expand_rings, neighbors, neighbors_with_self, precision_for_radius, rings_for_radius,
};
pub use compute::{DistanceMetric, distance_between, validation};

pub use config::PlannerConfig;

pub use planner::{
    Match, ProximityPlanner, QueryPlan, SearchStats, candidate_keys, filter_within_radius,
};

pub use record::{GeoRecord, IndexedLocation, Located};

pub use source::{CandidateSource, KeyRange, MemoryStore, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, SpotError};

    pub use crate::{Coordinate, Direction};

    pub use crate::{candidate_keys, encode, encode_point, neighbors, neighbors_with_self};

    pub use crate::{DistanceMetric, PlannerConfig, ProximityPlanner};

    pub use crate::{CandidateSource, GeoRecord, IndexedLocation, KeyRange, Located, MemoryStore};
}
