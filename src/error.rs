//! Error types for spothash.

use thiserror::Error;

/// Errors returned by encoding, neighbor expansion and query planning.
#[derive(Debug, Error)]
pub enum SpotError {
    /// Coordinate is non-finite or outside the lat/lon range.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid precision {precision}: must be between 1 and {max}")]
    InvalidPrecision { precision: usize, max: usize },

    #[error("Invalid geohash {geohash:?}: {reason}")]
    InvalidGeohash { geohash: String, reason: String },

    /// Search radius is non-finite or negative.
    #[error("Invalid radius: {0} meters")]
    InvalidRadius(f64),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by an external candidate source.
    #[error("Candidate source error: {0}")]
    Source(String),
}

impl SpotError {
    pub(crate) fn invalid_geohash(geohash: &str, reason: impl Into<String>) -> Self {
        SpotError::InvalidGeohash {
            geohash: geohash.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpotError>;
