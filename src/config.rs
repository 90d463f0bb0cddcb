//! Configuration for proximity planning.
//!
//! `PlannerConfig` can be built in code with the `with_*` methods or loaded
//! from JSON (and TOML with the `toml` feature).
use crate::compute::geohash::codec::{DEFAULT_PRECISION, MAX_PRECISION};
use crate::compute::spatial::DistanceMetric;
use serde::de::Error;

/// Proximity planner configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Precision of the geohash stored on each record.
    #[serde(default = "PlannerConfig::default_storage_precision")]
    pub storage_precision: usize,

    /// Fixed precision for query keys. `None` derives it from each search
    /// radius so the covering set always contains the whole circle.
    #[serde(default)]
    pub query_precision: Option<usize>,

    #[serde(default)]
    pub metric: DistanceMetric,

    /// Cap on matches returned by a search, nearest first.
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl PlannerConfig {
    const fn default_storage_precision() -> usize {
        DEFAULT_PRECISION
    }

    pub fn with_storage_precision(mut self, precision: usize) -> Self {
        assert!(
            (1..=MAX_PRECISION).contains(&precision),
            "Storage precision must be between 1 and {}",
            MAX_PRECISION
        );
        self.storage_precision = precision;
        self
    }

    pub fn with_query_precision(mut self, precision: usize) -> Self {
        assert!(
            (1..=MAX_PRECISION).contains(&precision),
            "Query precision must be between 1 and {}",
            MAX_PRECISION
        );
        self.query_precision = Some(precision);
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        assert!(
            metric.measures_meters(),
            "Metric {:?} does not measure meters and cannot filter a radius",
            metric
        );
        self.metric = metric;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        assert!(max_results > 0, "Max results must be greater than zero");

        if max_results > 100_000 {
            log::warn!(
                "Max results of {} is very large; every match is sorted and held in memory",
                max_results
            );
        }

        self.max_results = Some(max_results);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_PRECISION).contains(&self.storage_precision) {
            return Err(format!(
                "Storage precision must be between 1 and {}, got {}",
                MAX_PRECISION, self.storage_precision
            ));
        }

        if let Some(precision) = self.query_precision {
            if !(1..=MAX_PRECISION).contains(&precision) {
                return Err(format!(
                    "Query precision must be between 1 and {}, got {}",
                    MAX_PRECISION, precision
                ));
            }
            // Stored keys must be at least as long as the query prefixes
            if precision > self.storage_precision {
                return Err(format!(
                    "Query precision {} exceeds storage precision {}",
                    precision, self.storage_precision
                ));
            }
        }

        // Search radii are in meters
        if !self.metric.measures_meters() {
            return Err(format!(
                "Metric {:?} does not measure meters and cannot filter a radius",
                self.metric
            ));
        }

        if self.max_results == Some(0) {
            return Err("Max results must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: PlannerConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            storage_precision: Self::default_storage_precision(),
            query_precision: None,
            metric: DistanceMetric::default(),
            max_results: None,
        }
    }
}
