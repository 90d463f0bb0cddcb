//! Candidate sources: the seam between the planner and the store that holds
//! the records.
//!
//! Production stores are remote (a document database queried with "order by
//! geohash, start at / end at"). `MemoryStore` implements the same contract
//! over a `BTreeMap` for tests, demos and offline use.

use crate::compute::validation::validate_geohash;
use crate::error::Result;
use crate::record::{GeoRecord, Located};
use rustc_hash::FxHashMap;
use spothash_types::coordinate::Coordinate;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Appended to a prefix to form the inclusive upper bound of its range.
/// Sorts after every geohash alphabet character.
pub const PREFIX_END_SENTINEL: char = '~';

/// Inclusive `[start, end]` bounds selecting every key that starts with a
/// geohash prefix.
///
/// # Examples
///
/// ```
/// use spothash::KeyRange;
///
/// let range = KeyRange::for_prefix("u4pr");
/// assert_eq!(range.end, "u4pr~");
/// assert!(range.contains("u4pruydqqvj"));
/// assert!(!range.contains("u4ps0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}

impl KeyRange {
    pub fn for_prefix(prefix: &str) -> Self {
        let mut end = String::with_capacity(prefix.len() + 1);
        end.push_str(prefix);
        end.push(PREFIX_END_SENTINEL);
        Self {
            start: prefix.to_string(),
            end,
        }
    }

    /// The prefix this range selects.
    pub fn prefix(&self) -> &str {
        &self.start
    }

    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key <= self.end.as_str()
    }
}

/// Trait for stores that can answer geohash prefix range queries.
///
/// Implementations wrap the remote store's "range query on the indexed
/// geohash field" call. Rows returned for different ranges may overlap; the
/// planner deduplicates them by [`Located::id`].
pub trait CandidateSource {
    type Row: Located;

    /// All rows whose stored geohash lies within `range`.
    fn query_range(&self, range: &KeyRange) -> Result<Vec<Self::Row>>;
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub record_count: usize,
    /// Number of distinct geohash keys in use
    pub distinct_keys: usize,
}

/// In-memory record store ordered by `(geohash, id)`.
///
/// Records are keyed by their stored geohash so that prefix ranges are
/// contiguous, exactly like a remote index on the geohash field.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    entries: BTreeMap<(String, String), GeoRecord<T>>,
    /// id -> geohash currently stored for that id
    keys: FxHashMap<String, String>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            keys: FxHashMap::default(),
        }
    }

    /// Insert or replace a record by id.
    ///
    /// If the id already exists under a different geohash, the stale entry is
    /// removed so the record is only found under its current key. Returns the
    /// previous record.
    pub fn upsert(&mut self, record: GeoRecord<T>) -> Option<GeoRecord<T>> {
        let previous = self.remove(&record.id);
        self.keys
            .insert(record.id.clone(), record.geohash().to_string());
        self.entries
            .insert((record.geohash().to_string(), record.id.clone()), record);
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<GeoRecord<T>> {
        let geohash = self.keys.remove(id)?;
        self.entries.remove(&(geohash, id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&GeoRecord<T>> {
        let geohash = self.keys.get(id)?;
        self.entries.get(&(geohash.clone(), id.to_string()))
    }

    /// Move a record to a new coordinate, re-encoding its key.
    ///
    /// Returns `Ok(None)` if the id is unknown, otherwise whether the key
    /// changed.
    pub fn relocate(&mut self, id: &str, coord: Coordinate) -> Result<Option<bool>> {
        let Some(mut record) = self.remove(id) else {
            return Ok(None);
        };
        let outcome = record.location.relocate(coord);
        // Re-insert even on error; relocate leaves the record untouched then
        self.upsert(record);
        outcome.map(Some)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in `(geohash, id)` order.
    pub fn iter(&self) -> impl Iterator<Item = &GeoRecord<T>> + '_ {
        self.entries.values()
    }

    /// Records whose geohash starts with `prefix`, in key order.
    pub fn scan_prefix(&self, prefix: &str) -> Result<Vec<&GeoRecord<T>>> {
        validate_geohash(prefix)?;
        Ok(self.range(&KeyRange::for_prefix(prefix)).collect())
    }

    pub fn stats(&self) -> StoreStats {
        let mut distinct: Vec<&str> = self.entries.keys().map(|(g, _)| g.as_str()).collect();
        distinct.dedup();
        StoreStats {
            record_count: self.entries.len(),
            distinct_keys: distinct.len(),
        }
    }

    fn range(&self, range: &KeyRange) -> impl Iterator<Item = &GeoRecord<T>> + '_ {
        let lower = Bound::Included((range.start.clone(), String::new()));
        let upper = Bound::Excluded((range.end.clone(), String::new()));
        self.entries.range((lower, upper)).map(|(_, record)| record)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<GeoRecord<T>> for MemoryStore<T> {
    fn from_iter<I: IntoIterator<Item = GeoRecord<T>>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.upsert(record);
        }
        store
    }
}

impl<T: Clone> CandidateSource for MemoryStore<T> {
    type Row = GeoRecord<T>;

    fn query_range(&self, range: &KeyRange) -> Result<Vec<Self::Row>> {
        let rows: Vec<GeoRecord<T>> = self.range(range).cloned().collect();
        log::trace!("Range [{}, {}] returned {} rows", range.start, range.end, rows.len());
        Ok(rows)
    }
}
