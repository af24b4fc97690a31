//! Watermark filtering.
//!
//! The boundary is inclusive: a record dated exactly at the watermark is a
//! candidate. Keys already present in the sheet are never admitted again, so
//! a re-run appends nothing even after a range backfill moved the watermark
//! cell back in time.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::store::SheetStore;

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkFilter {
    at: DateTime<Utc>,
    recorded: HashSet<String>,
}

impl WatermarkFilter {
    pub fn new(at: DateTime<Utc>, recorded: HashSet<String>) -> Self {
        Self { at, recorded }
    }

    /// Read the watermark and the keys already recorded in `destination`.
    pub fn load(store: &dyn SheetStore, destination: &str) -> Result<Self, StorageError> {
        let at = store.read_watermark(destination)?;
        let recorded = store.recorded_keys(destination)?;
        Ok(Self::new(at, recorded))
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Whether a record keyed `key` dated `when` should be synced.
    pub fn admits(&self, key: &str, when: DateTime<Utc>) -> bool {
        when >= self.at && !self.recorded.contains(key)
    }
}
