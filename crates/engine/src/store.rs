use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::model::OutputRow;

/// Tabular storage collaborator: one sheet per destination, newest rows on top.
pub trait SheetStore {
    /// Latest already-synced timestamp. Epoch when the watermark cell is empty.
    fn read_watermark(&self, destination: &str) -> Result<DateTime<Utc>, StorageError>;

    /// Keys (column A) of every data row already in the sheet.
    fn recorded_keys(&self, destination: &str) -> Result<HashSet<String>, StorageError>;

    /// Insert `rows` at the configured position, shifting existing data down.
    /// No-op on empty input.
    fn append_rows(&self, destination: &str, rows: &[OutputRow]) -> Result<(), StorageError>;
}
