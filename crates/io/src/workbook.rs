//! A directory of CSV files acting as the sync workbook.
//!
//! Each destination is `<dir>/<destination>.csv`. Row 1 is a header,
//! new rows are inserted at the configured row so the newest data stays on
//! top, and the watermark is read from a single configured cell (B2 by
//! default, i.e. the date of the newest row).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sheetsync_config::{CellLayout, SyncConfig};
use sheetsync_engine::{OutputRow, SheetStore, StorageError, SHEET_DATE_FORMAT};

use crate::csv::{read_grid, write_grid, Grid};

#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
    layout: CellLayout,
}

impl CsvWorkbook {
    pub fn new(dir: impl Into<PathBuf>, layout: CellLayout) -> Self {
        Self {
            dir: dir.into(),
            layout,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.storage.dir.clone(), config.cells.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir.join(format!("{destination}.csv"))
    }

    fn load(&self, destination: &str) -> Result<Grid, StorageError> {
        let path = self.path_for(destination);
        if !path.is_file() {
            return Err(StorageError::MissingDestination(destination.to_string()));
        }
        read_grid(&path).map_err(|message| StorageError::Io {
            destination: destination.to_string(),
            message,
        })
    }

    /// Zero-based column holding each row's date.
    fn date_column(&self) -> usize {
        self.layout.latest_date_column - 1
    }

    /// Zero-based index of the first data row.
    fn first_data_row(&self) -> usize {
        self.layout.insert_row - 1
    }
}

impl SheetStore for CsvWorkbook {
    fn read_watermark(&self, destination: &str) -> Result<DateTime<Utc>, StorageError> {
        let grid = self.load(destination)?;
        let raw = grid
            .get(self.layout.latest_date_row - 1)
            .and_then(|row| row.get(self.date_column()))
            .map(|v| v.trim())
            .unwrap_or("");

        if raw.is_empty() {
            tracing::warn!(
                destination,
                row = self.layout.latest_date_row,
                column = self.layout.latest_date_column,
                "watermark cell is empty; syncing from the epoch"
            );
            return Ok(DateTime::<Utc>::default());
        }

        parse_sheet_date(raw).ok_or_else(|| StorageError::InvalidWatermark {
            destination: destination.to_string(),
            value: raw.to_string(),
        })
    }

    fn recorded_keys(&self, destination: &str) -> Result<HashSet<String>, StorageError> {
        let grid = self.load(destination)?;
        Ok(grid
            .iter()
            .skip(self.first_data_row())
            .filter_map(|row| row.first().map(|k| k.trim()).filter(|k| !k.is_empty()))
            .map(str::to_string)
            .collect())
    }

    fn append_rows(&self, destination: &str, rows: &[OutputRow]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut grid = self.load(destination)?;
        let at = self.first_data_row();
        if grid.len() < at {
            grid.resize(at, vec![String::new()]);
        }

        let rendered = rows
            .iter()
            .map(|row| row.cells().iter().map(|c| c.to_string()).collect::<Vec<_>>());
        grid.splice(at..at, rendered);

        write_grid(&self.path_for(destination), &grid).map_err(|message| StorageError::Io {
            destination: destination.to_string(),
            message,
        })?;

        tracing::info!(destination, rows = rows.len(), "rows inserted");
        Ok(())
    }
}

/// Accepts the format we write, RFC 3339, and a bare `YYYY-MM-DD`. Naive
/// values are taken as UTC.
pub fn parse_sheet_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, SHEET_DATE_FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
