use std::fmt;

use chrono::{DateTime, Utc};
use sheetsync_config::SheetNames;

/// Date format for every date cell written to a sheet (UTC).
pub const SHEET_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Cells + rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Date(DateTime<Utc>),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format(SHEET_DATE_FORMAT)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

/// One record to append. Positional: the storage boundary has no field names.
/// Column A is always the record's id, column B its sync timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    cells: Vec<CellValue>,
}

impl OutputRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    /// Column A.
    pub fn key(&self) -> Option<&str> {
        self.cells.first().and_then(CellValue::as_text)
    }

    /// Column B.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.cells.get(1).and_then(CellValue::as_date)
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// One synchronization pass over one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Charges,
    Invoices,
    Payments,
    Sessions,
    Payouts,
    /// Payouts arriving in `[from, to]`, no watermark filtering.
    PayoutsInRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl Pass {
    /// The watermark-driven passes, in the order `all` runs them.
    pub const ALL: [Pass; 5] = [
        Pass::Charges,
        Pass::Invoices,
        Pass::Payments,
        Pass::Sessions,
        Pass::Payouts,
    ];

    pub fn destination<'a>(&self, sheets: &'a SheetNames) -> &'a str {
        match self {
            Self::Charges => &sheets.charge,
            Self::Invoices => &sheets.invoice,
            Self::Payments => &sheets.payment,
            Self::Sessions => &sheets.session,
            Self::Payouts | Self::PayoutsInRange { .. } => &sheets.payout,
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charges => write!(f, "charges"),
            Self::Invoices => write!(f, "invoices"),
            Self::Payments => write!(f, "payments"),
            Self::Sessions => write!(f, "sessions"),
            Self::Payouts => write!(f, "payouts"),
            Self::PayoutsInRange { from, to } => write!(
                f,
                "payouts {}..={}",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            ),
        }
    }
}
