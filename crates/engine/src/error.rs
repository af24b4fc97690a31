use std::fmt;

use sheetsync_client::FetchError;

#[derive(Debug)]
pub enum StorageError {
    /// Destination sheet does not exist.
    MissingDestination(String),
    /// Watermark cell holds something that is not a date.
    InvalidWatermark { destination: String, value: String },
    /// Read/write failure on an existing destination.
    Io { destination: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDestination(name) => {
                write!(f, "sheet '{name}' not found; create it before syncing")
            }
            Self::InvalidWatermark { destination, value } => write!(
                f,
                "sheet '{destination}': watermark value '{value}' is not a valid date (e.g. 2024-01-01)"
            ),
            Self::Io {
                destination,
                message,
            } => write!(f, "sheet '{destination}': {message}"),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug)]
pub enum SyncError {
    /// Listing or lookup failed outside payout resolution.
    Fetch(FetchError),
    /// Collecting one payout's balance transactions failed.
    Resolution {
        payout_id: String,
        source: FetchError,
    },
    Storage(StorageError),
}

impl SyncError {
    /// The underlying fetch failure, if any.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch(e) | Self::Resolution { source: e, .. } => Some(e),
            Self::Storage(_) => None,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "{e}"),
            Self::Resolution { payout_id, source } => write!(
                f,
                "failed to fetch balance transactions for payout {payout_id}: {source}"
            ),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Resolution { source, .. } => Some(source),
            Self::Storage(e) => Some(e),
        }
    }
}

impl From<FetchError> for SyncError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<StorageError> for SyncError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
