//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the scheduler contract: cron wrappers and CI jobs
//! branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                 |
//! |---------|-----------|---------------------------------------------|
//! | 0       | Universal | Success                                     |
//! | 1       | Universal | General error (unspecified)                 |
//! | 2       | Universal | CLI usage error (bad args)                  |
//! | 3-9     | config    | Config file unreadable or invalid           |
//! | 10-19   | storage   | Sheet storage (missing sheet, bad watermark) |
//! | 50-59   | fetch     | Stripe API                                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `sync_exit_code`

use sheetsync_client::FetchError;
use sheetsync_engine::{StorageError, SyncError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - every requested pass completed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments (e.g. invalid `--from` / `--to`).
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (3-9)
// =============================================================================

/// Config file could not be read.
pub const EXIT_CONFIG_IO: u8 = 3;

/// Config file is not valid TOML or fails validation.
pub const EXIT_CONFIG_INVALID: u8 = 4;

// =============================================================================
// Storage (10-19)
// =============================================================================

/// Destination sheet does not exist.
pub const EXIT_STORAGE_MISSING: u8 = 10;

/// Watermark cell is not a date.
pub const EXIT_STORAGE_WATERMARK: u8 = 11;

/// Sheet could not be read or written.
pub const EXIT_STORAGE_IO: u8 = 12;

// =============================================================================
// Fetch (50-59) - Stripe API
// =============================================================================

/// No secret key configured (neither config nor env var).
pub const EXIT_FETCH_NOT_AUTH: u8 = 50;

/// Auth rejected by Stripe (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Bad request or unknown object (400/404).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Rate limited (429). Not retried.
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), other HTTP status, or network failure.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;

/// Response body was not the expected JSON shape.
pub const EXIT_FETCH_PARSE: u8 = 55;

/// Pagination exceeded its page or time budget, or its cursor stalled.
pub const EXIT_FETCH_PAGINATION: u8 = 56;

// =============================================================================
// Mapping
// =============================================================================

/// Map a FetchError to its exit code.
pub fn fetch_exit_code(err: &FetchError) -> u8 {
    match err {
        FetchError::Configuration(_) => EXIT_FETCH_NOT_AUTH,
        FetchError::Remote { status, .. } => match status {
            401 | 403 => EXIT_FETCH_AUTH,
            400 | 404 => EXIT_FETCH_VALIDATION,
            429 => EXIT_FETCH_RATE_LIMIT,
            _ => EXIT_FETCH_UPSTREAM,
        },
        FetchError::Network(_) => EXIT_FETCH_UPSTREAM,
        FetchError::Parse(_) => EXIT_FETCH_PARSE,
        FetchError::PaginationBound(_) | FetchError::PaginationStalled { .. } => {
            EXIT_FETCH_PAGINATION
        }
    }
}

/// Map a SyncError to its exit code. Resolution failures take the code of
/// the fetch failure underneath.
pub fn sync_exit_code(err: &SyncError) -> u8 {
    match err {
        SyncError::Fetch(e) | SyncError::Resolution { source: e, .. } => fetch_exit_code(e),
        SyncError::Storage(StorageError::MissingDestination(_)) => EXIT_STORAGE_MISSING,
        SyncError::Storage(StorageError::InvalidWatermark { .. }) => EXIT_STORAGE_WATERMARK,
        SyncError::Storage(StorageError::Io { .. }) => EXIT_STORAGE_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16) -> FetchError {
        FetchError::Remote {
            status,
            message: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_fetch_codes() {
        assert_eq!(fetch_exit_code(&FetchError::Configuration("x".into())), 50);
        assert_eq!(fetch_exit_code(&remote(401)), 51);
        assert_eq!(fetch_exit_code(&remote(403)), 51);
        assert_eq!(fetch_exit_code(&remote(404)), 52);
        assert_eq!(fetch_exit_code(&remote(429)), 53);
        assert_eq!(fetch_exit_code(&remote(500)), 54);
        assert_eq!(fetch_exit_code(&FetchError::Network("timeout".into())), 54);
        assert_eq!(
            fetch_exit_code(&FetchError::PaginationStalled { cursor: "txn_1".into() }),
            56
        );
    }

    #[test]
    fn test_resolution_uses_underlying_fetch_code() {
        let err = SyncError::Resolution {
            payout_id: "po_1".into(),
            source: remote(401),
        };
        assert_eq!(sync_exit_code(&err), EXIT_FETCH_AUTH);
    }

    #[test]
    fn test_storage_codes() {
        let missing = SyncError::Storage(StorageError::MissingDestination("payouts".into()));
        assert_eq!(sync_exit_code(&missing), EXIT_STORAGE_MISSING);
        let bad = SyncError::Storage(StorageError::InvalidWatermark {
            destination: "payouts".into(),
            value: "soon".into(),
        });
        assert_eq!(sync_exit_code(&bad), EXIT_STORAGE_WATERMARK);
    }

    #[test]
    fn test_codes_are_unique_within_ranges() {
        let codes = [
            EXIT_CONFIG_IO,
            EXIT_CONFIG_INVALID,
            EXIT_STORAGE_MISSING,
            EXIT_STORAGE_WATERMARK,
            EXIT_STORAGE_IO,
            EXIT_FETCH_NOT_AUTH,
            EXIT_FETCH_AUTH,
            EXIT_FETCH_VALIDATION,
            EXIT_FETCH_RATE_LIMIT,
            EXIT_FETCH_UPSTREAM,
            EXIT_FETCH_PARSE,
            EXIT_FETCH_PAGINATION,
        ];
        let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
