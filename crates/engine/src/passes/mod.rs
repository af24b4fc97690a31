//! Per-entity collection routines.
//!
//! Each routine reads its watermark before any request, then fetches
//! candidates, filters and shapes them into rows. Nothing here writes; the caller appends once the whole
//! candidate set resolved.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sheetsync_client::{build_target, ListPage, QueryParams, RemoteSource};

use crate::engine::SyncContext;
use crate::error::SyncError;
use crate::model::OutputRow;

pub mod charges;
pub mod invoices;
pub mod payments;
pub mod payouts;
pub mod sessions;

/// Rows computed by one pass, ready to append.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collected {
    /// None when the pass ignores the watermark.
    pub watermark: Option<DateTime<Utc>>,
    /// Records fetched before filtering.
    pub candidates: usize,
    pub rows: Vec<OutputRow>,
}

/// One page of `endpoint`. The simple passes only look at the newest page,
/// sized by the configured limit.
pub(crate) fn first_page<S, T>(
    ctx: &SyncContext<'_, S>,
    endpoint: &str,
    params: QueryParams,
) -> Result<Vec<T>, SyncError>
where
    S: RemoteSource,
    T: DeserializeOwned,
{
    let target = build_target(endpoint, &params);
    let page: ListPage<T> = ctx.source.get(&target)?;
    if page.has_more {
        tracing::debug!(endpoint, items = page.data.len(), "older records left on later pages");
    }
    Ok(page.data)
}

/// A record's sync date. Out-of-range epochs are logged and yield `None`,
/// which callers treat as "skip this record".
pub(crate) fn dated(
    record: &str,
    id: &str,
    at: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if at.is_none() {
        tracing::warn!(record, id, "timestamp out of range; skipped");
    }
    at
}
