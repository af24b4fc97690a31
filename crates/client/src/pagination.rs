//! Cursor pagination over Stripe list endpoints.
//!
//! Each follow-up request carries `starting_after=<id of the last item of
//! the previous page>`. Pages are concatenated in fetch order. Any page
//! failure aborts the whole collection; no partial result is returned.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use sheetsync_config::PaginationSettings;

use crate::client::RemoteSource;
use crate::error::FetchError;
use crate::query::{build_target, QueryParams};
use crate::types::{Identified, ListPage};

/// Ceiling on one paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub max_pages: u32,
    pub deadline: Duration,
}

impl PageBounds {
    pub fn from_settings(settings: &PaginationSettings) -> Self {
        Self {
            max_pages: settings.max_pages,
            deadline: settings.deadline(),
        }
    }
}

impl Default for PageBounds {
    fn default() -> Self {
        Self::from_settings(&PaginationSettings::default())
    }
}

pub struct Paginator<'a, S> {
    source: &'a S,
    bounds: PageBounds,
}

impl<'a, S: RemoteSource> Paginator<'a, S> {
    pub fn new(source: &'a S, bounds: PageBounds) -> Self {
        Self { source, bounds }
    }

    /// Fetch every item matching `endpoint` + `params`, `limit` per page.
    ///
    /// Stops when a page reports `has_more: false` (or omits it), or when a
    /// page comes back empty even if it claims more data.
    pub fn collect_all<T>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        limit: u32,
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned + Identified,
    {
        let started = Instant::now();
        let mut items: Vec<T> = Vec::new();
        let mut starting_after: Option<String> = None;
        let mut page = 0u32;

        loop {
            page += 1;

            let mut query = params.clone();
            query.set("limit", limit);
            if let Some(ref after) = starting_after {
                query.set("starting_after", after);
            }

            let target = build_target(endpoint, &query);
            let list: ListPage<T> = self.source.get(&target)?;

            tracing::debug!(
                endpoint,
                page,
                items = list.data.len(),
                has_more = list.has_more,
                "page fetched"
            );

            if list.data.is_empty() {
                if list.has_more {
                    tracing::warn!(
                        endpoint,
                        page,
                        "has_more=true with empty data, stopping pagination"
                    );
                }
                break;
            }

            let has_more = list.has_more;
            // Non-empty, checked above.
            let last_id = list.data[list.data.len() - 1].id().to_string();
            items.extend(list.data);

            if !has_more {
                break;
            }

            // Infinite loop protection: detect repeated starting_after
            if starting_after.as_deref() == Some(last_id.as_str()) {
                return Err(FetchError::PaginationStalled { cursor: last_id });
            }

            if page >= self.bounds.max_pages {
                return Err(FetchError::PaginationBound(format!(
                    "{endpoint}: more data after {page} pages (max_pages = {})",
                    self.bounds.max_pages
                )));
            }

            if started.elapsed() >= self.bounds.deadline {
                return Err(FetchError::PaginationBound(format!(
                    "{endpoint}: deadline of {}s exceeded after {page} pages",
                    self.bounds.deadline.as_secs()
                )));
            }

            starting_after = Some(last_id);
        }

        Ok(items)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
