//! Pass driver: watermark → fetch → filter → resolve → shape → append,
//! with failure reporting around the whole thing.

use chrono::{DateTime, Utc};
use sheetsync_client::{PageBounds, Paginator, RemoteSource};
use sheetsync_config::SyncConfig;

use crate::error::SyncError;
use crate::model::{Pass, SHEET_DATE_FORMAT};
use crate::notify::Notifier;
use crate::passes::{self, Collected};
use crate::store::SheetStore;

/// Everything a pass needs, borrowed for the duration of the run.
pub struct SyncContext<'a, S> {
    pub config: &'a SyncConfig,
    pub source: &'a S,
    pub store: &'a dyn SheetStore,
    pub notifier: &'a dyn Notifier,
}

impl<'a, S: RemoteSource> SyncContext<'a, S> {
    /// Fresh paginator per call: cursor state never outlives one collection.
    pub fn paginator(&self) -> Paginator<'a, S> {
        Paginator::new(self.source, PageBounds::from_settings(&self.config.pagination))
    }
}

/// Outcome of a successful pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub pass: Pass,
    pub destination: String,
    /// None for range passes, which ignore the watermark.
    pub watermark: Option<DateTime<Utc>>,
    /// Records fetched before filtering.
    pub candidates: usize,
    pub rows_written: usize,
    /// Largest column-B timestamp among written rows.
    pub latest: Option<DateTime<Utc>>,
}

/// Run one complete pass. On failure the error is logged, the notifier is
/// called exactly once, and the error is returned. Rows are only appended
/// after every candidate resolved, so a failure never leaves a partial write.
pub fn run_pass<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    pass: Pass,
) -> Result<PassReport, SyncError> {
    let destination = pass.destination(&ctx.config.sheets);
    tracing::info!(%pass, destination, "sync started");

    match collect_and_write(ctx, pass, destination) {
        Ok(report) => {
            tracing::info!(
                %pass,
                destination,
                candidates = report.candidates,
                rows = report.rows_written,
                "sync finished"
            );
            Ok(report)
        }
        Err(err) => {
            tracing::error!(%pass, destination, error = %err, detail = ?err, "sync failed");
            ctx.notifier.notify_failure(
                &failure_message(ctx.config, pass, &err),
                &ctx.config.notify.user,
                &ctx.config.notify.channel,
            );
            Err(err)
        }
    }
}

fn collect_and_write<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    pass: Pass,
    destination: &str,
) -> Result<PassReport, SyncError> {
    let Collected {
        watermark,
        candidates,
        rows,
    } = match pass {
        Pass::Charges => passes::charges::collect(ctx, destination)?,
        Pass::Invoices => passes::invoices::collect(ctx, destination)?,
        Pass::Payments => passes::payments::collect(ctx, destination)?,
        Pass::Sessions => passes::sessions::collect(ctx, destination)?,
        Pass::Payouts => passes::payouts::collect(ctx, destination)?,
        Pass::PayoutsInRange { from, to } => passes::payouts::collect_range(ctx, destination, from, to)?,
    };

    if let Some(at) = watermark {
        tracing::debug!(destination, watermark = %at.format(SHEET_DATE_FORMAT), "watermark");
    }

    if rows.is_empty() {
        tracing::info!(%pass, destination, "no new rows");
    } else {
        ctx.store.append_rows(destination, &rows)?;
    }

    Ok(PassReport {
        pass,
        destination: destination.to_string(),
        watermark,
        candidates,
        rows_written: rows.len(),
        latest: rows.iter().filter_map(|r| r.timestamp()).max(),
    })
}

fn failure_message(config: &SyncConfig, pass: Pass, err: &SyncError) -> String {
    let mut message = format!("sheetsync: {pass} sync failed.\n{err}");
    if let Some(sheetsync_client::FetchError::Remote { body, .. }) = err.fetch_error() {
        let snippet: String = body.chars().take(500).collect();
        message.push_str(&format!("\nresponse body: {snippet}"));
    }
    if let Some(url) = &config.notify.run_url {
        message.push_str(&format!("\n\n{url}"));
    }
    message
}
