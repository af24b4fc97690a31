//! Invoices pass. Only paid invoices are written, dated by the start of
//! their first line's billing period.

use sheetsync_client::{epoch_to_datetime, Invoice, QueryParams, RemoteSource};

use super::{dated, first_page, Collected};
use crate::engine::SyncContext;
use crate::error::SyncError;
use crate::model::OutputRow;
use crate::watermark::WatermarkFilter;

pub fn collect<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    destination: &str,
) -> Result<Collected, SyncError> {
    let config = ctx.config;
    let filter = WatermarkFilter::load(ctx.store, destination)?;

    let params = QueryParams::new().with("limit", config.limits.invoice);
    let invoices: Vec<Invoice> = first_page(ctx, &config.stripe.endpoints.invoices, params)?;

    let rows = invoices
        .iter()
        .filter(|inv| inv.is_paid())
        .filter_map(|inv| {
            let row = invoice_row(inv);
            if row.is_none() {
                tracing::warn!(invoice = %inv.id, "paid invoice has no dated line; skipped");
            }
            row
        })
        .filter(|row| match (row.key(), row.timestamp()) {
            (Some(key), Some(at)) => filter.admits(key, at),
            _ => false,
        })
        .collect();

    Ok(Collected {
        watermark: Some(filter.at()),
        candidates: invoices.len(),
        rows,
    })
}

/// id, period start, customer name, line description, line amount, status.
fn invoice_row(invoice: &Invoice) -> Option<OutputRow> {
    let line = invoice.first_line()?;
    let start = dated("invoice", &invoice.id, epoch_to_datetime(line.period.as_ref()?.start))?;
    Some(OutputRow::new(vec![
        invoice.id.as_str().into(),
        start.into(),
        invoice.customer_name.clone().unwrap_or_default().into(),
        line.description.clone().unwrap_or_default().into(),
        line.amount.into(),
        invoice.status.clone().unwrap_or_default().into(),
    ]))
}
