//! Checkout sessions pass. Each session is dated by its first line item's
//! price creation time and described by that line item.

use sheetsync_client::{
    epoch_to_datetime, CheckoutSession, LineItem, ListPage, QueryParams, RemoteSource,
};

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

    let endpoints = &config.stripe.endpoints;
    let params = QueryParams::new().with("limit", config.limits.session);
    let sessions: Vec<CheckoutSession> = first_page(ctx, &endpoints.checkout_sessions, params)?;

    let mut rows = Vec::new();

    for session in &sessions {
        let items: ListPage<LineItem> = ctx.source.get(&endpoints.session_line_items(&session.id))?;
        let Some(item) = items.data.first() else {
            tracing::warn!(session = %session.id, "checkout session has no line items; skipped");
            continue;
        };

        // Sessions without a price fall back to their own creation time.
        let created = item.price.as_ref().map_or(session.created, |p| p.created);
        let Some(at) = dated("checkout session", &session.id, epoch_to_datetime(created)) else {
            continue;
        };
        if !filter.admits(&session.id, at) {
            continue;
        }

        rows.push(OutputRow::new(vec![
            session.id.as_str().into(),
            at.into(),
            session.customer.as_ref().map(|c| c.id()).unwrap_or("").into(),
            item.description.clone().unwrap_or_default().into(),
            item.amount_total.into(),
        ]));
    }

    Ok(Collected {
        watermark: Some(filter.at()),
        candidates: sessions.len(),
        rows,
    })
}
