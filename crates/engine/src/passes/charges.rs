//! Charges pass.
//!
//! The product label is looked up through a fallback chain: the checkout
//! session created for the charge's payment intent, then the charge's
//! invoice, then nothing.

use chrono::{DateTime, Utc};
use sheetsync_client::{
    build_target, Charge, CheckoutSession, Invoice, LineItem, ListPage, QueryParams,
    RemoteSource,
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

    let params = QueryParams::new()
        .with("limit", config.limits.charge)
        .with("expand[]", ["data.customer", "data.invoice"]);
    let charges: Vec<Charge> = first_page(ctx, &config.stripe.endpoints.charges, params)?;

    let mut rows = Vec::new();
    for charge in &charges {
        let Some(created) = dated("charge", &charge.id, charge.created_at()) else {
            continue;
        };
        if !filter.admits(&charge.id, created) {
            continue;
        }
        let label = product_label(ctx, charge)?;
        rows.push(charge_row(charge, created, &label));
    }

    Ok(Collected {
        watermark: Some(filter.at()),
        candidates: charges.len(),
        rows,
    })
}

/// Session line item description, else the invoice's first line
/// description, else `""`.
pub fn product_label<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    charge: &Charge,
) -> Result<String, SyncError> {
    if let Some(intent) = &charge.payment_intent {
        if let Some(label) = session_label(ctx, intent.id())? {
            return Ok(label);
        }
    }

    if let Some(invoice) = &charge.invoice {
        let fetched;
        let invoice: &Invoice = match invoice.expanded() {
            Some(inv) => inv,
            None => {
                let target = ctx.config.stripe.endpoints.invoice(invoice.id());
                fetched = ctx.source.get::<Invoice>(&target)?;
                &fetched
            }
        };
        if let Some(label) = invoice
            .first_line()
            .and_then(|l| l.description.as_deref())
            .filter(|d| !d.is_empty())
        {
            return Ok(label.to_string());
        }
    }

    tracing::debug!(charge = %charge.id, "no product label found");
    Ok(String::new())
}

fn session_label<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    payment_intent: &str,
) -> Result<Option<String>, SyncError> {
    let endpoints = &ctx.config.stripe.endpoints;
    let params = QueryParams::new()
        .with("payment_intent", payment_intent)
        .with("expand[]", ["data.line_items"]);
    let sessions: ListPage<CheckoutSession> = ctx
        .source
        .get(&build_target(&endpoints.checkout_sessions, &params))?;

    let Some(session) = sessions.data.into_iter().next() else {
        return Ok(None);
    };

    let items: Vec<LineItem> = match session.line_items {
        Some(list) => list.data,
        None => {
            let page: ListPage<LineItem> =
                ctx.source.get(&endpoints.session_line_items(&session.id))?;
            page.data
        }
    };

    Ok(items
        .into_iter()
        .next()
        .and_then(|item| item.description)
        .filter(|d| !d.is_empty()))
}

/// id, created, customer name, label, statement descriptor, amount,
/// payment method type, status.
fn charge_row(charge: &Charge, created: DateTime<Utc>, label: &str) -> OutputRow {
    OutputRow::new(vec![
        charge.id.as_str().into(),
        created.into(),
        charge.customer.as_ref().map(|c| c.name()).unwrap_or("").into(),
        label.into(),
        charge
            .calculated_statement_descriptor
            .clone()
            .unwrap_or_default()
            .into(),
        charge.amount.into(),
        charge.payment_method_type().into(),
        charge.status.as_str().into(),
    ])
}
