//! Payouts pass: one output row per balance transaction of each new payout.

use chrono::{DateTime, Utc};
use sheetsync_client::{BalanceTransaction, Payout, QueryParams, RemoteSource};

use super::{dated, first_page, Collected};
use crate::engine::SyncContext;
use crate::error::SyncError;
use crate::model::{CellValue, OutputRow};
use crate::resolver::resolve_transactions;
use crate::watermark::WatermarkFilter;

/// Newest page of payouts, filtered by arrival date against the watermark.
pub fn collect<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    destination: &str,
) -> Result<Collected, SyncError> {
    let config = ctx.config;
    let filter = WatermarkFilter::load(ctx.store, destination)?;

    let params = QueryParams::new().with("limit", config.limits.payout);
    let payouts: Vec<Payout> = first_page(ctx, &config.stripe.endpoints.payouts, params)?;
    tracing::info!(count = payouts.len(), "payouts fetched");

    let admitted: Vec<&Payout> = payouts
        .iter()
        .filter(|p| {
            let Some(arrival) = dated("payout", &p.id, p.arrival_at()) else {
                return false;
            };
            let keep = filter.admits(&p.id, arrival);
            if !keep {
                tracing::debug!(payout = %p.id, %arrival, "already recorded");
            }
            keep
        })
        .collect();

    Ok(Collected {
        watermark: Some(filter.at()),
        candidates: payouts.len(),
        rows: resolve_rows(ctx, admitted)?,
    })
}

/// Every payout arriving in `[from, to]` that the sheet does not already
/// hold. Ignores the watermark.
pub fn collect_range<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    destination: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Collected, SyncError> {
    let config = ctx.config;
    let recorded = ctx.store.recorded_keys(destination)?;

    let params = QueryParams::new()
        .with("arrival_date[gte]", from.timestamp())
        .with("arrival_date[lte]", to.timestamp());
    let payouts: Vec<Payout> = ctx.paginator().collect_all(
        &config.stripe.endpoints.payouts,
        &params,
        config.limits.payout,
    )?;
    tracing::info!(count = payouts.len(), %from, %to, "payouts in range fetched");

    let admitted: Vec<&Payout> = payouts
        .iter()
        .filter(|p| dated("payout", &p.id, p.arrival_at()).is_some())
        .filter(|p| {
            let seen = recorded.contains(&p.id);
            if seen {
                tracing::debug!(payout = %p.id, "already recorded");
            }
            !seen
        })
        .collect();

    Ok(Collected {
        watermark: None,
        candidates: payouts.len(),
        rows: resolve_rows(ctx, admitted)?,
    })
}

fn resolve_rows<S: RemoteSource>(
    ctx: &SyncContext<'_, S>,
    payouts: Vec<&Payout>,
) -> Result<Vec<OutputRow>, SyncError> {
    let paginator = ctx.paginator();
    let mut rows = Vec::new();

    for payout in payouts {
        tracing::debug!(
            payout = %payout.id,
            automatic = payout.automatic,
            "resolving balance transactions"
        );
        let txns = resolve_transactions(ctx.source, &paginator, ctx.config, payout)?;
        tracing::debug!(payout = %payout.id, transactions = txns.len(), "resolved");
        rows.extend(payout_rows(payout, &txns));
    }

    Ok(rows)
}

/// A: payout id, B: arrival date, C: payout amount, D: txn id, E: type,
/// F: gross, G: fee, H: net, I: currency, J: txn created, K: description.
pub fn payout_rows(payout: &Payout, txns: &[BalanceTransaction]) -> Vec<OutputRow> {
    let Some(arrival) = dated("payout", &payout.id, payout.arrival_at()) else {
        return Vec::new();
    };
    txns.iter()
        .map(|txn| {
            if !txn.net_is_consistent() {
                tracing::warn!(
                    payout = %payout.id,
                    txn = %txn.id,
                    amount = txn.amount,
                    fee = txn.fee,
                    net = txn.net,
                    "net != amount - fee; writing remote values unchanged"
                );
            }
            OutputRow::new(vec![
                payout.id.as_str().into(),
                arrival.into(),
                payout.amount.into(),
                txn.id.as_str().into(),
                txn.kind.as_str().into(),
                txn.amount.into(),
                txn.fee.into(),
                txn.net.into(),
                txn.currency.as_str().into(),
                txn.created_at().map_or_else(|| CellValue::from(""), CellValue::from),
                txn.description.clone().unwrap_or_default().into(),
            ])
        })
        .collect()
}
