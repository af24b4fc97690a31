//! Payment intents pass.

use sheetsync_client::{PaymentIntent, QueryParams, RemoteSource};

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
        .with("limit", config.limits.payment)
        .with("expand[]", ["data.customer"]);
    let intents: Vec<PaymentIntent> =
        first_page(ctx, &config.stripe.endpoints.payment_intents, params)?;

    let rows = intents
        .iter()
        .filter_map(|pi| Some((pi, dated("payment intent", &pi.id, pi.created_at())?)))
        .filter(|(pi, created)| filter.admits(&pi.id, *created))
        .map(|(pi, created)| {
            OutputRow::new(vec![
                pi.id.as_str().into(),
                created.into(),
                pi.customer.as_ref().map(|c| c.name()).unwrap_or("").into(),
                pi.description.clone().unwrap_or_default().into(),
                pi.amount.into(),
                pi.status.as_str().into(),
            ])
        })
        .collect();

    Ok(Collected {
        watermark: Some(filter.at()),
        candidates: intents.len(),
        rows,
    })
}
