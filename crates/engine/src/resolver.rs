//! Payout → balance transactions.
//!
//! Stripe only supports `GET /balance_transactions?payout=<id>` for payouts
//! created by the automatic schedule. A manual payout instead carries its
//! single ledger entry on the payout object itself. The `automatic` flag
//! alone picks the strategy.

use sheetsync_client::{
    BalanceTransaction, Expandable, FetchError, Paginator, Payout, QueryParams, RemoteSource,
};
use sheetsync_config::SyncConfig;

use crate::error::SyncError;

/// Every balance transaction attached to `payout`, in server order.
///
/// Any fetch failure is reported as [`SyncError::Resolution`] naming the payout.
pub fn resolve_transactions<S: RemoteSource>(
    source: &S,
    paginator: &Paginator<'_, S>,
    config: &SyncConfig,
    payout: &Payout,
) -> Result<Vec<BalanceTransaction>, SyncError> {
    let result = if payout.automatic {
        automatic(paginator, config, &payout.id)
    } else {
        manual(source, config, payout)
    };

    result.map_err(|source| {
        tracing::error!(payout = %payout.id, error = %source, "balance transaction lookup failed");
        SyncError::Resolution {
            payout_id: payout.id.clone(),
            source,
        }
    })
}

fn automatic<S: RemoteSource>(
    paginator: &Paginator<'_, S>,
    config: &SyncConfig,
    payout_id: &str,
) -> Result<Vec<BalanceTransaction>, FetchError> {
    let params = QueryParams::new().with("payout", payout_id);
    paginator.collect_all(
        &config.stripe.endpoints.balance_transactions,
        &params,
        config.limits.balance_transaction,
    )
}

fn manual<S: RemoteSource>(
    source: &S,
    config: &SyncConfig,
    payout: &Payout,
) -> Result<Vec<BalanceTransaction>, FetchError> {
    match &payout.balance_transaction {
        None => {
            tracing::warn!(
                payout = %payout.id,
                "manual payout has no balance_transaction; emitting no rows for it"
            );
            Ok(Vec::new())
        }
        Some(Expandable::Expanded(txn)) => Ok(vec![(**txn).clone()]),
        Some(Expandable::Reference(id)) => {
            let target = config.stripe.endpoints.balance_transaction(id);
            let txn: BalanceTransaction = source.get(&target)?;
            Ok(vec![txn])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use serde_json::{json, Value};
    use sheetsync_client::PageBounds;

    /// Serves canned responses keyed by exact request target.
    #[derive(Default)]
    struct FakeStripe {
        responses: HashMap<String, Result<Value, (u16, String)>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeStripe {
        fn with(mut self, target: &str, body: Value) -> Self {
            self.responses.insert(target.to_string(), Ok(body));
            self
        }

        fn failing(mut self, target: &str, status: u16) -> Self {
            self.responses
                .insert(target.to_string(), Err((status, "{\"error\":{}}".to_string())));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl RemoteSource for FakeStripe {
        fn get_json(&self, target: &str) -> Result<Value, FetchError> {
            self.requests.borrow_mut().push(target.to_string());
            match self.responses.get(target) {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err((status, body))) => Err(FetchError::Remote {
                    status: *status,
                    message: format!("HTTP {status}"),
                    body: body.clone(),
                }),
                None => Err(FetchError::Remote {
                    status: 404,
                    message: format!("unexpected request {target}"),
                    body: String::new(),
                }),
            }
        }
    }

    fn txn(id: &str) -> Value {
        json!({
            "id": id, "type": "charge", "amount": 1000, "fee": 36, "net": 964,
            "currency": "jpy", "created": 1768435200, "description": null
        })
    }

    fn payout(automatic: bool, balance_transaction: Value) -> Payout {
        serde_json::from_value(json!({
            "id": "po_1", "amount": 1928, "arrival_date": 1768435200,
            "automatic": automatic, "balance_transaction": balance_transaction,
            "status": "paid"
        }))
        .unwrap()
    }

    fn config() -> SyncConfig {
        let mut config = SyncConfig::default();
        config.limits.balance_transaction = 2;
        config
    }

    fn resolve(fake: &FakeStripe, payout: &Payout) -> Result<Vec<BalanceTransaction>, SyncError> {
        let paginator = Paginator::new(fake, PageBounds::default());
        resolve_transactions(fake, &paginator, &config(), payout)
    }

    #[test]
    fn automatic_paginates_by_payout_and_ignores_txn_field() {
        let fake = FakeStripe::default()
            .with(
                "/balance_transactions?payout=po_1&limit=2",
                json!({"data": [txn("txn_a"), txn("txn_b")], "has_more": true}),
            )
            .with(
                "/balance_transactions?payout=po_1&limit=2&starting_after=txn_b",
                json!({"data": [txn("txn_c")], "has_more": false}),
            );

        // A stray balance_transaction must not be looked up for automatic payouts.
        let p = payout(true, json!("txn_should_not_be_read"));
        let txns = resolve(&fake, &p).unwrap();

        let ids: Vec<&str> = txns.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["txn_a", "txn_b", "txn_c"]);
        assert!(fake
            .requests()
            .iter()
            .all(|r| r.starts_with("/balance_transactions?payout=po_1")));
    }

    #[test]
    fn automatic_with_no_transactions_is_empty() {
        let fake = FakeStripe::default().with(
            "/balance_transactions?payout=po_1&limit=2",
            json!({"data": [], "has_more": false}),
        );
        let txns = resolve(&fake, &payout(true, Value::Null)).unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn manual_does_single_direct_lookup() {
        let fake = FakeStripe::default().with("/balance_transactions/txn_m", txn("txn_m"));
        let txns = resolve(&fake, &payout(false, json!("txn_m"))).unwrap();

        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].id, "txn_m");
        assert_eq!(fake.requests(), ["/balance_transactions/txn_m"]);
    }

    #[test]
    fn manual_never_uses_payout_filter() {
        let fake = FakeStripe::default().with("/balance_transactions/txn_m", txn("txn_m"));
        resolve(&fake, &payout(false, json!("txn_m"))).unwrap();
        assert!(fake.requests().iter().all(|r| !r.contains("payout=")));
    }

    #[test]
    fn manual_missing_txn_is_empty_not_error() {
        let fake = FakeStripe::default();
        let txns = resolve(&fake, &payout(false, Value::Null)).unwrap();
        assert!(txns.is_empty());
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn manual_expanded_txn_needs_no_request() {
        let fake = FakeStripe::default();
        let txns = resolve(&fake, &payout(false, txn("txn_inline"))).unwrap();
        assert_eq!(txns[0].id, "txn_inline");
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn failure_names_the_payout() {
        let fake = FakeStripe::default().failing("/balance_transactions/txn_m", 500);
        let err = resolve(&fake, &payout(false, json!("txn_m"))).unwrap_err();

        match &err {
            SyncError::Resolution { payout_id, source } => {
                assert_eq!(payout_id, "po_1");
                assert_eq!(source.status(), Some(500));
            }
            other => panic!("expected Resolution, got {other:?}"),
        }
        assert!(err.to_string().contains("po_1"));
    }

    #[test]
    fn failure_on_later_page_names_the_payout() {
        let fake = FakeStripe::default()
            .with(
                "/balance_transactions?payout=po_1&limit=2",
                json!({"data": [txn("txn_a"), txn("txn_b")], "has_more": true}),
            )
            .failing(
                "/balance_transactions?payout=po_1&limit=2&starting_after=txn_b",
                503,
            );
        let err = resolve(&fake, &payout(true, Value::Null)).unwrap_err();
        assert!(matches!(err, SyncError::Resolution { ref payout_id, .. } if payout_id == "po_1"));
    }
}
