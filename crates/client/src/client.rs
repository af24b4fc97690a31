//! Stripe HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One GET per call,
//! bearer auth from the immutable config, uniform failure on non-2xx.

use serde::de::DeserializeOwned;
use sheetsync_config::{StripeSettings, ENV_SECRET_KEY};

use crate::error::FetchError;

const USER_AGENT: &str = concat!("sheetsync/", env!("CARGO_PKG_VERSION"));

/// Something that can answer a request target (`/path?query`) with JSON.
///
/// The sync engine is written against this trait so tests can substitute
/// an in-memory source for the live API.
pub trait RemoteSource {
    fn get_json(&self, target: &str) -> Result<serde_json::Value, FetchError>;

    /// Typed convenience over [`get_json`](Self::get_json).
    fn get<T: DeserializeOwned>(&self, target: &str) -> Result<T, FetchError>
    where
        Self: Sized,
    {
        let value = self.get_json(target)?;
        serde_json::from_value(value)
            .map_err(|e| FetchError::Parse(format!("unexpected response shape for {target}: {e}")))
    }
}

impl<S: RemoteSource + ?Sized> RemoteSource for &S {
    fn get_json(&self, target: &str) -> Result<serde_json::Value, FetchError> {
        (**self).get_json(target)
    }
}

/// Stripe API client (blocking).
pub struct StripeClient<'a> {
    http: reqwest::blocking::Client,
    settings: &'a StripeSettings,
}

impl<'a> StripeClient<'a> {
    pub fn new(settings: &'a StripeSettings) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { http, settings })
    }

    fn url(&self, target: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), target)
    }
}

impl RemoteSource for StripeClient<'_> {
    fn get_json(&self, target: &str) -> Result<serde_json::Value, FetchError> {
        // Read at call time: a missing key is a deployment defect, fail before any I/O.
        let api_key = self.settings.secret_key().ok_or_else(|| {
            FetchError::Configuration(format!(
                "missing Stripe secret key (set {ENV_SECRET_KEY} or stripe.secret_key)"
            ))
        })?;

        let url = self.url(target);
        tracing::debug!(path = %target, "GET");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .map_err(|e| FetchError::Network(format!("GET {target}: {e}")))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .map_err(|e| FetchError::Network(format!("failed to read Stripe response body: {e}")))?;

        if !(200..300).contains(&status) {
            let message = extract_stripe_error(&text, status);
            tracing::debug!(status, path = %target, %message, "Stripe request failed");
            return Err(FetchError::Remote {
                status,
                message,
                body: text,
            });
        }

        let trimmed = text.trim_start_matches('\u{feff}');
        serde_json::from_str(trimmed).map_err(|e| {
            FetchError::Parse(format!(
                "failed to parse Stripe JSON response: {} (body: {})",
                e,
                trimmed.chars().take(200).collect::<String>(),
            ))
        })
    }
}

/// `{"error": {"message": "..."}}` when present, `HTTP <status>` otherwise.
fn extract_stripe_error(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings(base_url: String, key: Option<&str>) -> StripeSettings {
        StripeSettings {
            base_url,
            secret_key: key.map(str::to_string),
            ..StripeSettings::default()
        }
    }

    #[test]
    fn test_extract_stripe_error() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "No such payout: 'po_x'"}}"#;
        assert_eq!(extract_stripe_error(body, 404), "No such payout: 'po_x'");
        assert_eq!(extract_stripe_error("<html>", 502), "HTTP 502");
    }

    #[test]
    fn test_bearer_auth_and_json_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/payouts")
                .query_param("limit", "10")
                .header("authorization", "Bearer sk_test_key");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"object": "list", "data": [], "has_more": false}));
        });

        let s = settings(server.url("/v1"), Some("sk_test_key"));
        let client = StripeClient::new(&s).unwrap();
        let body = client.get_json("/payouts?limit=10").unwrap();

        mock.assert();
        assert_eq!(body["has_more"], serde_json::json!(false));
    }

    #[test]
    fn test_missing_key_fails_without_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({}));
        });

        let s = settings(server.url("/v1"), None);
        let client = StripeClient::new(&s).unwrap();
        let err = client.get_json("/charges").unwrap_err();

        assert!(matches!(err, FetchError::Configuration(_)), "{err}");
        assert!(err.to_string().contains(ENV_SECRET_KEY));
        mock.assert_calls(0);
    }

    #[test]
    fn test_non_2xx_is_remote_error_with_raw_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/balance_transactions/txn_missing");
            then.status(404).json_body(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "No such balance transaction"}
            }));
        });

        let s = settings(server.url("/v1"), Some("sk_test_key"));
        let client = StripeClient::new(&s).unwrap();
        let err = client
            .get_json("/balance_transactions/txn_missing")
            .unwrap_err();

        // No retry: exactly one call.
        mock.assert_calls(1);
        match err {
            FetchError::Remote {
                status,
                ref message,
                ref body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No such balance transaction");
                assert!(body.contains("invalid_request_error"));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn test_server_error_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/charges");
            then.status(503).body("upstream down");
        });

        let s = settings(server.url("/v1"), Some("sk_test_key"));
        let client = StripeClient::new(&s).unwrap();
        let err = client.get_json("/charges").unwrap_err();

        mock.assert_calls(1);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Stripe error (503): HTTP 503");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/charges");
            then.status(200).body("not json");
        });

        let s = settings(server.url("/v1"), Some("sk_test_key"));
        let client = StripeClient::new(&s).unwrap();
        let err = client.get_json("/charges").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)), "{err}");
    }

    #[test]
    fn test_typed_get() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/balance_transactions/txn_1");
            then.status(200).json_body(serde_json::json!({
                "id": "txn_1", "object": "balance_transaction", "type": "payout",
                "amount": -5000, "fee": 0, "net": -5000, "currency": "jpy",
                "created": 1768435200, "description": "STRIPE PAYOUT"
            }));
        });

        let s = settings(server.url("/v1/"), Some("sk_test_key"));
        let client = StripeClient::new(&s).unwrap();
        let txn: crate::BalanceTransaction = client.get("/balance_transactions/txn_1").unwrap();
        assert_eq!(txn.kind, "payout");
        assert_eq!(txn.net, -5000);
    }
}
