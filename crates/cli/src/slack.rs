//! Failure notifications via a Slack incoming webhook.

use std::time::Duration;

use sheetsync_engine::Notifier;

pub struct SlackNotifier {
    http: reqwest::blocking::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, String> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("cannot build HTTP client: {e}"))?;
        Ok(Self {
            http,
            webhook_url: webhook_url.into(),
        })
    }
}

/// Webhook payload: the recipient is mentioned at the top of the message.
pub fn payload(message: &str, recipient: &str, channel: &str) -> serde_json::Value {
    serde_json::json!({
        "channel": channel,
        "text": format!("@{recipient}\n{message}"),
        "link_names": true,
    })
}

impl Notifier for SlackNotifier {
    fn notify_failure(&self, message: &str, recipient: &str, channel: &str) {
        let result = self
            .http
            .post(&self.webhook_url)
            .json(&payload(message, recipient, channel))
            .send();

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(channel, "failure notification sent");
            }
            Ok(resp) => {
                tracing::error!(status = resp.status().as_u16(), channel, "Slack webhook rejected notification");
            }
            Err(e) => {
                tracing::error!(error = %e, channel, "Slack webhook unreachable");
            }
        }
    }
}
