// Sync settings
// Loaded from ~/.config/sheetsync/config.toml (or --config), env overrides on top

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::{ENV_RUN_URL, ENV_SECRET_KEY, ENV_SLACK_WEBHOOK};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub stripe: StripeSettings,
    pub limits: Limits,
    pub pagination: PaginationSettings,
    pub sheets: SheetNames,
    pub cells: CellLayout,
    pub storage: StorageSettings,
    pub notify: NotifySettings,
}

// ---------------------------------------------------------------------------
// Stripe API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StripeSettings {
    /// API base including version prefix, e.g. "https://api.stripe.com/v1"
    pub base_url: String,

    /// Secret key. Normally supplied via STRIPE_SECRET_KEY rather than the file.
    pub secret_key: Option<String>,

    /// Per-request timeout
    pub timeout_secs: u64,

    pub endpoints: Endpoints,
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.stripe.com/v1".to_string(),
            secret_key: None,
            timeout_secs: 30,
            endpoints: Endpoints::default(),
        }
    }
}

impl StripeSettings {
    /// The configured secret key, if present and non-blank.
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub charges: String,
    pub invoices: String,
    pub payment_intents: String,
    pub checkout_sessions: String,
    pub payouts: String,
    pub balance_transactions: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            charges: "/charges".to_string(),
            invoices: "/invoices".to_string(),
            payment_intents: "/payment_intents".to_string(),
            checkout_sessions: "/checkout/sessions".to_string(),
            payouts: "/payouts".to_string(),
            balance_transactions: "/balance_transactions".to_string(),
        }
    }
}

impl Endpoints {
    /// `/checkout/sessions/{id}/line_items`
    pub fn session_line_items(&self, session_id: &str) -> String {
        format!("{}/{}/line_items", self.checkout_sessions, session_id)
    }

    /// `/balance_transactions/{id}`
    pub fn balance_transaction(&self, id: &str) -> String {
        format!("{}/{}", self.balance_transactions, id)
    }

    /// `/invoices/{id}`
    pub fn invoice(&self, id: &str) -> String {
        format!("{}/{}", self.invoices, id)
    }
}

// ---------------------------------------------------------------------------
// Page sizes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub charge: u32,
    pub invoice: u32,
    pub payment: u32,
    pub session: u32,
    pub payout: u32,
    pub balance_transaction: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            charge: 200,
            invoice: 200,
            payment: 100,
            session: 100,
            payout: 100,
            balance_transaction: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination bounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Hard ceiling on pages fetched by one paginated query.
    pub max_pages: u32,

    /// Wall-clock budget for one paginated query.
    pub deadline_secs: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            deadline_secs: 900,
        }
    }
}

impl PaginationSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

// ---------------------------------------------------------------------------
// Destinations + layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub charge: String,
    pub invoice: String,
    pub payment: String,
    pub session: String,
    pub payout: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            charge: "charges".to_string(),
            invoice: "invoices".to_string(),
            payment: "payments".to_string(),
            session: "sessions".to_string(),
            payout: "payouts".to_string(),
        }
    }
}

/// 1-based row/column positions inside every destination sheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CellLayout {
    pub latest_date_row: usize,
    pub latest_date_column: usize,
    pub insert_row: usize,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            latest_date_row: 2,
            latest_date_column: 2, // column B
            insert_row: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one `<sheet>.csv` per destination.
    pub dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("sheets"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Slack incoming webhook. None = failures are only logged.
    pub webhook_url: Option<String>,
    pub user: String,
    pub channel: String,
    /// Deep link appended to failure messages.
    pub run_url: Option<String>,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            user: "oncall".to_string(),
            channel: "stripe-sync".to_string(),
            run_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Load + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    /// Default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetsync")
            .join("config.toml")
    }

    /// Load from an explicit path, or the default path falling back to
    /// built-in defaults when absent. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(
                        path = %default_path.display(),
                        "no config file, using defaults"
                    );
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay secrets and run context from the environment.
    /// Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(ENV_SECRET_KEY) {
            self.stripe.secret_key = Some(key.trim().to_string());
        }
        if let Some(url) = non_blank(ENV_SLACK_WEBHOOK) {
            self.notify.webhook_url = Some(url);
        }
        if let Some(url) = non_blank(ENV_RUN_URL) {
            self.notify.run_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stripe.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("stripe.base_url is empty".into()));
        }

        let limits = [
            ("charge", self.limits.charge),
            ("invoice", self.limits.invoice),
            ("payment", self.limits.payment),
            ("session", self.limits.session),
            ("payout", self.limits.payout),
            ("balance_transaction", self.limits.balance_transaction),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "limits.{name} must be at least 1"
                )));
            }
        }

        if self.pagination.max_pages == 0 {
            return Err(ConfigError::Validation(
                "pagination.max_pages must be at least 1".into(),
            ));
        }

        let cells = &self.cells;
        if cells.latest_date_row < 2 || cells.latest_date_column == 0 || cells.insert_row < 2 {
            return Err(ConfigError::Validation(
                "cells positions are 1-based and rows must be below the header".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = SyncConfig::from_toml("").unwrap();
        assert_eq!(config.stripe.base_url, "https://api.stripe.com/v1");
        assert_eq!(config.limits.charge, 200);
        assert_eq!(config.limits.balance_transaction, 100);
        assert_eq!(config.cells.latest_date_column, 2);
        assert_eq!(config.sheets.payout, "payouts");
        assert!(config.stripe.secret_key().is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SyncConfig::from_toml(
            r#"
[limits]
payout = 20

[sheets]
payout = "Payout Info"
"#,
        )
        .unwrap();
        assert_eq!(config.limits.payout, 20);
        assert_eq!(config.limits.invoice, 200);
        assert_eq!(config.sheets.payout, "Payout Info");
        assert_eq!(config.sheets.charge, "charges");
    }

    #[test]
    fn retired_customer_settings_are_ignored() {
        let config = SyncConfig::from_toml(
            "[limits]\ncustomer = 0\n\n[stripe.endpoints]\ncustomers = \"/customers\"\n",
        )
        .unwrap();
        assert_eq!(config.limits.payment, 100);
    }

    #[test]
    fn zero_limit_rejected() {
        let err = SyncConfig::from_toml("[limits]\nbalance_transaction = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("limits.balance_transaction"));
    }

    #[test]
    fn header_row_cannot_hold_watermark() {
        let err = SyncConfig::from_toml("[cells]\nlatest_date_row = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = SyncConfig::from_toml("[limits\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_secret_and_webhook() {
        let mut config = SyncConfig::default();
        config.apply_env(|key| match key {
            ENV_SECRET_KEY => Some("  sk_test_123  ".to_string()),
            ENV_SLACK_WEBHOOK => Some("https://hooks.example/abc".to_string()),
            ENV_RUN_URL => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.stripe.secret_key(), Some("sk_test_123"));
        assert_eq!(
            config.notify.webhook_url.as_deref(),
            Some("https://hooks.example/abc")
        );
        assert!(config.notify.run_url.is_none());
    }

    #[test]
    fn blank_secret_in_file_counts_as_missing() {
        let config = SyncConfig::from_toml("[stripe]\nsecret_key = \"   \"\n").unwrap();
        assert!(config.stripe.secret_key().is_none());
    }

    #[test]
    fn load_explicit_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SyncConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\ndir = \"/tmp/sheets\"\n").unwrap();
        let config = SyncConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/sheets"));
    }

    #[test]
    fn endpoint_helpers() {
        let e = Endpoints::default();
        assert_eq!(e.session_line_items("cs_1"), "/checkout/sessions/cs_1/line_items");
        assert_eq!(e.balance_transaction("txn_1"), "/balance_transactions/txn_1");
        assert_eq!(e.invoice("in_1"), "/invoices/in_1");
    }
}
