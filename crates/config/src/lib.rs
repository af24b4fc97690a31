// Configuration loading
//
// One immutable `SyncConfig` is built at process start and passed by
// reference into the client, the engine and the storage layer.

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    CellLayout, Endpoints, Limits, NotifySettings, PaginationSettings, SheetNames,
    StorageSettings, StripeSettings, SyncConfig,
};

/// Environment variable holding the Stripe secret key.
pub const ENV_SECRET_KEY: &str = "STRIPE_SECRET_KEY";

/// Environment variable holding the Slack incoming-webhook URL.
pub const ENV_SLACK_WEBHOOK: &str = "SLACK_WEBHOOK_URL";

/// Environment variable holding a link back to the run (scheduler job page, log view).
pub const ENV_RUN_URL: &str = "SHEETSYNC_RUN_URL";
