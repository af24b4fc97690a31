//! `sheetsync-engine` - one sync pass per entity type.
//!
//! Pure engine crate: talks to Stripe through [`RemoteSource`], to tabular
//! storage through [`SheetStore`] and to humans through [`Notifier`].
//! No HTTP client construction, no file formats, no CLI.
//!
//! [`RemoteSource`]: sheetsync_client::RemoteSource

pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod passes;
pub mod resolver;
pub mod store;
pub mod watermark;

pub use engine::{run_pass, PassReport, SyncContext};
pub use error::{StorageError, SyncError};
pub use model::{CellValue, OutputRow, Pass, SHEET_DATE_FORMAT};
pub use notify::{LogNotifier, Notifier};
pub use resolver::resolve_transactions;
pub use store::SheetStore;
pub use watermark::WatermarkFilter;
