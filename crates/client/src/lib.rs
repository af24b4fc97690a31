//! Stripe read client - shared by every sync pass.
//!
//! This crate owns the wire side: request-target assembly, authenticated
//! GETs, cursor pagination and the typed shapes of the objects we read.
//!
//! No retries. No caching. Every call is a live request.

mod client;
mod error;
pub mod pagination;
pub mod query;
pub mod types;

pub use client::{RemoteSource, StripeClient};
pub use error::FetchError;
pub use pagination::{PageBounds, Paginator};
pub use query::{build_target, ParamValue, QueryParams};
pub use types::{
    epoch_to_datetime, BalanceTransaction, Charge, CheckoutSession, Customer, Expandable,
    Identified, Invoice, InvoiceLine, LineItem, ListPage, PaymentIntent, Payout,
};
