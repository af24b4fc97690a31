//! Typed shapes of the Stripe objects the sync passes read.
//!
//! Only the fields we emit or branch on are modelled; everything else in
//! the payload is ignored by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ── Epoch helpers ───────────────────────────────────────────────────

/// Stripe timestamps are integer epoch seconds. `None` when out of range.
pub fn epoch_to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(epoch, 0)
}

// ── Identity ────────────────────────────────────────────────────────

/// Anything that can act as a `starting_after` cursor.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

identified!(
    Payout,
    BalanceTransaction,
    Charge,
    Customer,
    Invoice,
    PaymentIntent,
    CheckoutSession,
    LineItem,
);

// ── Expandable references ───────────────────────────────────────────

/// A related object that is either a bare id or, when `expand[]` was
/// requested, the full object inline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Reference(String),
    Expanded(Box<T>),
}

impl<T: Identified> Expandable<T> {
    /// The referenced id, whichever variant is present.
    pub fn id(&self) -> &str {
        match self {
            Self::Reference(id) => id,
            Self::Expanded(obj) => obj.id(),
        }
    }

    pub fn expanded(&self) -> Option<&T> {
        match self {
            Self::Reference(_) => None,
            Self::Expanded(obj) => Some(obj),
        }
    }
}

// ── List envelope ───────────────────────────────────────────────────

/// `{"object": "list", "data": [...], "has_more": bool}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            has_more: false,
        }
    }
}

// ── Payouts + ledger ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payout {
    pub id: String,
    pub amount: i64,
    pub arrival_date: i64,
    pub automatic: bool,
    /// Set for manual payouts only. Automatic payouts are resolved by
    /// filtering balance transactions on the payout id instead.
    #[serde(default)]
    pub balance_transaction: Option<Expandable<BalanceTransaction>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub created: i64,
}

impl Payout {
    pub fn arrival_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.arrival_date)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i64,
    pub fee: i64,
    pub net: i64,
    pub currency: String,
    pub created: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl BalanceTransaction {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.created)
    }

    /// Stripe documents `net = amount - fee`; we never trust it blindly.
    pub fn net_is_consistent(&self) -> bool {
        self.amount.checked_sub(self.fee) == Some(self.net)
    }
}

// ── Customers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Expandable<Customer> {
    /// Customer name when expanded, empty otherwise.
    pub fn name(&self) -> &str {
        self.expanded()
            .and_then(|c| c.name.as_deref())
            .unwrap_or("")
    }
}

// ── Charges ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentMethodDetails {
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Charge {
    pub id: String,
    pub created: i64,
    pub amount: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub customer: Option<Expandable<Customer>>,
    #[serde(default)]
    pub invoice: Option<Expandable<Invoice>>,
    #[serde(default)]
    pub payment_intent: Option<Expandable<PaymentIntent>>,
    #[serde(default)]
    pub calculated_statement_descriptor: Option<String>,
    #[serde(default)]
    pub payment_method_details: Option<PaymentMethodDetails>,
}

impl Charge {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.created)
    }

    pub fn payment_method_type(&self) -> &str {
        self.payment_method_details
            .as_ref()
            .map(|d| d.kind.as_str())
            .unwrap_or("")
    }
}

// ── Invoices ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Period {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvoiceLine {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub period: Option<Period>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub lines: ListPage<InvoiceLine>,
}

impl Invoice {
    /// Newer API versions drop `paid` in favour of `status == "paid"`.
    pub fn is_paid(&self) -> bool {
        self.paid || self.status.as_deref() == Some("paid")
    }

    pub fn first_line(&self) -> Option<&InvoiceLine> {
        self.lines.data.first()
    }
}

// ── Payment intents ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer: Option<Expandable<Customer>>,
}

impl PaymentIntent {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.created)
    }
}

// ── Checkout sessions ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub id: String,
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount_total: i64,
    #[serde(default)]
    pub price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub customer: Option<Expandable<Customer>>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    /// Present only when requested with `expand[]=data.line_items`.
    #[serde(default)]
    pub line_items: Option<ListPage<LineItem>>,
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn out_of_range_epoch_has_no_date() {
        assert_eq!(epoch_to_datetime(i64::MAX), None);
        assert_eq!(epoch_to_datetime(0).map(|d| d.timestamp()), Some(0));

        let payout: Payout = serde_json::from_value(json!({
            "id": "po_1", "amount": 5000, "arrival_date": i64::MAX, "automatic": true
        }))
        .unwrap();
        assert_eq!(payout.arrival_at(), None);
    }

    #[test]
    fn expandable_reference() {
        let charge: Charge = serde_json::from_value(json!({
            "id": "ch_1", "created": 1, "amount": 100,
            "customer": "cus_1"
        }))
        .unwrap();
        let customer = charge.customer.unwrap();
        assert_eq!(customer.id(), "cus_1");
        assert!(customer.expanded().is_none());
        assert_eq!(customer.name(), "");
    }

    #[test]
    fn expandable_expanded() {
        let charge: Charge = serde_json::from_value(json!({
            "id": "ch_1", "created": 1, "amount": 100,
            "customer": {"id": "cus_1", "name": "Ada Lovelace", "email": "ada@example.com"}
        }))
        .unwrap();
        let customer = charge.customer.unwrap();
        assert_eq!(customer.id(), "cus_1");
        assert_eq!(customer.name(), "Ada Lovelace");
    }

    #[test]
    fn manual_payout_with_txn_reference() {
        let payout: Payout = serde_json::from_value(json!({
            "id": "po_1", "amount": 5000, "arrival_date": 1768435200,
            "automatic": false, "balance_transaction": "txn_9", "status": "paid"
        }))
        .unwrap();
        assert_eq!(payout.balance_transaction.as_ref().map(|t| t.id()), Some("txn_9"));
        assert_eq!(
            payout.arrival_at().map(|d| d.to_rfc3339()).as_deref(),
            Some("2026-01-15T00:00:00+00:00")
        );
    }

    #[test]
    fn payout_null_txn() {
        let payout: Payout = serde_json::from_value(json!({
            "id": "po_1", "amount": 5000, "arrival_date": 0,
            "automatic": false, "balance_transaction": null
        }))
        .unwrap();
        assert!(payout.balance_transaction.is_none());
    }

    #[test]
    fn net_consistency() {
        let mut txn: BalanceTransaction = serde_json::from_value(json!({
            "id": "txn_1", "type": "charge", "amount": 1000, "fee": 59, "net": 941,
            "currency": "jpy", "created": 0, "description": null
        }))
        .unwrap();
        assert!(txn.net_is_consistent());
        txn.net = 1000;
        assert!(!txn.net_is_consistent());
    }

    #[test]
    fn list_page_defaults_has_more_false() {
        let page: ListPage<Customer> =
            serde_json::from_value(json!({"data": [{"id": "cus_1"}]})).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_more);
    }

    #[test]
    fn invoice_paid_by_status() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "in_1", "status": "paid",
            "lines": {"data": [{"id": "il_1", "description": "Plan", "amount": 300,
                                "period": {"start": 10, "end": 20}}], "has_more": false}
        }))
        .unwrap();
        assert!(invoice.is_paid());
        assert_eq!(invoice.first_line().and_then(|l| l.description.as_deref()), Some("Plan"));
    }
}
