//! Delivery report input models.
//!
//! These are read-only snapshots handed over by the data store; the billing
//! modules never mutate them.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a delivery trip report: an assigned invoice plus the amounts
/// observed at delivery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRow {
    /// Internal invoice/order identifier.
    pub invoice_id: String,

    /// Human-facing invoice number.
    pub invoice_number: String,

    /// Customer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Delivery date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Row status as reported by the store (delivered, cancelled, ...).
    pub status: String,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Cash actually collected for this invoice.
    pub collected_amount: Decimal,

    /// Invoice amount as recorded on the order.
    pub net_amount: Decimal,

    /// Order snapshot at invoice time.
    pub order: Order,
}

/// Order data attached to a delivery row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    /// Line items snapshotted at invoice time.
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Free-text delivery remarks carrying the Returns/Damages/Payments
    /// sections appended by the delivery flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    /// Customer tax registration number (PAN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_pan: Option<String>,
}

/// A single ordered line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name at order time.
    pub product_name: String,

    /// Renamed product from the order-edit flow; takes precedence over
    /// `product_name` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_product_name: Option<String>,

    /// Ordered quantity. Accepts the legacy `qty` field name on input.
    #[serde(alias = "qty")]
    pub quantity: Decimal,

    /// Tax-inclusive unit price.
    pub rate: Decimal,
}

impl OrderItem {
    /// Effective name used for billing and reconciliation.
    pub fn display_name(&self) -> &str {
        self.temp_product_name
            .as_deref()
            .unwrap_or(&self.product_name)
    }
}

/// Payment method recorded on a delivery row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cash,
    /// QR/wallet payment.
    Qr,
    /// Cheque.
    Cheque,
    /// Credit (billed, to be settled later).
    Credit,
    /// Any other method (e.g. split "multiple" payments).
    #[serde(untagged)]
    Other(String),
}

impl PaymentMethod {
    /// Methods whose takings pool into combined bills.
    pub fn is_combinable(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Qr)
    }

    /// Lowercase string form.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qr => "qr",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Other(s) => s,
        }
    }

    /// Uppercase tag used in bill identifiers.
    pub fn tag(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row statuses for which no VAT bill exists (undelivered or rolled back).
const UNBILLED_STATUSES: [&str; 5] = ["cancelled", "failed", "returned", "dispatched", "approved"];

/// Whether a row status means the order never made it onto a VAT bill.
pub fn is_unbilled_status(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    UNBILLED_STATUSES.contains(&status.as_str())
}
