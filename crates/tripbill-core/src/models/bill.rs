//! Generated VAT bill models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::PaymentMethod;

/// Whether a bill covers a single invoice or a pooled group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    /// One bill per invoice (credit/cheque parties, forced overrides).
    Individual,
    /// Pooled cash/QR takings under the combine threshold.
    Combined,
}

/// A line on a generated VAT bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    /// Product name.
    pub product_name: String,

    /// Delivered quantity billed.
    pub quantity: Decimal,

    /// Tax-exclusive unit rate.
    pub rate_before_vat: Decimal,

    /// Tax-inclusive unit rate as stored on the order.
    pub rate: Decimal,

    /// Pre-tax line total, rounded to 2 decimal places.
    pub total: Decimal,
}

/// A generated VAT bill.
///
/// `total_amount` is pinned to the cash actually collected; `subtotal`,
/// `discount` and `vat_amount` are back-derived so that
/// `subtotal - discount + vat_amount == total_amount` holds exactly.
/// The discount is a synthetic balancing figure, not a customer discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VatBill {
    /// Bill identifier.
    pub id: String,

    /// Individual or combined.
    pub bill_type: BillType,

    /// Payment method; for combined bills, the first pooled row's method.
    pub payment_method: PaymentMethod,

    /// Source invoice identifiers.
    pub invoice_ids: Vec<String>,

    /// Human-facing invoice numbers.
    pub invoice_numbers: Vec<String>,

    /// Pre-tax sum of item totals.
    pub subtotal: Decimal,

    /// Synthetic pre-tax balancing figure.
    pub discount: Decimal,

    /// VAT charged on the taxable base.
    pub vat_amount: Decimal,

    /// Collected cash this bill represents.
    pub total_amount: Decimal,

    /// Billed items.
    pub items: Vec<BillItem>,

    /// Bill date.
    pub date: NaiveDate,

    /// Customer tax number, carried on individual bills when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_pan: Option<String>,
}

impl VatBill {
    /// Taxable base the VAT was charged on.
    pub fn taxable_amount(&self) -> Decimal {
        self.subtotal - self.discount
    }
}
