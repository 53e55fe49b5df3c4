//! Cross-checks generated bills against their source delivery rows.
//!
//! Validation never panics or short-circuits; every finding lands in a
//! [`BillValidation`] report so callers can render or serialize the full
//! picture. Errors mark a bill invalid, warnings do not.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{DeliveryRow, VatBill};
use crate::remarks::parse_remarks;

use super::resolver::delivered_qty;

/// Validation outcome for a single bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillValidation {
    /// Bill this report covers.
    pub bill_id: String,

    /// True when no errors were found. Warnings do not invalidate.
    pub is_valid: bool,

    /// Findings that invalidate the bill.
    pub errors: Vec<String>,

    /// Findings worth a look but within tolerance.
    pub warnings: Vec<String>,

    /// Figures the findings were derived from.
    pub details: ValidationDetails,
}

/// Numbers backing a validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationDetails {
    /// Collected amount the bill carries.
    pub bill_total: Decimal,

    /// Delivered value recomputed from the source orders.
    pub order_total: Decimal,

    /// Signed `bill_total - order_total`.
    pub difference: Decimal,

    /// Line count on the bill.
    pub item_count: usize,

    /// Source invoices the bill claims.
    pub invoice_count: usize,
}

/// Validate one bill against the delivery rows it was generated from.
pub fn validate_bill(bill: &VatBill, rows: &[DeliveryRow]) -> BillValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let sources: Vec<&DeliveryRow> = rows
        .iter()
        .filter(|row| bill.invoice_ids.contains(&row.invoice_id))
        .collect();

    if sources.is_empty() {
        errors.push(format!("No orders found for bill {}", bill.id));
        return BillValidation {
            bill_id: bill.id.clone(),
            is_valid: false,
            errors,
            warnings,
            details: ValidationDetails {
                bill_total: bill.total_amount,
                order_total: Decimal::ZERO,
                difference: bill.total_amount,
                item_count: bill.items.len(),
                invoice_count: bill.invoice_ids.len(),
            },
        };
    }

    // Recompute what should have been billed: delivered quantities at the
    // tax-inclusive order rate.
    let mut expected: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut order_total = Decimal::ZERO;

    for row in &sources {
        if row.order.items.is_empty() {
            warnings.push(format!("Order {} has no items", row.invoice_number));
            continue;
        }

        let parsed = parse_remarks(row.order.remarks.as_deref().unwrap_or(""));
        for item in &row.order.items {
            let name = item.display_name();
            let delivered =
                delivered_qty(item.quantity, parsed.returned(name), parsed.damaged(name));
            if delivered > Decimal::ZERO {
                *expected.entry(name.to_string()).or_default() += delivered;
                order_total += delivered * item.rate;
            }
        }
    }

    // Bill quantities summed per product so merged lines compare cleanly
    let mut billed: BTreeMap<String, Decimal> = BTreeMap::new();
    for item in &bill.items {
        *billed.entry(item.product_name.clone()).or_default() += item.quantity;
    }

    for (name, expected_qty) in &expected {
        match billed.get(name) {
            None => errors.push(format!(
                "Product \"{}\" missing from bill (expected {} units)",
                name, expected_qty
            )),
            Some(bill_qty) if (*bill_qty - expected_qty).abs() > Decimal::ONE => {
                warnings.push(format!(
                    "Product \"{}\" quantity mismatch: bill has {}, expected {}",
                    name, bill_qty, expected_qty
                ));
            }
            Some(_) => {}
        }
    }

    for (name, bill_qty) in &billed {
        if !expected.contains_key(name) {
            warnings.push(format!(
                "Product \"{}\" in bill but not in orders ({} units)",
                name, bill_qty
            ));
        }
    }

    let difference = bill.total_amount - order_total;
    if difference.abs() > Decimal::ONE {
        errors.push(format!(
            "Total amount mismatch: bill shows ₹{:.2}, expected ₹{:.2} (diff: ₹{:.2})",
            bill.total_amount, order_total, difference
        ));
    }

    BillValidation {
        bill_id: bill.id.clone(),
        is_valid: errors.is_empty(),
        errors,
        warnings,
        details: ValidationDetails {
            bill_total: bill.total_amount,
            order_total,
            difference,
            item_count: bill.items.len(),
            invoice_count: bill.invoice_ids.len(),
        },
    }
}

/// Validate a batch of bills, logging a pass/fail summary.
pub fn validate_bills(bills: &[VatBill], rows: &[DeliveryRow]) -> Vec<BillValidation> {
    let reports: Vec<BillValidation> =
        bills.iter().map(|bill| validate_bill(bill, rows)).collect();

    let valid = reports.iter().filter(|report| report.is_valid).count();
    info!(
        "Validated {} bills: {} valid, {} with errors",
        reports.len(),
        valid,
        reports.len() - valid
    );

    reports
}
