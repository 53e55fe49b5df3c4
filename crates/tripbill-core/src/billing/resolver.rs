//! Delivered-item resolution.
//!
//! Turns an order's gross line items into the items actually delivered
//! (returns and damages deducted) with their pre-tax monetary breakdown.

use rust_decimal::Decimal;

use crate::models::{BillItem, Order};
use crate::remarks::ParsedRemarks;

use super::vat::net_from_gross;

/// Gross quantity minus returns and damages, floored at zero.
pub fn delivered_qty(quantity: Decimal, returned: Decimal, damaged: Decimal) -> Decimal {
    (quantity - returned - damaged).max(Decimal::ZERO)
}

/// Compute the items actually delivered for one order.
///
/// Items with zero delivered quantity are excluded. Pure: same inputs,
/// same output.
pub fn delivered_items(order: &Order, parsed: &ParsedRemarks, vat_rate: Decimal) -> Vec<BillItem> {
    let mut items = Vec::new();

    for item in &order.items {
        let name = item.display_name();
        let delivered = delivered_qty(item.quantity, parsed.returned(name), parsed.damaged(name));
        if delivered <= Decimal::ZERO {
            continue;
        }

        let rate_before_vat = net_from_gross(item.rate, vat_rate);
        items.push(BillItem {
            product_name: name.to_string(),
            quantity: delivered,
            rate_before_vat: rate_before_vat.round_dp(2),
            rate: item.rate,
            total: (delivered * rate_before_vat).round_dp(2),
        });
    }

    items
}
