//! Trip-level billing tally.
//!
//! Aggregates per-product quantities across a whole trip (loaded, returned,
//! damaged, failed, billed) and reconciles them into a warehouse unload
//! guide: for every product, how many units should come back and why.

pub mod matcher;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{is_unbilled_status, DeliveryRow, VatBill};
use crate::remarks::parse_remarks;

pub use matcher::{ProductMatcher, TieredMatcher};

/// Reconciliation outcome for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyStatus {
    /// Billed quantity accounted for, directly or via attached reasons.
    Match,
    /// An unexplained gap remains.
    Mismatch,
}

/// Per-product tally line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyItem {
    /// Canonical product name.
    pub product_name: String,

    /// Gross quantity loaded for the trip.
    pub original_qty: Decimal,

    /// Quantity returned per remarks.
    pub returns_qty: Decimal,

    /// Quantity damaged per remarks.
    pub damages_qty: Decimal,

    /// Quantity on orders that never got a VAT bill.
    pub failed_qty: Decimal,

    /// Quantity actually billed across the generated VAT bills.
    pub billed_qty: Decimal,

    /// `original - returns`: what should have been sellable.
    pub expected_net: Decimal,

    /// `expected_net - billed`: sellable units not on any bill.
    pub difference: Decimal,

    /// Units the warehouse should expect back: variance plus returns.
    pub unload_qty: Decimal,

    /// Match or mismatch.
    pub status: TallyStatus,

    /// Human-readable explanations for any gap.
    pub reasons: Vec<String>,

    /// First damage reason recorded in remarks, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_reason: Option<String>,
}

/// Whole-trip totals over the tally lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallySummary {
    /// Distinct products on the tally.
    pub total_products: usize,

    /// Lines with status `match`.
    pub matched: usize,

    /// Lines with status `mismatch`.
    pub mismatched: usize,

    /// Gross loaded quantity.
    pub total_original: Decimal,

    /// Quantity returned by customers.
    pub total_returns: Decimal,

    /// Quantity written off as damaged.
    pub total_damages: Decimal,

    /// Expected net sellable quantity.
    pub total_expected: Decimal,

    /// Quantity on VAT bills.
    pub total_billed: Decimal,

    /// Quantity on undelivered orders.
    pub total_failed: Decimal,

    /// Quantity expected back at the warehouse.
    pub total_unload: Decimal,
}

/// Running counts per product while layering phases in.
#[derive(Debug, Default)]
struct TallyCounts {
    original: Decimal,
    returns: Decimal,
    damages: Decimal,
    failed: Decimal,
    billed: Decimal,
    damage_reason: Option<String>,
}

// Gaps explained within a tenth of a unit count as reconciled.
fn explained(gap: Decimal) -> bool {
    gap.abs() < Decimal::new(1, 1)
}

/// Build the tally with the standard three-tier fuzzy matcher.
pub fn build_tally(rows: &[DeliveryRow], bills: &[VatBill]) -> Vec<TallyItem> {
    build_tally_with(rows, bills, TieredMatcher::new)
}

/// Build the tally with a caller-supplied matcher.
///
/// `make_matcher` receives the canonical product keys seeded from the order
/// items; the returned matcher then resolves every raw name coming from
/// remarks or bill lines. Returns and damages that resolve to no product are
/// dropped; bill lines that resolve to no product get their own entry so
/// billed quantities are never lost.
pub fn build_tally_with<M, F>(
    rows: &[DeliveryRow],
    bills: &[VatBill],
    make_matcher: F,
) -> Vec<TallyItem>
where
    M: ProductMatcher,
    F: FnOnce(Vec<String>) -> M,
{
    let mut products: BTreeMap<String, TallyCounts> = BTreeMap::new();

    // Seed gross and failed quantities from the trip rows
    for row in rows {
        let unbilled = is_unbilled_status(&row.status);
        for item in &row.order.items {
            let counts = products.entry(item.display_name().to_string()).or_default();
            counts.original += item.quantity;
            if unbilled {
                counts.failed += item.quantity;
            }
        }
    }

    let matcher = make_matcher(products.keys().cloned().collect());

    // Layer in returns and damages from remarks
    for row in rows {
        let parsed = parse_remarks(row.order.remarks.as_deref().unwrap_or(""));

        for (name, qty) in &parsed.returns {
            match matcher.resolve(name) {
                Some(key) => {
                    if let Some(counts) = products.get_mut(&key) {
                        counts.returns += qty;
                    }
                }
                None => debug!("Return for unknown product dropped: {}({})", name, qty),
            }
        }

        for (name, qty) in &parsed.damages {
            match matcher.resolve(name) {
                Some(key) => {
                    if let Some(counts) = products.get_mut(&key) {
                        counts.damages += qty;
                        if counts.damage_reason.is_none() {
                            counts.damage_reason = parsed.damage_reasons.get(name).cloned();
                        }
                    }
                }
                None => debug!("Damage for unknown product dropped: {}({})", name, qty),
            }
        }
    }

    // Layer in billed quantities from the generated bills
    for bill in bills {
        for item in &bill.items {
            let key = matcher
                .resolve(&item.product_name)
                .unwrap_or_else(|| item.product_name.clone());
            products.entry(key).or_default().billed += item.quantity;
        }
    }

    let mut items: Vec<TallyItem> = products
        .into_iter()
        .map(|(name, counts)| compile_item(name, counts))
        .collect();

    // Mismatches surface first; alphabetical within each group
    items.sort_by_key(|item| item.status == TallyStatus::Match);

    info!(
        "Tally over {} rows and {} bills: {} products, {} mismatched",
        rows.len(),
        bills.len(),
        items.len(),
        items.iter().filter(|i| i.status == TallyStatus::Mismatch).count()
    );

    items
}

fn compile_item(name: String, counts: TallyCounts) -> TallyItem {
    let expected_net = counts.original - counts.returns;
    let difference = expected_net - counts.billed;
    let accounted = counts.billed + counts.failed + counts.damages;
    let gap = counts.original - counts.returns - accounted;

    let mut reasons = Vec::new();
    let status = if difference == Decimal::ZERO {
        TallyStatus::Match
    } else {
        if counts.failed > Decimal::ZERO {
            reasons.push(format!(
                "{} units on Failed/Pending orders (No Billing)",
                counts.failed
            ));
        }
        if counts.damages > Decimal::ZERO {
            reasons.push(format!("{} units marked as Damages (Excluded)", counts.damages));
        }

        if explained(gap) {
            TallyStatus::Match
        } else {
            reasons.push(format!("Unexplained gap of {} units", gap));
            TallyStatus::Mismatch
        }
    };

    TallyItem {
        product_name: name,
        original_qty: counts.original,
        returns_qty: counts.returns,
        damages_qty: counts.damages,
        failed_qty: counts.failed,
        billed_qty: counts.billed,
        expected_net,
        difference,
        unload_qty: difference + counts.returns,
        status,
        reasons,
        damage_reason: counts.damage_reason,
    }
}

/// Roll the tally lines up into trip totals.
pub fn summarize(items: &[TallyItem]) -> TallySummary {
    TallySummary {
        total_products: items.len(),
        matched: items.iter().filter(|i| i.status == TallyStatus::Match).count(),
        mismatched: items.iter().filter(|i| i.status == TallyStatus::Mismatch).count(),
        total_original: items.iter().map(|i| i.original_qty).sum(),
        total_returns: items.iter().map(|i| i.returns_qty).sum(),
        total_damages: items.iter().map(|i| i.damages_qty).sum(),
        total_expected: items.iter().map(|i| i.expected_net).sum(),
        total_billed: items.iter().map(|i| i.billed_qty).sum(),
        total_failed: items.iter().map(|i| i.failed_qty).sum(),
        total_unload: items.iter().map(|i| i.unload_qty).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillItem, BillType, Order, OrderItem, PaymentMethod};
    use chrono::NaiveDate;

    fn item(name: &str, qty: i64) -> OrderItem {
        OrderItem {
            product_name: name.to_string(),
            temp_product_name: None,
            quantity: Decimal::from(qty),
            rate: Decimal::from(113),
        }
    }

    fn row(id: &str, status: &str, items: Vec<OrderItem>, remarks: Option<&str>) -> DeliveryRow {
        DeliveryRow {
            invoice_id: id.to_string(),
            invoice_number: format!("INV-{}", id),
            customer_name: None,
            date: None,
            status: status.to_string(),
            payment_method: PaymentMethod::Cash,
            collected_amount: Decimal::from(100),
            net_amount: Decimal::from(100),
            order: Order {
                items,
                remarks: remarks.map(str::to_string),
                customer_pan: None,
            },
        }
    }

    fn bill(items: Vec<(&str, i64)>) -> VatBill {
        VatBill {
            id: "VAT-CASH-COMB-1".to_string(),
            bill_type: BillType::Combined,
            payment_method: PaymentMethod::Cash,
            invoice_ids: vec!["a1".to_string()],
            invoice_numbers: vec!["INV-a1".to_string()],
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            items: items
                .into_iter()
                .map(|(name, qty)| BillItem {
                    product_name: name.to_string(),
                    quantity: Decimal::from(qty),
                    rate_before_vat: Decimal::from(100),
                    rate: Decimal::from(113),
                    total: Decimal::from(qty * 100),
                })
                .collect(),
            date: NaiveDate::from_ymd_opt(2025, 4, 14).unwrap(),
            customer_pan: None,
        }
    }

    #[test]
    fn test_fully_billed_product_matches() {
        let rows = vec![row("a1", "delivered", vec![item("Milk 500ml", 10)], None)];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 10)])]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, TallyStatus::Match);
        assert_eq!(items[0].difference, Decimal::ZERO);
        assert_eq!(items[0].unload_qty, Decimal::ZERO);
        assert!(items[0].reasons.is_empty());
    }

    #[test]
    fn test_failed_order_explains_the_gap() {
        let rows = vec![row("a1", "cancelled", vec![item("Milk 500ml", 10)], None)];
        let items = build_tally(&rows, &[]);

        let line = &items[0];
        assert_eq!(line.failed_qty, Decimal::from(10));
        assert_eq!(line.difference, Decimal::from(10));
        assert_eq!(line.status, TallyStatus::Match);
        assert_eq!(line.reasons, vec!["10 units on Failed/Pending orders (No Billing)"]);
        assert_eq!(line.unload_qty, Decimal::from(10));
    }

    #[test]
    fn test_damages_explain_then_removing_them_flips_to_mismatch() {
        let rows = vec![row(
            "a1",
            "delivered",
            vec![item("Milk 500ml", 100)],
            Some("Returns: Milk 500ml(10) | Damages: Milk 500ml(10) - leaked"),
        )];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 80)])]);

        let line = &items[0];
        assert_eq!(line.expected_net, Decimal::from(90));
        assert_eq!(line.difference, Decimal::from(10));
        assert_eq!(line.status, TallyStatus::Match);
        assert_eq!(line.reasons, vec!["10 units marked as Damages (Excluded)"]);
        assert_eq!(line.damage_reason.as_deref(), Some("leaked"));

        // Same figures without the damages: the gap is no longer explained
        let rows = vec![row(
            "a1",
            "delivered",
            vec![item("Milk 500ml", 100)],
            Some("Returns: Milk 500ml(10)"),
        )];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 80)])]);

        let line = &items[0];
        assert_eq!(line.status, TallyStatus::Mismatch);
        assert_eq!(line.reasons, vec!["Unexplained gap of 10 units"]);
    }

    #[test]
    fn test_returns_feed_the_unload_quantity() {
        let rows = vec![row(
            "a1",
            "delivered",
            vec![item("Milk 500ml", 10)],
            Some("Returns: Milk 500ml(2)"),
        )];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 8)])]);

        let line = &items[0];
        assert_eq!(line.difference, Decimal::ZERO);
        assert_eq!(line.status, TallyStatus::Match);
        assert_eq!(line.unload_qty, Decimal::from(2));
    }

    #[test]
    fn test_remark_names_resolve_fuzzily() {
        let rows = vec![row(
            "a1",
            "delivered",
            vec![item("Milk 500ml", 10)],
            Some("Returns: milk 500ML(2)"),
        )];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 8)])]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].returns_qty, Decimal::from(2));
    }

    #[test]
    fn test_unresolvable_returns_are_dropped() {
        let rows = vec![row(
            "a1",
            "delivered",
            vec![item("Milk 500ml", 10)],
            Some("Returns: Butter 100g(5)"),
        )];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 10)])]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].returns_qty, Decimal::ZERO);
    }

    #[test]
    fn test_bill_only_product_gets_its_own_entry() {
        let rows = vec![row("a1", "delivered", vec![item("Milk 500ml", 10)], None)];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 10), ("Ghee 1L", 2)])]);

        assert_eq!(items.len(), 2);
        let ghee = items.iter().find(|i| i.product_name == "Ghee 1L").unwrap();
        assert_eq!(ghee.original_qty, Decimal::ZERO);
        assert_eq!(ghee.billed_qty, Decimal::from(2));
        assert_eq!(ghee.status, TallyStatus::Mismatch);
        assert_eq!(ghee.reasons, vec!["Unexplained gap of -2 units"]);
    }

    #[test]
    fn test_mismatches_sort_before_matches() {
        let rows = vec![
            row("a1", "delivered", vec![item("Aam Panna", 10)], None),
            row("a2", "delivered", vec![item("Zeera Soda", 10)], None),
        ];
        // Aam Panna fully billed, Zeera Soda short by 10 with no explanation
        let items = build_tally(&rows, &[bill(vec![("Aam Panna", 10)])]);

        assert_eq!(items[0].product_name, "Zeera Soda");
        assert_eq!(items[0].status, TallyStatus::Mismatch);
        assert_eq!(items[1].product_name, "Aam Panna");
        assert_eq!(items[1].status, TallyStatus::Match);
    }

    #[test]
    fn test_summary_totals() {
        let rows = vec![
            row("a1", "delivered", vec![item("Milk 500ml", 10)], Some("Returns: Milk 500ml(2)")),
            row("a2", "cancelled", vec![item("Curd 1kg", 5)], None),
        ];
        let items = build_tally(&rows, &[bill(vec![("Milk 500ml", 8)])]);
        let summary = summarize(&items);

        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.mismatched, 0);
        assert_eq!(summary.total_original, Decimal::from(15));
        assert_eq!(summary.total_returns, Decimal::from(2));
        assert_eq!(summary.total_damages, Decimal::ZERO);
        assert_eq!(summary.total_expected, Decimal::from(13));
        assert_eq!(summary.total_billed, Decimal::from(8));
        assert_eq!(summary.total_failed, Decimal::from(5));
        assert_eq!(summary.total_unload, Decimal::from(7));
    }

    #[test]
    fn test_injected_matcher_replaces_fuzzy_resolution() {
        struct ExactOnly(Vec<String>);

        impl ProductMatcher for ExactOnly {
            fn resolve(&self, raw: &str) -> Option<String> {
                self.0.iter().find(|key| key.as_str() == raw).cloned()
            }
        }

        let rows = vec![row(
            "a1",
            "delivered",
            vec![item("Milk 500ml", 10)],
            Some("Returns: milk 500ML(2)"),
        )];

        // The default matcher resolves the lowercased name; exact-only drops it
        let items = build_tally_with(&rows, &[], ExactOnly);
        assert_eq!(items[0].returns_qty, Decimal::ZERO);
    }
}
