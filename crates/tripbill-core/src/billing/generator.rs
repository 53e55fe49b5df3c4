//! VAT bill generation.
//!
//! Buckets delivery rows into individual bills (credit/cheque parties,
//! forced overrides) and combined bills (pooled cash/QR takings capped by a
//! cumulative threshold). Rows are processed strictly in input order; the
//! running pool is an explicit accumulator threaded through a fold, so the
//! bucketing step can be exercised in isolation.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::{BillItem, BillType, BillingConfig, DeliveryRow, PaymentMethod, VatBill};
use crate::remarks::parse_remarks;

use super::resolver::delivered_items;
use super::vat::split_collected;

/// Options controlling bill generation.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// VAT rate as a fraction.
    pub vat_rate: Decimal,

    /// Cumulative collected-amount cap for a combined pool.
    pub combine_threshold: Decimal,

    /// Invoice IDs always billed individually regardless of payment method.
    pub forced_individual: HashSet<String>,

    /// Bill date; today (UTC) when unset.
    pub bill_date: Option<NaiveDate>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from_config(&BillingConfig::default())
    }
}

impl GeneratorOptions {
    /// Build options from billing configuration.
    pub fn from_config(config: &BillingConfig) -> Self {
        Self {
            vat_rate: config.vat_rate,
            combine_threshold: config.combine_threshold,
            forced_individual: HashSet::new(),
            bill_date: None,
        }
    }

    /// Force the given invoice IDs into individual bills.
    pub fn with_forced_individual<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.forced_individual.extend(ids);
        self
    }

    /// Pin the bill date instead of stamping today.
    pub fn with_bill_date(mut self, date: NaiveDate) -> Self {
        self.bill_date = Some(date);
        self
    }
}

/// Running pool of combined-candidate rows.
#[derive(Debug, Default)]
struct Pool {
    items: Vec<BillItem>,
    invoice_ids: Vec<String>,
    invoice_numbers: Vec<String>,
    amount: Decimal,
    lead_method: Option<PaymentMethod>,
}

impl Pool {
    fn is_empty(&self) -> bool {
        self.invoice_ids.is_empty()
    }

    fn absorb(&mut self, row: &DeliveryRow, items: Vec<BillItem>) {
        for item in items {
            self.merge_item(item);
        }
        self.invoice_ids.push(row.invoice_id.clone());
        self.invoice_numbers.push(row.invoice_number.clone());
        self.amount += row.collected_amount;
        if self.lead_method.is_none() {
            self.lead_method = Some(row.payment_method.clone());
        }
    }

    // Same product at (nearly) the same rate folds into one line.
    fn merge_item(&mut self, incoming: BillItem) {
        let merged = self.items.iter_mut().find(|existing| {
            existing.product_name == incoming.product_name
                && (existing.rate - incoming.rate).abs() < Decimal::new(1, 2)
        });

        match merged {
            Some(existing) => {
                existing.quantity += incoming.quantity;
                existing.total += incoming.total;
            }
            None => self.items.push(incoming),
        }
    }
}

/// Accumulator threaded over the ordered rows.
#[derive(Debug, Default)]
struct BucketState {
    bills: Vec<VatBill>,
    pool: Pool,
}

/// Bucket delivery rows into VAT bills.
///
/// Output ordering follows encounter order: individual bills appear where
/// their row was processed, combined bills where their pool flushed.
pub fn generate_vat_bills(rows: &[DeliveryRow], options: &GeneratorOptions) -> Vec<VatBill> {
    let date = options.bill_date.unwrap_or_else(|| Utc::now().date_naive());

    info!("Generating VAT bills for {} delivery rows", rows.len());

    let mut state = rows.iter().fold(BucketState::default(), |state, row| {
        bucket_row(state, row, options, date)
    });

    if !state.pool.is_empty() {
        let bill = combined_bill(
            std::mem::take(&mut state.pool),
            options,
            state.bills.len() + 1,
            date,
        );
        state.bills.push(bill);
    }

    debug!("Generated {} bills", state.bills.len());
    state.bills
}

/// One fold step: route a row into an individual bill or the running pool,
/// flushing the pool first when the row would push it over the threshold.
fn bucket_row(
    mut state: BucketState,
    row: &DeliveryRow,
    options: &GeneratorOptions,
    date: NaiveDate,
) -> BucketState {
    if row.collected_amount <= Decimal::ZERO {
        debug!(
            "Skipping {}: nothing collected ({})",
            row.invoice_number, row.collected_amount
        );
        return state;
    }

    let parsed = parse_remarks(row.order.remarks.as_deref().unwrap_or(""));
    let items = delivered_items(&row.order, &parsed, options.vat_rate);

    let forced = options.forced_individual.contains(&row.invoice_id);
    if forced || !row.payment_method.is_combinable() {
        state.bills.push(individual_bill(row, items, options, date));
        return state;
    }

    if !state.pool.is_empty()
        && state.pool.amount + row.collected_amount > options.combine_threshold
    {
        debug!(
            "Pool at {} would exceed {} with {}, flushing",
            state.pool.amount, options.combine_threshold, row.collected_amount
        );
        let bill = combined_bill(
            std::mem::take(&mut state.pool),
            options,
            state.bills.len() + 1,
            date,
        );
        state.bills.push(bill);
    }

    state.pool.absorb(row, items);
    state
}

fn individual_bill(
    row: &DeliveryRow,
    items: Vec<BillItem>,
    options: &GeneratorOptions,
    date: NaiveDate,
) -> VatBill {
    let subtotal: Decimal = items.iter().map(|item| item.total).sum();
    let split = split_collected(row.collected_amount, options.vat_rate);

    VatBill {
        id: format!("VAT-{}-{}", row.payment_method.tag(), row.invoice_number),
        bill_type: BillType::Individual,
        payment_method: row.payment_method.clone(),
        invoice_ids: vec![row.invoice_id.clone()],
        invoice_numbers: vec![row.invoice_number.clone()],
        subtotal,
        discount: subtotal - split.taxable,
        vat_amount: split.vat,
        total_amount: row.collected_amount,
        items,
        date,
        customer_pan: row.order.customer_pan.clone(),
    }
}

fn combined_bill(pool: Pool, options: &GeneratorOptions, seq: usize, date: NaiveDate) -> VatBill {
    let subtotal: Decimal = pool.items.iter().map(|item| item.total).sum();
    let split = split_collected(pool.amount, options.vat_rate);
    let method = pool.lead_method.unwrap_or(PaymentMethod::Cash);

    VatBill {
        id: format!("VAT-{}-COMB-{}", method.tag(), seq),
        bill_type: BillType::Combined,
        payment_method: method,
        invoice_ids: pool.invoice_ids,
        invoice_numbers: pool.invoice_numbers,
        subtotal,
        discount: subtotal - split.taxable,
        vat_amount: split.vat,
        total_amount: pool.amount,
        items: pool.items,
        date,
        customer_pan: None,
    }
}
