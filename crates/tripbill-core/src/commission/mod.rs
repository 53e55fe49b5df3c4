//! Tiered sales commission calculation.
//!
//! Two modes over the same band table: slab mode attributes the slice of
//! sales inside each band at that band's rate (progressive-tax style),
//! level mode finds the single band containing the total and applies its
//! rate to the whole amount. Both operate on net sales, gross minus
//! returns, and round money at the point of computation.

pub mod bands;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{
    CommissionBand, CommissionBreakdown, CommissionMode, CommissionPreviewRow, CommissionResult,
    CommissionWithReturns,
};

pub use bands::{validate_band, validate_level_bands, validate_slab_bands, BandValidation};

/// Compute commission for the given net sales.
///
/// Negative sales clamp to zero. Inactive bands are ignored; with no sales
/// or no active bands the result carries an empty breakdown.
pub fn calculate_commission(
    net_sales: Decimal,
    bands: &[CommissionBand],
    mode: CommissionMode,
) -> CommissionResult {
    let net_sales = if net_sales < Decimal::ZERO {
        warn!("Net sales {} is negative, defaulting to 0", net_sales);
        Decimal::ZERO
    } else {
        net_sales
    };

    let active = active_sorted(bands);
    if net_sales.is_zero() || active.is_empty() {
        return CommissionResult {
            total_commission: Decimal::ZERO,
            breakdown: Vec::new(),
            mode,
            sales_base: net_sales,
        };
    }

    match mode {
        CommissionMode::Slab => slab_commission(net_sales, &active),
        CommissionMode::Level => level_commission(net_sales, &active),
    }
}

/// Deduct returns from gross sales, then compute commission on the net.
///
/// Negative inputs clamp to zero; returns above gross cap at gross.
pub fn calculate_commission_with_returns(
    gross_sales: Decimal,
    returns: Decimal,
    bands: &[CommissionBand],
    mode: CommissionMode,
) -> CommissionWithReturns {
    let gross_sales = gross_sales.max(Decimal::ZERO);
    let mut returns = returns.max(Decimal::ZERO);
    if returns > gross_sales {
        warn!(
            "Returns {} exceed gross sales {}, capping at gross",
            returns, gross_sales
        );
        returns = gross_sales;
    }

    let net_sales = gross_sales - returns;
    CommissionWithReturns {
        gross_sales,
        returns,
        net_sales,
        result: calculate_commission(net_sales, bands, mode),
    }
}

/// The level band that would apply to the given sales, if any.
pub fn find_applicable_level_band(
    net_sales: Decimal,
    bands: &[CommissionBand],
) -> Option<&CommissionBand> {
    active_sorted(bands).into_iter().find(|band| covers(band, net_sales))
}

/// Commission at each sample amount, with the effective overall rate.
pub fn commission_preview(
    samples: &[Decimal],
    bands: &[CommissionBand],
    mode: CommissionMode,
) -> Vec<CommissionPreviewRow> {
    samples
        .iter()
        .map(|&sales| {
            let result = calculate_commission(sales, bands, mode);
            let effective_rate = if sales > Decimal::ZERO {
                (result.total_commission / sales * Decimal::ONE_HUNDRED).round_dp(2)
            } else {
                Decimal::ZERO
            };
            CommissionPreviewRow {
                sales,
                commission: result.total_commission,
                effective_rate,
            }
        })
        .collect()
}

/// Sample amounts used for preview tables when the caller supplies none.
pub fn default_preview_samples() -> Vec<Decimal> {
    [10_000, 25_000, 50_000, 100_000, 250_000]
        .into_iter()
        .map(Decimal::from)
        .collect()
}

fn active_sorted(bands: &[CommissionBand]) -> Vec<&CommissionBand> {
    let mut active: Vec<&CommissionBand> = bands.iter().filter(|band| band.is_active).collect();
    active.sort_by(|a, b| a.min_amount.cmp(&b.min_amount));
    active
}

// Half-open containment; an absent max means unbounded.
fn covers(band: &CommissionBand, net_sales: Decimal) -> bool {
    band.min_amount <= net_sales && band.max_amount.map_or(true, |max| net_sales < max)
}

fn slab_commission(net_sales: Decimal, bands: &[&CommissionBand]) -> CommissionResult {
    let mut breakdown = Vec::new();
    let mut total = Decimal::ZERO;

    for (i, band) in bands.iter().enumerate() {
        if net_sales > band.min_amount {
            let sales_in_slab = match band.max_amount {
                Some(max) if net_sales >= max => max - band.min_amount,
                _ => net_sales - band.min_amount,
            };
            let commission = (sales_in_slab * band.rate_pct / Decimal::ONE_HUNDRED).round_dp(2);
            total += commission;

            breakdown.push(CommissionBreakdown {
                slab_index: i,
                min_amount: band.min_amount,
                max_amount: band.max_amount,
                rate_pct: band.rate_pct,
                sales_in_slab,
                commission_from_slab: commission,
            });
        }

        // Later bands only matter while sales clear this band's cap
        match band.max_amount {
            Some(max) if net_sales >= max => {}
            _ => break,
        }
    }

    CommissionResult {
        total_commission: total.round_dp(2),
        breakdown,
        mode: CommissionMode::Slab,
        sales_base: net_sales,
    }
}

fn level_commission(net_sales: Decimal, bands: &[&CommissionBand]) -> CommissionResult {
    let applicable = bands.iter().copied().find(|band| covers(band, net_sales));

    let Some(band) = applicable else {
        return CommissionResult {
            total_commission: Decimal::ZERO,
            breakdown: Vec::new(),
            mode: CommissionMode::Level,
            sales_base: net_sales,
        };
    };

    let commission = (net_sales * band.rate_pct / Decimal::ONE_HUNDRED).round_dp(2);
    CommissionResult {
        total_commission: commission,
        breakdown: vec![CommissionBreakdown {
            slab_index: 0,
            min_amount: band.min_amount,
            max_amount: band.max_amount,
            rate_pct: band.rate_pct,
            sales_in_slab: net_sales,
            commission_from_slab: commission,
        }],
        mode: CommissionMode::Level,
        sales_base: net_sales,
    }
}
