//! Tax-inclusive/exclusive amount math.
//!
//! Order rates and collected cash are tax-inclusive; bills need the pre-tax
//! view. The rate is a fraction (0.13 = 13%).

use rust_decimal::Decimal;

/// Calculate the VAT charged on a net (pre-tax) amount.
pub fn calculate_vat(net: Decimal, rate: Decimal) -> Decimal {
    net * rate
}

/// Calculate the gross (tax-inclusive) amount from a net amount.
pub fn calculate_gross(net: Decimal, rate: Decimal) -> Decimal {
    net + calculate_vat(net, rate)
}

/// Back-compute the net (pre-tax) amount from a tax-inclusive amount.
pub fn net_from_gross(gross: Decimal, rate: Decimal) -> Decimal {
    let divisor = Decimal::ONE + rate;
    if divisor.is_zero() {
        gross
    } else {
        gross / divisor
    }
}

/// Taxable base and VAT share of a collected (tax-inclusive) amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VatSplit {
    /// Pre-tax base, rounded to 2 decimal places.
    pub taxable: Decimal,

    /// VAT share; the exact complement so `taxable + vat == collected`.
    pub vat: Decimal,
}

/// Split collected cash into taxable base and VAT.
pub fn split_collected(collected: Decimal, rate: Decimal) -> VatSplit {
    let taxable = net_from_gross(collected, rate).round_dp(2);
    VatSplit {
        taxable,
        vat: collected - taxable,
    }
}
