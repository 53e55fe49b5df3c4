//! Commission band tables and calculation results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Calculation mode for a band table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionMode {
    /// Progressive: each band earns on the slice of sales inside it.
    Slab,
    /// Bracketed: the single containing band's rate applies to all sales.
    Level,
}

impl CommissionMode {
    /// Lowercase string form.
    pub fn as_str(&self) -> &str {
        match self {
            CommissionMode::Slab => "slab",
            CommissionMode::Level => "level",
        }
    }
}

/// One commission band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionBand {
    /// Display name, used in validation messages.
    pub name: String,

    /// Inclusive lower bound.
    pub min_amount: Decimal,

    /// Exclusive upper bound; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,

    /// Commission percentage (0-100).
    pub rate_pct: Decimal,

    /// Inactive bands are ignored by the calculator.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CommissionBand {
    /// Range label for messages, e.g. `0-10000` or `50000-∞`.
    pub fn range_label(&self) -> String {
        match self.max_amount {
            Some(max) => format!("{}-{}", self.min_amount, max),
            None => format!("{}-∞", self.min_amount),
        }
    }
}

/// Sales attributed to one band during a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    /// Index of the band in the sorted active table.
    pub slab_index: usize,

    /// Band lower bound.
    pub min_amount: Decimal,

    /// Band upper bound; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,

    /// Band rate percentage.
    pub rate_pct: Decimal,

    /// Sales attributed to this band.
    pub sales_in_slab: Decimal,

    /// Commission earned from this band, rounded to 2 decimal places.
    pub commission_from_slab: Decimal,
}

/// Result of a commission calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionResult {
    /// Total commission, rounded to 2 decimal places.
    pub total_commission: Decimal,

    /// Per-band attribution (empty when nothing was earned).
    pub breakdown: Vec<CommissionBreakdown>,

    /// Mode the calculation ran in.
    pub mode: CommissionMode,

    /// Net sales the calculation was based on.
    pub sales_base: Decimal,
}

/// Commission result augmented with the gross/returns derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionWithReturns {
    /// Gross sales before returns (after clamping).
    pub gross_sales: Decimal,

    /// Returns deducted (after clamping).
    pub returns: Decimal,

    /// Net sales the commission was computed on.
    pub net_sales: Decimal,

    /// The underlying calculation result.
    #[serde(flatten)]
    pub result: CommissionResult,
}

/// One sample point of a commission preview table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionPreviewRow {
    /// Sample sales amount.
    pub sales: Decimal,

    /// Commission at that amount.
    pub commission: Decimal,

    /// Effective rate percentage (2 decimal places).
    pub effective_rate: Decimal,
}
