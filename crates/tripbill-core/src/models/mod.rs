//! Data models for delivery rows, generated bills, commissions and
//! configuration.

pub mod bill;
pub mod commission;
pub mod config;
pub mod order;

pub use bill::{BillItem, BillType, VatBill};
pub use commission::{
    CommissionBand, CommissionBreakdown, CommissionMode, CommissionPreviewRow, CommissionResult,
    CommissionWithReturns,
};
pub use config::{BillingConfig, OutputConfig, TripbillConfig};
pub use order::{DeliveryRow, Order, OrderItem, PaymentMethod, is_unbilled_status};

use std::path::Path;

use crate::error::Result;

/// Load delivery report rows from a JSON file.
pub fn load_rows(path: &Path) -> Result<Vec<DeliveryRow>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a commission band table from a JSON file.
pub fn load_bands(path: &Path) -> Result<Vec<CommissionBand>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
