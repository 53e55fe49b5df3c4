//! Core library for delivery-trip VAT billing and reconciliation.
//!
//! This crate provides:
//! - Remarks parsing (returns, damages and payments from delivery notes)
//! - VAT bill generation (combined cash/QR pools and individual bills)
//! - Bill validation against source order data
//! - Trip tally aggregation (warehouse unload guide)
//! - Tiered slab/level sales commission calculation

pub mod billing;
pub mod commission;
pub mod error;
pub mod models;
pub mod remarks;
pub mod tally;

pub use error::{Result, TripbillError};
pub use models::{
    BillItem, BillType, CommissionBand, CommissionMode, CommissionResult, DeliveryRow, Order,
    OrderItem, PaymentMethod, TripbillConfig, VatBill,
};
pub use billing::{generate_vat_bills, validate_bills, BillValidation, GeneratorOptions};
pub use commission::{
    calculate_commission, calculate_commission_with_returns, validate_level_bands,
    validate_slab_bands,
};
pub use remarks::{parse_remarks, ParsedRemarks};
pub use tally::{build_tally, summarize, ProductMatcher, TallyItem, TallyStatus, TieredMatcher};
