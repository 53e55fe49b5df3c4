//! VAT billing pipeline: delivered-quantity resolution, bill generation
//! and post-generation validation.

pub mod generator;
pub mod resolver;
pub mod validator;
pub mod vat;

pub use generator::{generate_vat_bills, GeneratorOptions};
pub use resolver::{delivered_items, delivered_qty};
pub use validator::{validate_bill, validate_bills, BillValidation, ValidationDetails};
pub use vat::{calculate_gross, calculate_vat, net_from_gross, split_collected, VatSplit};
