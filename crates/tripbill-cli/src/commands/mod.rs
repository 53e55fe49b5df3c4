//! CLI command implementations.

pub mod bills;
pub mod commission;
pub mod config;
pub mod tally;
pub mod validate;
