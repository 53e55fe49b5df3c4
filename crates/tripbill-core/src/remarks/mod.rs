//! Canonical parser for delivery remarks.
//!
//! The delivery flow appends semi-structured sections to an order's free-text
//! remarks, e.g.:
//!
//! ```text
//! Collected ₹1200 | Returns: Milk 500ml(2), Curd(1) | Damages: Paneer(1) - crushed
//! ```
//!
//! This module is the single place that text is interpreted; the resolver,
//! validator and tally all consume [`ParsedRemarks`] rather than re-matching
//! the string themselves. Parsing is best-effort: absent sections and
//! malformed tokens degrade to empty results, never errors.

pub mod patterns;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use patterns::{
    DAMAGE_ITEM, DAMAGES_SECTION, PAYMENT_ENTRY, PAYMENTS_SECTION, RETURN_ITEM, RETURNS_SECTION,
};

/// Structured view of a remarks string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRemarks {
    /// Returned quantity per product name.
    pub returns: BTreeMap<String, Decimal>,

    /// Damaged quantity per product name.
    pub damages: BTreeMap<String, Decimal>,

    /// Damage reason per product name, when one was written.
    pub damage_reasons: BTreeMap<String, String>,

    /// Collected amount per payment method (split-payment deliveries).
    pub payments: BTreeMap<String, Decimal>,
}

impl ParsedRemarks {
    /// Whether no section produced any data.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty() && self.damages.is_empty() && self.payments.is_empty()
    }

    /// Returned quantity for a product, zero when absent.
    pub fn returned(&self, name: &str) -> Decimal {
        self.returns.get(name).copied().unwrap_or(Decimal::ZERO)
    }

    /// Damaged quantity for a product, zero when absent.
    pub fn damaged(&self, name: &str) -> Decimal {
        self.damages.get(name).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Parse the Returns/Damages/Payments sections out of a remarks string.
///
/// Pure and idempotent; the same input always yields the same result.
pub fn parse_remarks(remarks: &str) -> ParsedRemarks {
    let mut parsed = ParsedRemarks::default();

    if let Some(caps) = RETURNS_SECTION.captures(remarks) {
        for item in RETURN_ITEM.captures_iter(&caps[1]) {
            let name = trim_token(&item[1]);
            if name.is_empty() {
                continue;
            }
            let qty: Decimal = item[2].parse().unwrap_or(Decimal::ZERO);
            *parsed
                .returns
                .entry(name.to_string())
                .or_insert(Decimal::ZERO) += qty;
        }
    }

    if let Some(caps) = DAMAGES_SECTION.captures(remarks) {
        for item in DAMAGE_ITEM.captures_iter(&caps[1]) {
            let name = trim_token(&item[1]);
            if name.is_empty() {
                continue;
            }
            let qty: Decimal = item[2].parse().unwrap_or(Decimal::ZERO);
            *parsed
                .damages
                .entry(name.to_string())
                .or_insert(Decimal::ZERO) += qty;

            if let Some(reason) = item.get(3) {
                let reason = reason.as_str().trim();
                if !reason.is_empty() {
                    parsed
                        .damage_reasons
                        .insert(name.to_string(), reason.to_string());
                }
            }
        }
    }

    if let Some(caps) = PAYMENTS_SECTION.captures(remarks) {
        for entry in PAYMENT_ENTRY.captures_iter(&caps[1]) {
            if let Ok(amount) = entry[2].parse::<Decimal>() {
                *parsed
                    .payments
                    .entry(entry[1].to_lowercase())
                    .or_insert(Decimal::ZERO) += amount;
            }
        }
    }

    parsed
}

/// Strip the whitespace and separator commas a permissive token match drags in.
fn trim_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == ',')
}
