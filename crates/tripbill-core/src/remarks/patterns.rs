//! Regex patterns for delivery remarks extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Section markers written by the delivery flow; each section runs
    // until the next pipe separator
    pub static ref RETURNS_SECTION: Regex = Regex::new(
        r"Returns:\s*([^|]+)"
    ).unwrap();

    pub static ref DAMAGES_SECTION: Regex = Regex::new(
        r"Damages:\s*([^|]+)"
    ).unwrap();

    pub static ref PAYMENTS_SECTION: Regex = Regex::new(
        r"Payments:\s*([^|]+)"
    ).unwrap();

    // Item tokens: "Name(qty)", comma separated
    pub static ref RETURN_ITEM: Regex = Regex::new(
        r"([^(]+)\((\d+)\)"
    ).unwrap();

    // Damage tokens may carry a "- reason" suffix
    pub static ref DAMAGE_ITEM: Regex = Regex::new(
        r"([^(]+)\((\d+)\)\s*(?:-\s*([^,]+))?"
    ).unwrap();

    // Payment entries: "cash: ₹1200" or "qr: 800.50"
    pub static ref PAYMENT_ENTRY: Regex = Regex::new(
        r"(\w+):\s*₹?\s*(\d+(?:\.\d+)?)"
    ).unwrap();
}
