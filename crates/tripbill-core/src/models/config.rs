//! Configuration structures for billing and output defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripbillError};

/// Main configuration for the tripbill pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TripbillConfig {
    /// Billing configuration.
    pub billing: BillingConfig,

    /// CLI output defaults.
    pub output: OutputConfig,
}

impl Default for TripbillConfig {
    fn default() -> Self {
        Self {
            billing: BillingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Billing constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// VAT rate as a fraction (0.13 = 13%).
    pub vat_rate: Decimal,

    /// Cumulative collected-amount cap for a combined bill pool.
    pub combine_threshold: Decimal,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            vat_rate: Decimal::new(13, 2),
            combine_threshold: Decimal::from(50_000),
        }
    }
}

/// Output defaults for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (text, json or csv).
    pub format: String,

    /// Whether text output lists bill items.
    pub show_items: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            show_items: true,
        }
    }
}

impl TripbillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations the billing math cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.billing.vat_rate < Decimal::ZERO || self.billing.vat_rate >= Decimal::ONE {
            return Err(TripbillError::Config(format!(
                "vat_rate must be a fraction in [0, 1), got {}",
                self.billing.vat_rate
            )));
        }
        if self.billing.combine_threshold <= Decimal::ZERO {
            return Err(TripbillError::Config(format!(
                "combine_threshold must be positive, got {}",
                self.billing.combine_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TripbillConfig::default();
        assert_eq!(config.billing.vat_rate, Decimal::new(13, 2));
        assert_eq!(config.billing.combine_threshold, Decimal::from(50_000));
        assert_eq!(config.output.format, "text");
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: TripbillConfig =
            serde_json::from_str(r#"{"billing": {"vat_rate": "0.15"}}"#).unwrap();
        assert_eq!(config.billing.vat_rate, Decimal::new(15, 2));
        assert_eq!(config.billing.combine_threshold, Decimal::from(50_000));
    }

    #[test]
    fn test_validate_rejects_bad_vat_rate() {
        let mut config = TripbillConfig::default();
        config.billing.vat_rate = Decimal::from(13);
        assert!(config.validate().is_err());
    }
}
