//! Band table validation.
//!
//! Slab tables must not overlap (contiguous boundaries are fine); level
//! tables must start at zero and cover sales contiguously, with the last
//! band ideally unbounded. Only active bands are checked.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::CommissionBand;

/// Validation outcome for a band table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandValidation {
    /// True when no errors were found. Warnings do not invalidate.
    pub is_valid: bool,

    /// Findings that make the table unusable in its mode.
    pub errors: Vec<String>,

    /// Findings worth a look.
    pub warnings: Vec<String>,
}

impl BandValidation {
    fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validate a slab table: no pair of active bands may overlap.
pub fn validate_slab_bands(bands: &[CommissionBand]) -> BandValidation {
    let active: Vec<&CommissionBand> = bands.iter().filter(|band| band.is_active).collect();
    let mut errors = Vec::new();

    for (i, first) in active.iter().enumerate() {
        for second in &active[i + 1..] {
            if bands_overlap(first, second) {
                errors.push(format!(
                    "Bands overlap: \"{}\" ({}) and \"{}\" ({})",
                    first.name,
                    first.range_label(),
                    second.name,
                    second.range_label()
                ));
            }
        }
    }

    BandValidation::new(errors, Vec::new())
}

/// Validate a level table: starts at 0, contiguous, last band unbounded.
pub fn validate_level_bands(bands: &[CommissionBand]) -> BandValidation {
    let mut active: Vec<&CommissionBand> = bands.iter().filter(|band| band.is_active).collect();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if active.is_empty() {
        errors.push("At least one level band is required".to_string());
        return BandValidation::new(errors, warnings);
    }

    active.sort_by(|a, b| a.min_amount.cmp(&b.min_amount));

    if !active[0].min_amount.is_zero() {
        errors.push(format!(
            "First level band must start at 0, got {}",
            active[0].min_amount
        ));
    }

    for (i, pair) in active.windows(2).enumerate() {
        let (current, next) = (pair[0], pair[1]);
        match current.max_amount {
            None => errors.push(format!(
                "Level band \"{}\" has no max but is not the last band",
                current.name
            )),
            Some(max) if max != next.min_amount => errors.push(format!(
                "Gap or overlap between bands {} and {}: band {} ends at {}, band {} starts at {}",
                i,
                i + 1,
                i,
                max,
                i + 1,
                next.min_amount
            )),
            Some(_) => {}
        }
    }

    if let Some(last) = active.last() {
        if last.max_amount.is_some() {
            warnings.push(format!(
                "Last level band \"{}\" should have no maximum. Consider updating to allow unlimited sales.",
                last.name
            ));
        }
    }

    BandValidation::new(errors, warnings)
}

/// Validate a single band's own figures.
pub fn validate_band(band: &CommissionBand) -> Option<String> {
    if band.rate_pct < Decimal::ZERO || band.rate_pct > Decimal::ONE_HUNDRED {
        return Some(format!("Rate must be 0-100%, got {}%", band.rate_pct));
    }

    if band.min_amount < Decimal::ZERO {
        return Some("Minimum amount cannot be negative".to_string());
    }

    if let Some(max) = band.max_amount {
        if max < band.min_amount {
            return Some(format!(
                "Maximum ({}) must be >= minimum ({})",
                max, band.min_amount
            ));
        }
    }

    None
}

// Contiguous boundaries (max1 == min2) do not overlap.
fn bands_overlap(first: &CommissionBand, second: &CommissionBand) -> bool {
    let clears_second = first.max_amount.map_or(true, |max| max > second.min_amount);
    let clears_first = second.max_amount.map_or(true, |max| max > first.min_amount);
    clears_second && clears_first
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn band(name: &str, min: i64, max: Option<i64>, rate: i64) -> CommissionBand {
        CommissionBand {
            name: name.to_string(),
            min_amount: Decimal::from(min),
            max_amount: max.map(Decimal::from),
            rate_pct: Decimal::from(rate),
            is_active: true,
        }
    }

    fn standard_bands() -> Vec<CommissionBand> {
        vec![
            band("0-10k", 0, Some(10_000), 5),
            band("10-50k", 10_000, Some(50_000), 7),
            band("50k+", 50_000, None, 10),
        ]
    }

    #[test]
    fn test_contiguous_slab_bands_are_valid() {
        let report = validate_slab_bands(&standard_bands());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_overlapping_slab_bands_are_flagged() {
        let mut bands = standard_bands();
        bands[2].min_amount = Decimal::from(40_000);

        let report = validate_slab_bands(&bands);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0],
            "Bands overlap: \"10-50k\" (10000-50000) and \"50k+\" (40000-∞)"
        );
    }

    #[test]
    fn test_band_overlapping_two_others_yields_two_errors() {
        let bands = vec![
            band("0-10k", 0, Some(10_000), 5),
            band("10-50k", 10_000, Some(50_000), 7),
            band("9-15k", 9000, Some(15_000), 8),
        ];

        let report = validate_slab_bands(&bands);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(
            report.errors[0],
            "Bands overlap: \"0-10k\" (0-10000) and \"9-15k\" (9000-15000)"
        );
        assert_eq!(
            report.errors[1],
            "Bands overlap: \"10-50k\" (10000-50000) and \"9-15k\" (9000-15000)"
        );
    }

    #[test]
    fn test_inactive_bands_are_excluded_from_overlap_checks() {
        let mut bands = standard_bands();
        bands[2].min_amount = Decimal::from(40_000);
        bands[2].is_active = false;

        let report = validate_slab_bands(&bands);
        assert!(report.is_valid);
    }

    #[test]
    fn test_proper_level_bands_are_valid() {
        let report = validate_level_bands(&standard_bands());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_level_bands_must_start_at_zero() {
        let mut bands = standard_bands();
        bands[0].min_amount = Decimal::from(1000);

        let report = validate_level_bands(&bands);
        assert!(!report.is_valid);
        assert_eq!(report.errors[0], "First level band must start at 0, got 1000");
    }

    #[test]
    fn test_level_band_gaps_are_flagged() {
        let mut bands = standard_bands();
        bands[1].min_amount = Decimal::from(15_000);

        let report = validate_level_bands(&bands);
        assert!(!report.is_valid);
        assert_eq!(
            report.errors[0],
            "Gap or overlap between bands 0 and 1: band 0 ends at 10000, band 1 starts at 15000"
        );
    }

    #[test]
    fn test_level_bands_require_at_least_one() {
        let report = validate_level_bands(&[]);
        assert!(!report.is_valid);
        assert_eq!(report.errors[0], "At least one level band is required");
    }

    #[test]
    fn test_unbounded_middle_level_band_is_an_error() {
        let bands = vec![
            band("0-10k", 0, None, 5),
            band("10k+", 10_000, None, 7),
        ];

        let report = validate_level_bands(&bands);
        assert_eq!(
            report.errors[0],
            "Level band \"0-10k\" has no max but is not the last band"
        );
    }

    #[test]
    fn test_bounded_last_level_band_warns() {
        let bands = vec![
            band("0-10k", 0, Some(10_000), 5),
            band("10-50k", 10_000, Some(50_000), 7),
        ];

        let report = validate_level_bands(&bands);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("should have no maximum"));
    }

    #[test]
    fn test_validate_band_checks_rate_range() {
        let mut sample = band("test", 0, Some(10_000), 150);
        assert_eq!(
            validate_band(&sample).as_deref(),
            Some("Rate must be 0-100%, got 150%")
        );

        sample.rate_pct = Decimal::from(5);
        assert_eq!(validate_band(&sample), None);
    }

    #[test]
    fn test_validate_band_rejects_negative_minimum() {
        let sample = band("test", -1000, Some(10_000), 5);
        assert_eq!(
            validate_band(&sample).as_deref(),
            Some("Minimum amount cannot be negative")
        );
    }

    #[test]
    fn test_validate_band_rejects_inverted_bounds() {
        let sample = band("test", 10_000, Some(5000), 5);
        assert_eq!(
            validate_band(&sample).as_deref(),
            Some("Maximum (5000) must be >= minimum (10000)")
        );
    }
}
