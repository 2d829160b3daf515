//! Insulin dosing arithmetic.
//!
//! Dosing policy:
//! 1. Base dose covers the meal: `carbs / carb_ratio`
//! 2. Correction dose brings BG back toward 7.0 mmol/L:
//!    `(bg_mmol - 7.0) / correction_factor` when BG is above target
//! 3. Below 80 mg/dL a flat 1.0 unit is taken off the total
//! 4. The total never goes below zero
//!
//! There is no upward "+1 unit when high" adjustment; the correction dose
//! already covers that case.

use crate::error::{require_non_negative, require_positive};
use crate::units::{to_mg_dl, to_mmol};
use crate::{BgUnit, DosingInput, DosingResult, Ratios, Result};

/// Numerator of the 500 rule
pub const ICR_RULE: f64 = 500.0;
/// Numerator of the 1500 rule
pub const ISF_RULE: f64 = 1500.0;
/// Correction target in mmol/L
pub const CORRECTION_TARGET_MMOL: f64 = 7.0;
/// Below this BG (mg/dL) the safety reduction kicks in
pub const LOW_BG_THRESHOLD_MGDL: f64 = 80.0;
/// Units removed from the total when BG is low
pub const SAFETY_REDUCTION_UNITS: f64 = 1.0;

/// Derive ICR and ISF from total daily dose
pub fn calculate_icr_and_isf(total_daily_dose: f64) -> Result<Ratios> {
    let tdd = require_positive("total daily dose", total_daily_dose)?;
    Ok(Ratios {
        icr: ICR_RULE / tdd,
        isf: ISF_RULE / tdd,
    })
}

/// Units needed to cover `carbs_grams`
pub fn base_dose(carbs_grams: f64, carb_ratio: f64) -> Result<f64> {
    let carbs = require_non_negative("carbs", carbs_grams)?;
    let ratio = require_positive("carb ratio", carb_ratio)?;
    Ok(carbs / ratio)
}

/// Correction units for a reading above 7.0 mmol/L
pub fn correction_dose(current_bg: f64, correction_factor: f64, unit: BgUnit) -> Result<f64> {
    let factor = require_positive("correction factor", correction_factor)?;
    let bg_mmol = to_mmol(current_bg, unit);
    if bg_mmol > CORRECTION_TARGET_MMOL {
        Ok((bg_mmol - CORRECTION_TARGET_MMOL) / factor)
    } else {
        Ok(0.0)
    }
}

/// Full dose calculation
pub fn calculate_dose(input: &DosingInput) -> Result<DosingResult> {
    let base = base_dose(input.carbs_grams, input.carb_ratio)?;
    require_positive("correction factor", input.correction_factor)?;

    // A missing or garbage reading means no correction and no clamp
    let bg = input.current_bg.filter(|bg| bg.is_finite());

    let correction = match bg {
        Some(bg) => correction_dose(bg, input.correction_factor, input.bg_unit)?,
        None => 0.0,
    };

    let safety = match bg {
        Some(bg) if to_mg_dl(bg, input.bg_unit) < LOW_BG_THRESHOLD_MGDL => {
            tracing::info!(
                "BG {} {} below {} mg/dL, reducing dose by {} u",
                bg,
                input.bg_unit,
                LOW_BG_THRESHOLD_MGDL,
                SAFETY_REDUCTION_UNITS
            );
            -SAFETY_REDUCTION_UNITS
        }
        _ => 0.0,
    };

    let total = (base + correction + safety).max(0.0);

    tracing::debug!(
        "Dose: base {:.2} + correction {:.2} + safety {:.2} = {:.2}",
        base,
        correction,
        safety,
        total
    );

    Ok(DosingResult {
        base_dose: base,
        correction_dose: correction,
        safety_adjustment: safety,
        total_dose: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn input(carbs: f64, bg: Option<f64>, unit: BgUnit) -> DosingInput {
        DosingInput {
            carbs_grams: carbs,
            carb_ratio: 10.0,
            current_bg: bg,
            correction_factor: 2.0,
            bg_unit: unit,
        }
    }

    #[test]
    fn test_ratios_from_tdd() {
        let ratios = calculate_icr_and_isf(40.0).unwrap();
        assert_eq!(ratios.icr, 12.5);
        assert_eq!(ratios.isf, 37.5);
    }

    #[test]
    fn test_isf_is_three_times_icr() {
        for tdd in [5.0, 17.3, 40.0, 66.6, 120.0] {
            let ratios = calculate_icr_and_isf(tdd).unwrap();
            assert!((ratios.isf - 3.0 * ratios.icr).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rejects_non_positive_tdd() {
        assert!(matches!(
            calculate_icr_and_isf(0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(calculate_icr_and_isf(-10.0).is_err());
        assert!(calculate_icr_and_isf(f64::NAN).is_err());
    }

    #[test]
    fn test_meal_with_high_reading() {
        let result = calculate_dose(&input(50.0, Some(150.0), BgUnit::MgDl)).unwrap();
        assert_eq!(result.base_dose, 5.0);
        assert!((result.correction_dose - 0.6624).abs() < 1e-3);
        assert_eq!(result.safety_adjustment, 0.0);
        assert!((result.total_dose - 5.6624).abs() < 1e-3);
    }

    #[test]
    fn test_same_reading_in_mmol() {
        let mg = calculate_dose(&input(50.0, Some(150.0), BgUnit::MgDl)).unwrap();
        let mmol =
            calculate_dose(&input(50.0, Some(150.0 / 18.0182), BgUnit::MmolL)).unwrap();
        assert!((mg.total_dose - mmol.total_dose).abs() < 1e-9);
    }

    #[test]
    fn test_no_correction_at_or_below_target() {
        assert_eq!(correction_dose(7.0, 2.0, BgUnit::MmolL).unwrap(), 0.0);
        assert_eq!(correction_dose(110.0, 2.0, BgUnit::MgDl).unwrap(), 0.0);
    }

    #[test]
    fn test_low_reading_reduces_dose() {
        let result = calculate_dose(&input(30.0, Some(75.0), BgUnit::MgDl)).unwrap();
        assert_eq!(result.safety_adjustment, -1.0);
        assert!((result.total_dose - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_threshold_converted_for_mmol() {
        // 4.0 mmol/L is ~72 mg/dL
        let result = calculate_dose(&input(30.0, Some(4.0), BgUnit::MmolL)).unwrap();
        assert_eq!(result.safety_adjustment, -1.0);

        // 5.0 mmol/L is ~90 mg/dL, no clamp even though 5.0 < 80
        let result = calculate_dose(&input(30.0, Some(5.0), BgUnit::MmolL)).unwrap();
        assert_eq!(result.safety_adjustment, 0.0);
    }

    #[test]
    fn test_total_floored_at_zero() {
        let result = calculate_dose(&input(5.0, Some(60.0), BgUnit::MgDl)).unwrap();
        assert_eq!(result.base_dose, 0.5);
        assert_eq!(result.total_dose, 0.0);
    }

    #[test]
    fn test_missing_reading_uses_base_only() {
        let result = calculate_dose(&input(45.0, None, BgUnit::MgDl)).unwrap();
        assert_eq!(result.total_dose, 4.5);

        let result = calculate_dose(&input(45.0, Some(f64::NAN), BgUnit::MgDl)).unwrap();
        assert_eq!(result.total_dose, 4.5);
    }

    #[test]
    fn test_rejects_bad_ratio_and_factor() {
        let mut bad = input(50.0, Some(150.0), BgUnit::MgDl);
        bad.carb_ratio = 0.0;
        assert!(matches!(calculate_dose(&bad), Err(Error::InvalidParameter(_))));

        let mut bad = input(50.0, None, BgUnit::MgDl);
        bad.correction_factor = -1.0;
        assert!(matches!(calculate_dose(&bad), Err(Error::InvalidParameter(_))));
    }
}
