//! Forecast pipeline.
//!
//! Glues the dosing calculator, simulator and sampler together:
//! - Resolve ratios and the carb ratio to use
//! - Compute (or accept) the insulin dose
//! - Simulate in mg/dL, report in the caller's unit

use crate::config::ProfileConfig;
use crate::dosing::{calculate_dose, calculate_icr_and_isf};
use crate::units::{from_mg_dl, round1, to_mg_dl};
use crate::{
    sampler, simulate, BgTrajectory, BgUnit, CgmSample, DosingInput, DosingResult, Error,
    MealEstimate, Ratios, Result, SampleSummary, SimulationParams, Trend,
};
use serde::{Deserialize, Serialize};

/// What the caller hands over: a meal estimate plus the current reading.
///
/// Fields left out fall back to the profile.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(flatten)]
    pub meal: MealEstimate,

    /// Pins the administered dose instead of using the calculated one
    #[serde(default)]
    pub insulin_dose: Option<f64>,

    #[serde(default, rename = "currentBG")]
    pub current_bg: Option<f64>,

    #[serde(default)]
    pub bg_unit: Option<BgUnit>,

    #[serde(default)]
    pub trend: Trend,

    #[serde(default)]
    pub total_daily_dose: Option<f64>,

    #[serde(default)]
    pub carb_ratio: Option<f64>,

    #[serde(default)]
    pub correction_factor: Option<f64>,
}

/// The predicted curve in the display unit
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub current: f64,
    pub one_hour: f64,
    pub two_hours: f64,
    pub three_hours: f64,
    pub full_profile: Vec<f64>,
    /// Grams per unit, one decimal
    #[serde(rename = "ICR")]
    pub icr: f64,
    /// mg/dL per unit, one decimal
    #[serde(rename = "ISF")]
    pub isf: f64,
    pub samples: Vec<CgmSample>,
    pub summary: SampleSummary,
}

/// Everything produced for one meal
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub bg_unit: BgUnit,
    pub ratios: Ratios,
    pub carb_ratio: f64,
    /// Recommended dose breakdown
    pub dosing: DosingResult,
    /// Dose fed into the simulator
    pub insulin_dose: f64,
    /// Absent when there was no usable BG reading
    pub forecast: Option<Forecast>,
}

/// Run the whole pipeline for one meal
pub fn analyze(request: &ForecastRequest, profile: &ProfileConfig) -> Result<Analysis> {
    let profile = merge_profile(request, profile);
    profile.validate()?;

    let ratios = calculate_icr_and_isf(profile.total_daily_dose)?;
    let carb_ratio = profile.carb_ratio.unwrap_or(ratios.icr);
    let unit = profile.bg_unit;

    let dosing = calculate_dose(&DosingInput {
        carbs_grams: request.meal.carbs_grams,
        carb_ratio,
        current_bg: request.current_bg,
        correction_factor: profile.correction_factor,
        bg_unit: unit,
    })?;

    let insulin_dose = match request.insulin_dose {
        Some(dose) => {
            tracing::info!(
                "Using pinned dose {:.2} u (calculated {:.2} u)",
                dose,
                dosing.total_dose
            );
            dose
        }
        None => dosing.total_dose,
    };

    let current_bg_mg_dl = request
        .current_bg
        .map(|bg| to_mg_dl(bg, unit))
        .unwrap_or(f64::NAN);

    let params = SimulationParams::new(
        request.meal.carbs_grams,
        insulin_dose,
        current_bg_mg_dl,
        request.trend,
        profile.total_daily_dose,
    );

    let forecast = match simulate(&params)? {
        Some(trajectory) => Some(build_forecast(&trajectory, ratios, unit)?),
        None => {
            tracing::info!("No usable BG reading, forecast suppressed");
            None
        }
    };

    Ok(Analysis {
        bg_unit: unit,
        ratios,
        carb_ratio,
        dosing,
        insulin_dose,
        forecast,
    })
}

/// Request values take precedence over the stored profile
fn merge_profile(request: &ForecastRequest, profile: &ProfileConfig) -> ProfileConfig {
    ProfileConfig {
        total_daily_dose: request.total_daily_dose.unwrap_or(profile.total_daily_dose),
        correction_factor: request
            .correction_factor
            .unwrap_or(profile.correction_factor),
        carb_ratio: request.carb_ratio.or(profile.carb_ratio),
        bg_unit: request.bg_unit.unwrap_or(profile.bg_unit),
    }
}

fn build_forecast(trajectory: &BgTrajectory, ratios: Ratios, unit: BgUnit) -> Result<Forecast> {
    let checkpoint = |minute: u32| {
        trajectory
            .at_minute(minute)
            .map(|bg| from_mg_dl(bg, unit))
            .ok_or_else(|| Error::Other(format!("trajectory has no value at minute {}", minute)))
    };

    let samples = sampler::sample(trajectory, unit);
    let summary = sampler::summarize(&samples)
        .ok_or_else(|| Error::Other("trajectory produced no samples".into()))?;

    Ok(Forecast {
        current: checkpoint(0)?,
        one_hour: checkpoint(60)?,
        two_hours: checkpoint(120)?,
        three_hours: checkpoint(180)?,
        full_profile: trajectory
            .values()
            .iter()
            .map(|bg| from_mg_dl(*bg, unit))
            .collect(),
        icr: round1(ratios.icr),
        isf: round1(ratios.isf),
        samples,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(carbs: f64, bg: Option<f64>) -> ForecastRequest {
        ForecastRequest {
            meal: MealEstimate {
                food_name: Some("rice bowl".into()),
                carbs_grams: carbs,
                ..Default::default()
            },
            current_bg: bg,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_pipeline_mg_dl() {
        let analysis = analyze(&request(50.0, Some(150.0)), &ProfileConfig::default()).unwrap();

        // TDD 40 -> ICR 12.5, base 4.0 u
        assert_eq!(analysis.carb_ratio, 12.5);
        assert_eq!(analysis.dosing.base_dose, 4.0);
        assert!((analysis.dosing.correction_dose - 0.6624).abs() < 1e-3);
        assert_eq!(analysis.insulin_dose, analysis.dosing.total_dose);

        let forecast = analysis.forecast.unwrap();
        assert_eq!(forecast.current, 150.0);
        assert_eq!(forecast.full_profile.len(), 181);
        assert_eq!(forecast.one_hour, forecast.full_profile[60]);
        assert_eq!(forecast.three_hours, forecast.full_profile[180]);
        assert_eq!(forecast.icr, 12.5);
        assert_eq!(forecast.isf, 37.5);
        assert_eq!(forecast.samples.len(), 13);
    }

    #[test]
    fn test_ratios_rounded() {
        let mut req = request(30.0, Some(120.0));
        req.total_daily_dose = Some(33.0);
        let forecast = analyze(&req, &ProfileConfig::default())
            .unwrap()
            .forecast
            .unwrap();
        assert_eq!(forecast.icr, 15.2);
        assert_eq!(forecast.isf, 45.5);
    }

    #[test]
    fn test_mmol_request_matches_mg_dl() {
        let mg = analyze(&request(45.0, Some(162.0)), &ProfileConfig::default()).unwrap();

        let mut req = request(45.0, Some(162.0 / 18.0182));
        req.bg_unit = Some(BgUnit::MmolL);
        let mmol = analyze(&req, &ProfileConfig::default()).unwrap();

        let mg_forecast = mg.forecast.unwrap();
        let mmol_forecast = mmol.forecast.unwrap();
        assert!((mmol_forecast.current - 162.0 / 18.0182).abs() < 1e-9);
        assert!((mmol_forecast.three_hours * 18.0182 - mg_forecast.three_hours).abs() < 1e-6);
        assert_eq!(
            mmol_forecast.samples[8].bands,
            mg_forecast.samples[8].bands
        );
    }

    #[test]
    fn test_missing_bg_suppresses_forecast_only() {
        let analysis = analyze(&request(60.0, None), &ProfileConfig::default()).unwrap();
        assert!(analysis.forecast.is_none());
        assert_eq!(analysis.dosing.total_dose, 4.8);
    }

    #[test]
    fn test_pinned_dose() {
        let mut req = request(0.0, Some(150.0));
        req.insulin_dose = Some(5.0);
        let analysis = analyze(&req, &ProfileConfig::default()).unwrap();
        assert_eq!(analysis.insulin_dose, 5.0);
        let forecast = analysis.forecast.unwrap();
        assert!(forecast.one_hour < forecast.current);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut req = request(30.0, Some(120.0));
        req.total_daily_dose = Some(0.0);
        assert!(matches!(
            analyze(&req, &ProfileConfig::default()),
            Err(Error::InvalidParameter(_))
        ));

        let mut req = request(30.0, Some(120.0));
        req.carb_ratio = Some(-2.0);
        assert!(analyze(&req, &ProfileConfig::default()).is_err());
    }

    #[test]
    fn test_request_from_upstream_json() {
        let json = r#"{
            "foodName": "banana",
            "carbsGrams": 27,
            "insulinDose": 2.0,
            "currentBG": 6.5,
            "bgUnit": "mmol/L",
            "trend": "falling",
            "totalDailyDose": 45
        }"#;
        let req: ForecastRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.meal.food_name.as_deref(), Some("banana"));
        assert_eq!(req.meal.carbs_grams, 27.0);
        assert_eq!(req.current_bg, Some(6.5));
        assert_eq!(req.bg_unit, Some(BgUnit::MmolL));
        assert_eq!(req.trend, Trend::Falling);
    }

    #[test]
    fn test_output_field_names() {
        let analysis = analyze(&request(20.0, Some(110.0)), &ProfileConfig::default()).unwrap();
        let json = serde_json::to_value(analysis.forecast.unwrap()).unwrap();
        assert!(json.get("oneHour").is_some());
        assert!(json.get("fullProfile").is_some());
        assert!(json.get("ICR").is_some());
        assert!(json.get("ISF").is_some());
    }
}
