//! Forward BG simulation.
//!
//! Builds per-step carb and insulin effect profiles from the kernels and
//! integrates a BG trajectory over the horizon:
//!
//! ```text
//! bg[i] = max(50, bg[i-1]
//!                 + (ISF / ICR) · carb[i-1]
//!                 - ISF · insulin[i-1]
//!                 - k · (bg[i-1] - 100) · dt
//!                 + trend_slope · dt        (first 10 minutes only))
//! ```
//!
//! All values are mg/dL. The run is a pure function of its parameters.

use crate::error::{require_non_negative, require_positive};
use crate::kernels::{
    gamma_kernel, normalized_insulin_kernel, TAU_CARB, TAU_INSULIN_DURATION, TAU_INSULIN_ONSET,
};
use crate::{BgTrajectory, Error, Result, SimulationParams};

/// Baseline drift rate toward target (per minute)
pub const DRIFT_RATE: f64 = 0.001;
/// Baseline the drift pulls toward (mg/dL)
pub const TARGET_BG_MGDL: f64 = 100.0;
/// Initial trend slope magnitude (mg/dL per minute)
pub const TREND_SLOPE: f64 = 2.0;
/// How long the initial trend keeps acting (minutes)
pub const TREND_WINDOW_MINUTES: u32 = 10;
/// Modeling floor, the simulator never reports anything lower (mg/dL)
pub const BG_FLOOR_MGDL: f64 = 50.0;
pub const DEFAULT_HORIZON_MINUTES: u32 = 180;
pub const DEFAULT_STEP_MINUTES: u32 = 1;
/// Longest horizon a single run may cover (one day)
pub const MAX_HORIZON_MINUTES: u32 = 24 * 60;

/// Run a simulation.
///
/// Returns `Ok(None)` when `current_bg` is not a finite number: there is
/// not enough data to predict anything. Invalid parameters (non-positive
/// TDD, negative carbs or dose, bad horizon/step, horizon over
/// [`MAX_HORIZON_MINUTES`]) are errors.
///
/// The 50 mg/dL floor also applies to element 0, so a `current_bg` below 50
/// comes back as 50 and the trajectory's first value can differ from the
/// input.
pub fn simulate(params: &SimulationParams) -> Result<Option<BgTrajectory>> {
    validate(params)?;

    if !params.current_bg.is_finite() {
        tracing::debug!("Current BG {} is not usable, skipping simulation", params.current_bg);
        return Ok(None);
    }

    let ratios = crate::dosing::calculate_icr_and_isf(params.total_daily_dose)?;
    let steps = (params.horizon_minutes / params.step_minutes) as usize;
    let dt = params.step_minutes as f64;

    let carb_profile = carb_profile(params.carbs_grams, steps, dt);
    let insulin_profile = insulin_profile(params.insulin_dose, steps, dt);

    let carb_gain = ratios.isf / ratios.icr;
    let slope = params.trend.slope();

    let mut values = Vec::with_capacity(steps + 1);
    values.push(params.current_bg.max(BG_FLOOR_MGDL));

    for i in 1..=steps {
        let prev = values[i - 1];
        let carb_effect = carb_gain * carb_profile[i - 1];
        let insulin_effect = ratios.isf * insulin_profile[i - 1];
        let drift = -DRIFT_RATE * (prev - TARGET_BG_MGDL) * dt;
        let trend_effect = if i as u32 * params.step_minutes <= TREND_WINDOW_MINUTES {
            slope * dt
        } else {
            0.0
        };

        let next = prev + carb_effect - insulin_effect + drift + trend_effect;
        values.push(next.max(BG_FLOOR_MGDL));
    }

    tracing::debug!(
        "Simulated {} steps: {:.1} -> {:.1} mg/dL (carbs {} g, dose {} u, {})",
        steps,
        values[0],
        values[steps],
        params.carbs_grams,
        params.insulin_dose,
        params.trend
    );

    Ok(Some(BgTrajectory::new(values, params.step_minutes)))
}

/// Grams absorbed in each step
fn carb_profile(carbs_grams: f64, steps: usize, dt: f64) -> Vec<f64> {
    (0..steps)
        .map(|i| carbs_grams * gamma_kernel(i as f64 * dt, TAU_CARB) * dt)
        .collect()
}

/// Insulin units acting in each step
fn insulin_profile(dose: f64, steps: usize, dt: f64) -> Vec<f64> {
    (0..steps)
        .map(|i| {
            dose * normalized_insulin_kernel(i as f64 * dt, TAU_INSULIN_ONSET, TAU_INSULIN_DURATION)
                * dt
        })
        .collect()
}

fn validate(params: &SimulationParams) -> Result<()> {
    require_non_negative("carbs", params.carbs_grams)?;
    require_non_negative("insulin dose", params.insulin_dose)?;
    require_positive("total daily dose", params.total_daily_dose)?;

    if params.step_minutes == 0 || params.horizon_minutes == 0 {
        return Err(Error::InvalidParameter(
            "horizon and step must be at least one minute".into(),
        ));
    }
    if params.horizon_minutes > MAX_HORIZON_MINUTES {
        return Err(Error::InvalidParameter(format!(
            "horizon {} exceeds the {} minute limit",
            params.horizon_minutes, MAX_HORIZON_MINUTES
        )));
    }
    if params.horizon_minutes % params.step_minutes != 0 {
        return Err(Error::InvalidParameter(format!(
            "horizon {} is not a multiple of step {}",
            params.horizon_minutes, params.step_minutes
        )));
    }
    Ok(())
}
