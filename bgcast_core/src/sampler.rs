//! CGM-style presentation of a simulated trajectory.
//!
//! Picks one point every 15 minutes and tags it with clinical bands.
//! Classification always happens on the mg/dL value; only the reported
//! number is converted to the display unit.

use crate::units::from_mg_dl;
use crate::{BandFlags, BgTrajectory, BgUnit, CgmSample, SampleSummary};

pub const SAMPLE_STRIDE_MINUTES: u32 = 15;
pub const CRITICAL_LOW_MGDL: f64 = 55.0;
pub const LOW_MGDL: f64 = 70.0;
pub const HIGH_MGDL: f64 = 180.0;
pub const CRITICAL_HIGH_MGDL: f64 = 250.0;

/// Band flags for a single mg/dL value
pub fn classify(bg_mg_dl: f64) -> BandFlags {
    BandFlags {
        is_critical_low: bg_mg_dl < CRITICAL_LOW_MGDL,
        is_low: bg_mg_dl < LOW_MGDL,
        is_target: (LOW_MGDL..=HIGH_MGDL).contains(&bg_mg_dl),
        is_high: bg_mg_dl > HIGH_MGDL,
        is_critical_high: bg_mg_dl > CRITICAL_HIGH_MGDL,
    }
}

/// Resample at 15 minute strides (minute 0, 15, ..., horizon)
pub fn sample(trajectory: &BgTrajectory, unit: BgUnit) -> Vec<CgmSample> {
    (0..=trajectory.horizon_minutes())
        .step_by(SAMPLE_STRIDE_MINUTES as usize)
        .filter_map(|minute| {
            trajectory.at_minute(minute).map(|bg| CgmSample {
                minute_offset: minute,
                bg: from_mg_dl(bg, unit),
                bands: classify(bg),
            })
        })
        .collect()
}

/// Checkpoint values and extremes over the sampled series
pub fn summarize(samples: &[CgmSample]) -> Option<SampleSummary> {
    if samples.is_empty() {
        return None;
    }

    let at = |minute: u32| {
        samples
            .iter()
            .find(|s| s.minute_offset == minute)
            .map(|s| s.bg)
    };

    let min = samples.iter().map(|s| s.bg).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.bg).fold(f64::NEG_INFINITY, f64::max);

    Some(SampleSummary {
        at_60: at(60),
        at_120: at(120),
        at_180: at(180),
        min,
        max,
    })
}
