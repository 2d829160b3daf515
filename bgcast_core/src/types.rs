//! Core domain types for the bgcast forecasting system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Units, trends and clinical bands
//! - Dosing inputs and results
//! - Simulation parameters and trajectories
//! - Meal estimates from the upstream nutrition pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Units and Trends
// ============================================================================

/// Blood glucose display unit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BgUnit {
    #[default]
    #[serde(rename = "mg/dL", alias = "mgdl", alias = "mg_dl")]
    MgDl,
    #[serde(rename = "mmol/L", alias = "mmol", alias = "mmol_l")]
    MmolL,
}

impl fmt::Display for BgUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BgUnit::MgDl => write!(f, "mg/dL"),
            BgUnit::MmolL => write!(f, "mmol/L"),
        }
    }
}

impl FromStr for BgUnit {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().replace(['/', '_', ' '], "").as_str() {
            "mgdl" => Ok(BgUnit::MgDl),
            "mmoll" | "mmol" => Ok(BgUnit::MmolL),
            _ => Err(crate::Error::InvalidParameter(format!(
                "unknown BG unit: {}",
                s
            ))),
        }
    }
}

/// Direction the current BG reading is moving in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    #[default]
    Stable,
    Falling,
}

impl Trend {
    /// Initial slope in mg/dL per minute
    pub fn slope(self) -> f64 {
        match self {
            Trend::Rising => crate::simulator::TREND_SLOPE,
            Trend::Stable => 0.0,
            Trend::Falling => -crate::simulator::TREND_SLOPE,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "rising"),
            Trend::Stable => write!(f, "stable"),
            Trend::Falling => write!(f, "falling"),
        }
    }
}

impl FromStr for Trend {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "rising" | "up" => Ok(Trend::Rising),
            "stable" | "flat" => Ok(Trend::Stable),
            "falling" | "down" => Ok(Trend::Falling),
            _ => Err(crate::Error::InvalidParameter(format!(
                "unknown trend: {}",
                s
            ))),
        }
    }
}

// ============================================================================
// Dosing Types
// ============================================================================

/// Insulin-to-carb ratio and insulin sensitivity factor derived from TDD
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ratios {
    /// Grams of carbohydrate covered by one unit
    pub icr: f64,
    /// mg/dL drop per unit
    pub isf: f64,
}

/// Inputs to the dosing calculator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DosingInput {
    pub carbs_grams: f64,
    /// Grams covered per unit, must be > 0
    pub carb_ratio: f64,
    pub current_bg: Option<f64>,
    /// mmol/L drop per unit, must be > 0
    pub correction_factor: f64,
    pub bg_unit: BgUnit,
}

/// Breakdown of a computed insulin dose
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DosingResult {
    pub base_dose: f64,
    pub correction_dose: f64,
    /// Zero or negative
    pub safety_adjustment: f64,
    pub total_dose: f64,
}

// ============================================================================
// Simulation Types
// ============================================================================

/// Parameters for a single forward simulation.
///
/// `current_bg` is always in mg/dL here; unit conversion happens before the
/// simulator is reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationParams {
    pub carbs_grams: f64,
    pub insulin_dose: f64,
    pub current_bg: f64,
    pub trend: Trend,
    pub total_daily_dose: f64,
    #[serde(default = "default_horizon_minutes")]
    pub horizon_minutes: u32,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

fn default_horizon_minutes() -> u32 {
    crate::simulator::DEFAULT_HORIZON_MINUTES
}

fn default_step_minutes() -> u32 {
    crate::simulator::DEFAULT_STEP_MINUTES
}

impl SimulationParams {
    /// Parameters with the default 180 minute horizon at 1 minute steps
    pub fn new(
        carbs_grams: f64,
        insulin_dose: f64,
        current_bg: f64,
        trend: Trend,
        total_daily_dose: f64,
    ) -> Self {
        Self {
            carbs_grams,
            insulin_dose,
            current_bg,
            trend,
            total_daily_dose,
            horizon_minutes: default_horizon_minutes(),
            step_minutes: default_step_minutes(),
        }
    }
}

/// Simulated BG values in mg/dL, one per step starting at minute 0
#[derive(Clone, Debug, PartialEq)]
pub struct BgTrajectory {
    values: Vec<f64>,
    step_minutes: u32,
}

impl BgTrajectory {
    pub(crate) fn new(values: Vec<f64>, step_minutes: u32) -> Self {
        Self {
            values,
            step_minutes,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last simulated minute
    pub fn horizon_minutes(&self) -> u32 {
        self.values.len().saturating_sub(1) as u32 * self.step_minutes
    }

    /// Value at an exact minute offset, if it falls on a step boundary
    pub fn at_minute(&self, minute: u32) -> Option<f64> {
        if self.step_minutes == 0 || minute % self.step_minutes != 0 {
            return None;
        }
        self.values.get((minute / self.step_minutes) as usize).copied()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

// ============================================================================
// Presentation Types
// ============================================================================

/// Clinical band flags for one sample.
///
/// Flags are not mutually exclusive: a value above 250 mg/dL is both
/// `is_high` and `is_critical_high`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BandFlags {
    pub is_critical_low: bool,
    pub is_low: bool,
    pub is_target: bool,
    pub is_high: bool,
    pub is_critical_high: bool,
}

/// Ordered single-valued view over [`BandFlags`]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    CriticalLow,
    Low,
    Target,
    High,
    CriticalHigh,
}

impl BandFlags {
    /// Most severe band the flags describe
    pub fn severity(&self) -> Severity {
        if self.is_critical_low {
            Severity::CriticalLow
        } else if self.is_low {
            Severity::Low
        } else if self.is_critical_high {
            Severity::CriticalHigh
        } else if self.is_high {
            Severity::High
        } else {
            Severity::Target
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::CriticalLow => "CRITICAL LOW",
            Severity::Low => "low",
            Severity::Target => "target",
            Severity::High => "high",
            Severity::CriticalHigh => "CRITICAL HIGH",
        };
        write!(f, "{}", label)
    }
}

/// One CGM-style display point
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CgmSample {
    pub minute_offset: u32,
    /// Value in the display unit
    pub bg: f64,
    #[serde(flatten)]
    pub bands: BandFlags,
}

/// Summary statistics over the sampled series (display unit)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleSummary {
    pub at_60: Option<f64>,
    pub at_120: Option<f64>,
    pub at_180: Option<f64>,
    pub min: f64,
    pub max: f64,
}

// ============================================================================
// Meal Types
// ============================================================================

/// Nutrient estimate handed over by the upstream vision/nutrition pipeline
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealEstimate {
    #[serde(default)]
    pub food_name: Option<String>,
    pub carbs_grams: f64,
    #[serde(default)]
    pub protein_grams: Option<f64>,
    #[serde(default)]
    pub fat_grams: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
}
