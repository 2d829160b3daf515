//! Blood glucose unit conversion.
//!
//! Everything inside the simulator runs in mg/dL. Values entered in mmol/L
//! are converted on the way in and converted back on the way out.

use crate::BgUnit;

/// mg/dL = mmol/L × this factor
pub const MGDL_PER_MMOL: f64 = 18.0182;

pub fn mmol_to_mg_dl(mmol: f64) -> f64 {
    mmol * MGDL_PER_MMOL
}

pub fn mg_dl_to_mmol(mg_dl: f64) -> f64 {
    mg_dl / MGDL_PER_MMOL
}

/// Convert a reading in `unit` into mg/dL
pub fn to_mg_dl(value: f64, unit: BgUnit) -> f64 {
    match unit {
        BgUnit::MgDl => value,
        BgUnit::MmolL => mmol_to_mg_dl(value),
    }
}

/// Convert a reading in `unit` into mmol/L
pub fn to_mmol(value: f64, unit: BgUnit) -> f64 {
    match unit {
        BgUnit::MgDl => mg_dl_to_mmol(value),
        BgUnit::MmolL => value,
    }
}

/// Convert an internal mg/dL value into the display unit
pub fn from_mg_dl(mg_dl: f64, unit: BgUnit) -> f64 {
    match unit {
        BgUnit::MgDl => mg_dl,
        BgUnit::MmolL => mg_dl_to_mmol(mg_dl),
    }
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
