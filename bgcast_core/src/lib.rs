#![forbid(unsafe_code)]

//! Core domain model and forecasting logic for bgcast.
//!
//! This crate provides:
//! - Domain types (units, dosing, trajectories, CGM samples, meal estimates)
//! - Dosing calculator and physiological kernels
//! - BG simulator and presentation sampler
//! - Forecast pipeline
//! - Profile configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod units;
pub mod dosing;
pub mod kernels;
pub mod simulator;
pub mod sampler;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, ProfileConfig};
pub use dosing::{calculate_dose, calculate_icr_and_isf};
pub use simulator::simulate;
pub use engine::{analyze, Analysis, Forecast, ForecastRequest};
