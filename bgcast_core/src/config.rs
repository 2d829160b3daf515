//! Configuration file support for bgcast.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bgcast/config.toml`.

use crate::error::require_positive;
use crate::{BgUnit, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Personal dosing profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    /// Total daily insulin dose (units)
    #[serde(default = "default_total_daily_dose")]
    pub total_daily_dose: f64,

    /// mmol/L drop per unit of rapid-acting insulin
    #[serde(default = "default_correction_factor")]
    pub correction_factor: f64,

    /// Fixed grams-per-unit ratio; derived from TDD when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carb_ratio: Option<f64>,

    #[serde(default)]
    pub bg_unit: BgUnit,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            total_daily_dose: default_total_daily_dose(),
            correction_factor: default_correction_factor(),
            carb_ratio: None,
            bg_unit: BgUnit::default(),
        }
    }
}

impl ProfileConfig {
    /// Reject non-positive TDD, correction factor or carb ratio
    pub fn validate(&self) -> Result<()> {
        require_positive("total daily dose", self.total_daily_dose)?;
        require_positive("correction factor", self.correction_factor)?;
        if let Some(ratio) = self.carb_ratio {
            require_positive("carb ratio", ratio)?;
        }
        Ok(())
    }
}

// Default value functions
fn default_total_daily_dose() -> f64 {
    40.0
}

fn default_correction_factor() -> f64 {
    2.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config
            .profile
            .validate()
            .map_err(|e| Error::Config(format!("{:?}: {}", path, e)))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("bgcast").join("config.toml")
    }
}
