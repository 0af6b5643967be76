//! Engine settings
//!
//! The caller-owned configuration record read by the aggregation pipeline and
//! the battery estimator. Every field has a default so partial settings files
//! (or settings written by older app versions) still load.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::battery::DEFAULT_NET_CAPACITY_KWH;
use crate::coerce::{lenient_f64, lenient_f64_or, lenient_opt_string};
use crate::model::ChargerType;
use crate::pricing::PriceStrategy;

/// Errors that can occur while loading or saving settings and datasets
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain valid JSON
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// An in-memory document did not parse
    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the reported state of health comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SohMode {
    /// User-entered value (`Settings::soh`)
    #[default]
    Manual,
    /// Battery estimator output
    Calculated,
}

/// Settings passed to the engine (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Battery net capacity in kWh
    #[serde(deserialize_with = "battery_size_or_default")]
    pub battery_size: f64,

    /// Manually entered state of health (%)
    #[serde(deserialize_with = "soh_or_default")]
    pub soh: f64,

    /// Whether `soh` or the estimator drives reported SoH
    pub soh_mode: SohMode,

    /// Manufacturing date (`YYYY-MM-DD`)
    #[serde(deserialize_with = "lenient_opt_string")]
    pub mfg_date: Option<String>,

    /// Climate multiplier applied to the charging stress
    #[serde(deserialize_with = "thermal_factor_or_default")]
    pub thermal_stress_factor: f64,

    /// Charger catalog with per-type efficiency overrides
    pub charger_types: Vec<ChargerType>,

    /// Electricity pricing
    pub electric_strategy: PriceStrategy,

    /// Fuel pricing
    pub fuel_strategy: PriceStrategy,

    /// Configured price per kWh
    #[serde(deserialize_with = "lenient_f64")]
    pub electric_price: f64,

    /// Configured price per litre
    #[serde(deserialize_with = "lenient_f64")]
    pub fuel_price: f64,

    /// Kilometres driven before the trip log starts
    #[serde(deserialize_with = "lenient_f64")]
    pub odometer_offset: f64,

    /// Local time offset for hour/weekday buckets and charge timestamps
    pub utc_offset_minutes: i32,

    /// "Today" for calendar aging; the current UTC date when absent
    pub reference_date: Option<NaiveDate>,

    /// UI preference carried along untouched
    pub hidden_tabs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            battery_size: DEFAULT_NET_CAPACITY_KWH,
            soh: 100.0,
            soh_mode: SohMode::Manual,
            mfg_date: None,
            thermal_stress_factor: 1.0,
            charger_types: Vec::new(),
            electric_strategy: PriceStrategy::Custom,
            fuel_strategy: PriceStrategy::Custom,
            electric_price: 0.0,
            fuel_price: 0.0,
            odometer_offset: 0.0,
            utc_offset_minutes: 0,
            reference_date: None,
            hidden_tabs: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }

    /// Save settings as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        write_json(path.as_ref(), self)
    }

    /// Thermal factor; 0 and non-finite values mean "unset" (1.0)
    pub fn thermal_factor(&self) -> f64 {
        match self.thermal_stress_factor {
            f if f.is_finite() && f != 0.0 => f,
            _ => 1.0,
        }
    }

    /// Manual state of health; 0 and non-finite values mean "unset" (100%)
    pub fn manual_soh(&self) -> f64 {
        match self.soh {
            s if s.is_finite() && s != 0.0 => s,
            _ => 100.0,
        }
    }
}

fn battery_size_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_f64_or(deserializer, DEFAULT_NET_CAPACITY_KWH)
}

fn soh_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_f64_or(deserializer, 100.0)
}

fn thermal_factor_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_f64_or(deserializer, 1.0)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
