//! Trip and charging records
//!
//! Plain snapshots handed to the engine by the storage layer. Field names
//! follow the Rust convention; the JSON aliases cover both the camelCase
//! contract and the column names of the vehicle's trip database export.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::coerce::{
    finite_or, lenient_bool, lenient_f64, lenient_opt_f64, lenient_opt_i64, lenient_opt_string,
    lenient_string,
};
use crate::config::{read_json, ConfigError};
use crate::dates;

/// Distance below which a record counts as stationary (parking climate
/// control, battery conditioning). Stationary energy is counted in totals but
/// kept out of every per-km ratio.
pub const STATIONARY_DISTANCE_KM: f64 = 0.5;

/// One vehicle journey
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Distance in km
    #[serde(default, alias = "trip", deserialize_with = "lenient_f64")]
    pub distance_km: f64,

    /// Net energy in kWh (signed)
    #[serde(default, alias = "electricity", deserialize_with = "lenient_f64")]
    pub energy_kwh: f64,

    /// Fuel in litres (hybrids only)
    #[serde(default, alias = "fuel", deserialize_with = "lenient_f64")]
    pub fuel_liters: f64,

    /// Duration in seconds
    #[serde(default, alias = "duration", deserialize_with = "lenient_f64")]
    pub duration_seconds: f64,

    /// Calendar date, `YYYYMMDD`
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    /// Month tag, `YYYYMM`
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub month: Option<String>,

    /// Start time, Unix seconds
    #[serde(
        default,
        alias = "start_timestamp",
        deserialize_with = "lenient_opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_timestamp: Option<i64>,

    /// End time, Unix seconds
    #[serde(
        default,
        alias = "end_timestamp",
        deserialize_with = "lenient_opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_timestamp: Option<i64>,

    /// Soft-delete marker from the source database (bool or 0/1)
    #[serde(
        default,
        alias = "is_deleted",
        deserialize_with = "lenient_bool",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_deleted: bool,
}

impl Trip {
    /// Distance with the non-finite guard applied
    pub fn distance(&self) -> f64 {
        finite_or(self.distance_km, 0.0)
    }

    /// Energy with the non-finite guard applied
    pub fn energy(&self) -> f64 {
        finite_or(self.energy_kwh, 0.0)
    }

    /// Fuel with the non-finite guard applied
    pub fn fuel(&self) -> f64 {
        finite_or(self.fuel_liters, 0.0)
    }

    /// Duration with the non-finite guard applied
    pub fn duration(&self) -> f64 {
        finite_or(self.duration_seconds, 0.0)
    }

    /// Whether this record is too short to be treated as a journey
    pub fn is_stationary(&self) -> bool {
        self.distance() < STATIONARY_DISTANCE_KM
    }

    /// Start timestamp when it is present and positive
    pub fn start(&self) -> Option<i64> {
        self.start_timestamp.filter(|&ts| ts > 0)
    }

    /// `YYYYMMDD` bucket key: own `date`, else the local start date
    pub fn date_key(&self, utc_offset_minutes: i32) -> Option<String> {
        if let Some(date) = self.date.as_deref().filter(|d| dates::is_compact_date(d)) {
            return Some(date[..8].to_string());
        }
        let local = dates::local_datetime(self.start()?, utc_offset_minutes)?;
        Some(local.format("%Y%m%d").to_string())
    }

    /// `YYYYMM` bucket key: own `month`, else the `date` prefix, else the
    /// local start date
    pub fn month_key(&self, utc_offset_minutes: i32) -> Option<String> {
        if let Some(month) = self.month.as_deref().filter(|m| dates::is_compact_month(m)) {
            return Some(month[..6].to_string());
        }
        self.date_key(utc_offset_minutes)
            .map(|date| date[..6].to_string())
    }
}

/// Energy source of a charging session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeKind {
    /// Charging session
    #[default]
    Electric,
    /// Refuelling stop
    Fuel,
    /// Any other tag; excluded from both electric and fuel computations
    #[serde(other)]
    Other,
}

/// One charging (or refuelling) session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    /// Opaque identifier; numeric ids are kept as their decimal text
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Session date, `YYYY-MM-DD` (`YYYYMMDD` also accepted)
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub date: Option<String>,

    /// Session start, `HH:MM`
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub time: Option<String>,

    /// Energy delivered in kWh
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kwh_charged: f64,

    /// Legacy energy field, used when `kwh_charged` is empty
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub kwh: Option<f64>,

    /// Fuel delivered in litres
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liters_charged: f64,

    /// Amount paid
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_cost: f64,

    /// Unit price of electricity
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_kwh: f64,

    /// Unit price of fuel
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_liter: f64,

    /// Key into the charger-type catalog
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub charger_type_id: Option<String>,

    /// Charging power in kW
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed_kw: f64,

    /// State of charge at plug-in (unknown when absent)
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub initial_percentage: Option<f64>,

    /// State of charge at unplug (unknown when absent)
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub final_percentage: Option<f64>,

    /// Odometer reading in km
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub odometer: Option<f64>,

    /// Energy source; a null or missing tag means electric
    #[serde(default, rename = "type", deserialize_with = "lenient_kind")]
    pub kind: ChargeKind,
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<ChargeKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => ChargeKind::Electric,
        Some(serde_json::Value::String(tag)) => match tag.trim().to_lowercase().as_str() {
            "" | "electric" => ChargeKind::Electric,
            "fuel" => ChargeKind::Fuel,
            _ => ChargeKind::Other,
        },
        Some(_) => ChargeKind::Other,
    })
}

impl Charge {
    /// Whether this is a charging session
    pub fn is_electric(&self) -> bool {
        self.kind == ChargeKind::Electric
    }

    /// Whether this is a refuelling stop
    pub fn is_fuel(&self) -> bool {
        self.kind == ChargeKind::Fuel
    }

    /// Delivered energy, falling back to the legacy `kwh` field
    pub fn energy_kwh(&self) -> f64 {
        let primary = finite_or(self.kwh_charged, 0.0);
        if primary != 0.0 {
            return primary;
        }
        self.kwh.map_or(0.0, |kwh| finite_or(kwh, 0.0))
    }

    /// Litres added
    pub fn liters(&self) -> f64 {
        finite_or(self.liters_charged, 0.0)
    }

    /// Cost with the non-finite guard applied
    pub fn cost(&self) -> f64 {
        finite_or(self.total_cost, 0.0)
    }

    /// Charging power in kW
    pub fn speed(&self) -> f64 {
        finite_or(self.speed_kw, 0.0)
    }

    /// Session start as Unix seconds in the given local offset
    pub fn timestamp(&self, utc_offset_minutes: i32) -> Option<i64> {
        let date = dates::parse_flexible_date(self.date.as_deref()?)?;
        let time = dates::parse_clock(self.time.as_deref().unwrap_or("00:00"))?;
        dates::local_to_unix(date.and_time(time), utc_offset_minutes)
    }
}

/// Charger catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerType {
    /// Referenced by `Charge::charger_type_id`
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Nominal power in kW
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed_kw: f64,

    /// Grid-to-battery efficiency override (0–1)
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub efficiency: Option<f64>,
}

/// Trips and charges bundled for file-based input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Trip records
    pub trips: Vec<Trip>,
    /// Charging sessions
    pub charges: Vec<Charge>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }

    /// Save the dataset as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        crate::config::write_json(path.as_ref(), self)
    }
}
