//! Headline statistics for the dashboard

use serde::{Deserialize, Serialize};

use crate::battery::{estimate_soh_at, SohResult};
use crate::coerce::{finite_or, round2, safe_div};
use crate::config::{Settings, SohMode};
use crate::model::{Charge, Trip};
use crate::pricing::TripCost;

/// Highway consumption relative to the average
const HIGHWAY_CONSUMPTION_FACTOR: f64 = 1.2;
/// City consumption relative to the average
const CITY_CONSUMPTION_FACTOR: f64 = 0.8;

/// Summary totals. Ratios are rounded to two decimals; every division is
/// guarded so no field is ever NaN or infinite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Driving trips (stationary records excluded)
    pub trips_count: u32,
    /// Records below the stationary threshold
    pub stationary_count: u32,
    /// Driving distance (km)
    pub total_km: f64,
    /// Driving plus stationary energy
    pub total_kwh: f64,
    /// Energy of driving trips (kWh)
    pub driving_kwh: f64,
    /// Energy of stationary records (kWh)
    pub stationary_kwh: f64,
    /// Driving time (s)
    pub total_duration_seconds: f64,
    /// Driving time (h)
    pub total_hours: f64,
    /// kWh/100km over driving trips; 0 without distance
    pub avg_eff: f64,
    /// km/h; 0 without duration
    pub avg_speed: f64,
    /// Mean trip distance (km)
    pub avg_km: f64,
    /// Mean trip duration (min)
    pub avg_minutes: f64,
    /// Longest trip (km)
    pub max_km: f64,
    /// Shortest trip (km)
    pub min_km: f64,
    /// Highest trip energy (kWh)
    pub max_kwh: f64,
    /// Longest trip duration (min)
    pub max_minutes: f64,
    /// Distinct days with a dated trip
    pub active_days: u32,
    /// Days between first and last trip start
    pub total_days: u32,
    /// Trips per active day
    pub trips_per_day: f64,
    /// km per active day
    pub km_per_day: f64,
    /// Localized `first - last` date range
    pub date_range: String,

    /// Whether any trip used fuel
    pub is_hybrid: bool,
    /// Fuel over all records (L)
    pub total_fuel: f64,
    /// L/100km
    pub avg_fuel_eff: f64,
    /// Distance of trips without fuel (km)
    pub electric_only_km: f64,
    /// Distance of trips that used fuel (km)
    pub fuel_used_km: f64,
    /// Share of distance driven electric-only (%)
    pub electric_percentage: f64,
    /// Share of distance that used fuel (%)
    pub fuel_percentage: f64,
    /// Trips without fuel
    pub electric_only_trips: u32,
    /// Trips that used fuel
    pub fuel_used_trips: u32,
    /// Share of trips driven electric-only (%)
    pub ev_mode_usage: f64,
    /// Most fuel used on one trip (L)
    pub max_fuel: f64,

    /// Electric plus fuel cost
    pub total_cost: f64,
    /// Electricity cost
    pub electric_cost: f64,
    /// Fuel cost
    pub fuel_cost: f64,
    /// Cost per 100 km
    pub cost_per_100_km: f64,
    /// Most expensive single record
    pub max_cost: f64,
    /// Date of the most expensive record
    pub max_cost_date: String,

    /// Reported state of health (%)
    pub soh: f64,
    /// Estimator output when a manufacturing date is configured
    pub soh_data: Option<SohResult>,
    /// km on a full battery at the average consumption
    pub estimated_range: f64,
    /// Range at 1.2x the average consumption
    pub estimated_range_highway: f64,
    /// Range at 0.8x the average consumption
    pub estimated_range_city: f64,
    /// `total_km` plus the configured odometer offset
    pub odometer: f64,
}

/// Running totals collected while walking the trip list
#[derive(Debug, Default)]
pub(crate) struct Totals {
    pub trips: u32,
    pub stationary: u32,
    pub total_km: f64,
    pub total_kwh: f64,
    pub driving_kwh: f64,
    pub stationary_kwh: f64,
    pub total_fuel: f64,
    pub total_duration: f64,
    pub electric_only_km: f64,
    pub fuel_used_km: f64,
    pub electric_only_trips: u32,
    pub fuel_used_trips: u32,
    pub has_fuel: bool,
    pub max_km: Option<f64>,
    pub min_km: Option<f64>,
    pub max_kwh: Option<f64>,
    pub max_duration: Option<f64>,
    pub max_fuel: f64,
    pub electric_cost: f64,
    pub fuel_cost: f64,
    pub max_cost: Option<(f64, Option<String>)>,
    pub first_start: Option<i64>,
    pub last_start: Option<i64>,
}

fn fold_max(current: Option<f64>, value: f64) -> Option<f64> {
    Some(current.map_or(value, |c| c.max(value)))
}

fn fold_min(current: Option<f64>, value: f64) -> Option<f64> {
    Some(current.map_or(value, |c| c.min(value)))
}

impl Totals {
    /// Bookkeeping shared by driving and stationary records
    pub fn record_any(&mut self, trip: &Trip, cost: TripCost) {
        if trip.fuel() > 0.0 {
            self.has_fuel = true;
        }
        self.electric_cost += cost.electric;
        self.fuel_cost += cost.fuel;
        if self.max_cost.as_ref().map_or(true, |(max, _)| cost.total > *max) {
            self.max_cost = Some((cost.total, trip.date.clone()));
        }
        if let Some(ts) = trip.start() {
            self.first_start = Some(self.first_start.map_or(ts, |f| f.min(ts)));
            self.last_start = Some(self.last_start.map_or(ts, |l| l.max(ts)));
        }
    }

    pub fn add_stationary(&mut self, trip: &Trip) {
        self.stationary += 1;
        self.stationary_kwh += trip.energy();
        self.total_kwh += trip.energy();
        self.total_fuel += trip.fuel();
    }

    pub fn add_driving(&mut self, trip: &Trip) {
        let km = trip.distance();
        let kwh = trip.energy();
        let fuel = trip.fuel();
        let duration = trip.duration();

        self.trips += 1;
        self.total_km += km;
        self.driving_kwh += kwh;
        self.total_kwh += kwh;
        self.total_fuel += fuel;
        self.total_duration += duration;

        if fuel > 0.0 {
            self.fuel_used_km += km;
            self.fuel_used_trips += 1;
            self.max_fuel = self.max_fuel.max(fuel);
        } else {
            self.electric_only_km += km;
            self.electric_only_trips += 1;
        }

        self.max_km = fold_max(self.max_km, km);
        self.min_km = fold_min(self.min_km, km);
        self.max_kwh = fold_max(self.max_kwh, kwh);
        self.max_duration = fold_max(self.max_duration, duration);
    }

    /// Calendar span between the first and last trip start, in days
    fn span_days(&self) -> Option<u32> {
        let (first, last) = (self.first_start?, self.last_start?);
        // Clamp before the cast; far-apart timestamps (e.g. a row in
        // microseconds) must not overflow
        let span = (last.saturating_sub(first) as f64 / 86_400.0).ceil();
        let days = span.clamp(0.0, f64::from(u32::MAX - 1)) as u32 + 1;
        Some(days)
    }
}

/// Everything `finalize` needs besides the totals
pub(crate) struct SummaryContext<'a> {
    pub settings: &'a Settings,
    pub charges: &'a [Charge],
    pub active_days: u32,
    pub date_range: String,
}

pub(crate) fn finalize(totals: &Totals, ctx: SummaryContext<'_>) -> Summary {
    let settings = ctx.settings;
    let trips = f64::from(totals.trips);
    let per_day_divisor = f64::from(ctx.active_days.max(1));

    let avg_eff = round2(safe_div(totals.driving_kwh * 100.0, totals.total_km));
    let hours = totals.total_duration / 3600.0;

    let soh_data = settings.mfg_date.as_deref().map(|mfg| {
        let as_of = settings
            .reference_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .unwrap_or_else(chrono::Utc::now);
        estimate_soh_at(
            ctx.charges,
            Some(mfg),
            settings.battery_size,
            &settings.charger_types,
            settings.thermal_factor(),
            as_of,
        )
    });
    let soh = match (&soh_data, settings.soh_mode) {
        (Some(data), SohMode::Calculated) => data.estimated_soh,
        _ => settings.manual_soh(),
    };

    let battery = finite_or(settings.battery_size, 0.0).max(0.0);
    let effective_battery = battery * soh / 100.0;
    let range_at = |consumption: f64| {
        if effective_battery > 0.0 && consumption > 0.0 {
            safe_div(effective_battery * 100.0, consumption).round()
        } else {
            0.0
        }
    };

    let total_cost = totals.electric_cost + totals.fuel_cost;
    let (max_cost, max_cost_date) = match &totals.max_cost {
        Some((cost, date)) => (round2(*cost), date.clone().unwrap_or_default()),
        None => (0.0, String::new()),
    };

    Summary {
        trips_count: totals.trips,
        stationary_count: totals.stationary,
        total_km: totals.total_km,
        total_kwh: totals.total_kwh,
        driving_kwh: totals.driving_kwh,
        stationary_kwh: totals.stationary_kwh,
        total_duration_seconds: totals.total_duration,
        total_hours: round2(hours),
        avg_eff,
        avg_speed: round2(safe_div(totals.total_km, hours)),
        avg_km: round2(safe_div(totals.total_km, trips)),
        avg_minutes: round2(safe_div(totals.total_duration / 60.0, trips)),
        max_km: totals.max_km.unwrap_or(0.0),
        min_km: totals.min_km.unwrap_or(0.0),
        max_kwh: totals.max_kwh.unwrap_or(0.0),
        max_minutes: round2(totals.max_duration.unwrap_or(0.0) / 60.0),
        active_days: ctx.active_days,
        total_days: totals.span_days().unwrap_or(ctx.active_days.max(1)),
        trips_per_day: round2(trips / per_day_divisor),
        km_per_day: round2(totals.total_km / per_day_divisor),
        date_range: ctx.date_range,

        is_hybrid: totals.has_fuel,
        total_fuel: totals.total_fuel,
        avg_fuel_eff: round2(safe_div(totals.total_fuel * 100.0, totals.total_km)),
        electric_only_km: totals.electric_only_km,
        fuel_used_km: totals.fuel_used_km,
        electric_percentage: if totals.total_km > 0.0 {
            round2(totals.electric_only_km / totals.total_km * 100.0)
        } else {
            100.0
        },
        fuel_percentage: round2(safe_div(totals.fuel_used_km * 100.0, totals.total_km)),
        electric_only_trips: totals.electric_only_trips,
        fuel_used_trips: totals.fuel_used_trips,
        ev_mode_usage: if totals.trips > 0 {
            round2(f64::from(totals.electric_only_trips) / trips * 100.0)
        } else {
            100.0
        },
        max_fuel: totals.max_fuel,

        total_cost: round2(total_cost),
        electric_cost: round2(totals.electric_cost),
        fuel_cost: round2(totals.fuel_cost),
        cost_per_100_km: round2(safe_div(total_cost * 100.0, totals.total_km)),
        max_cost,
        max_cost_date,

        soh,
        soh_data,
        estimated_range: range_at(avg_eff),
        estimated_range_highway: range_at(avg_eff * HIGHWAY_CONSUMPTION_FACTOR),
        estimated_range_city: range_at(avg_eff * CITY_CONSUMPTION_FACTOR),
        odometer: totals.total_km + finite_or(settings.odometer_offset, 0.0),
    }
}
