//! Demo Mode - Synthetic trip and charge history
//!
//! Generates a plausible commuter dataset for trying the dashboard without a
//! vehicle database export. Seeded generators are reproducible.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Charge, ChargeKind, Dataset, Trip};

/// Demo dataset generator
pub struct DemoGenerator {
    rng: StdRng,
    /// Net battery capacity used for state-of-charge bookkeeping (kWh)
    battery_kwh: f64,
    /// Local offset used to stamp trips
    utc_offset_minutes: i32,
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoGenerator {
    /// Create a generator with a random seed
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a reproducible generator
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            battery_kwh: 60.48,
            utc_offset_minutes: 60,
        }
    }

    /// Set the battery capacity used for SoC bookkeeping
    pub fn battery_kwh(mut self, kwh: f64) -> Self {
        self.battery_kwh = kwh.max(1.0);
        self
    }

    /// Generate `days` days of driving starting at `start`
    pub fn generate(&mut self, start: NaiveDate, days: u32) -> Dataset {
        let mut trips = Vec::new();
        let mut charges = Vec::new();
        let mut soc = 90.0_f64;
        let mut odometer = self.rng.gen_range(1_000.0..8_000.0_f64).round();

        for offset in 0..days {
            let day = start + Duration::days(i64::from(offset));
            let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
            let count = if weekend {
                self.rng.gen_range(0..=2)
            } else {
                self.rng.gen_range(2..=4)
            };

            let mut hour = if weekend { 10 } else { 7 };
            for _ in 0..count {
                let trip = self.trip(day, hour, weekend);
                odometer += trip.distance_km;
                soc -= trip.energy_kwh / self.battery_kwh * 100.0;
                hour = (hour + self.rng.gen_range(2..6)).min(22);
                trips.push(trip);
            }

            // Pre-conditioning while parked
            if self.rng.gen_bool(0.1) {
                let mut parked = self.trip(day, 6, weekend);
                parked.distance_km = 0.0;
                parked.duration_seconds = 0.0;
                parked.energy_kwh = round1(self.rng.gen_range(0.2..1.2));
                soc -= parked.energy_kwh / self.battery_kwh * 100.0;
                trips.push(parked);
            }

            if soc < 35.0 || (weekend && self.rng.gen_bool(0.2)) {
                let charge = self.charge(day, soc, odometer);
                soc = charge.final_percentage.unwrap_or(soc);
                charges.push(charge);
            }
        }

        tracing::debug!(trips = trips.len(), charges = charges.len(), "Generated demo dataset");
        Dataset { trips, charges }
    }

    fn trip(&mut self, day: NaiveDate, hour: u32, weekend: bool) -> Trip {
        let distance = if weekend && self.rng.gen_bool(0.3) {
            self.rng.gen_range(40.0..180.0)
        } else {
            self.rng.gen_range(2.0..35.0)
        };
        let distance = round1(distance);
        // Consumption rises on long (highway) trips
        let base = if distance > 60.0 { 17.5 } else { 14.5 };
        let efficiency = base + self.rng.gen_range(-2.0..3.0);
        let energy = round1(distance * efficiency / 100.0);
        let avg_speed = if distance > 60.0 {
            self.rng.gen_range(75.0..105.0)
        } else {
            self.rng.gen_range(22.0..45.0)
        };
        let duration = (distance / avg_speed * 3600.0).round();
        let minute = self.rng.gen_range(0..60);

        let start = day
            .and_hms_opt(hour.min(23), minute, 0)
            .and_then(|local| crate::dates::local_to_unix(local, self.utc_offset_minutes));

        Trip {
            distance_km: distance,
            energy_kwh: energy,
            fuel_liters: 0.0,
            duration_seconds: duration,
            date: Some(day.format("%Y%m%d").to_string()),
            month: Some(day.format("%Y%m").to_string()),
            start_timestamp: start,
            end_timestamp: start.map(|s| s + duration as i64),
            is_deleted: false,
        }
    }

    fn charge(&mut self, day: NaiveDate, soc: f64, odometer: f64) -> Charge {
        let initial = soc.clamp(5.0, 95.0).round();
        let (speed, price, final_target) = match self.rng.gen_range(0..10) {
            0 => (2.3, 0.18, 100.0),
            1..=6 => (7.4, 0.15, if self.rng.gen_bool(0.2) { 100.0 } else { 90.0 }),
            7 | 8 => (50.0, 0.45, 80.0),
            _ => (150.0, 0.59, 80.0),
        };
        let kwh = round1((final_target - initial).max(0.0) / 100.0 * self.battery_kwh / 0.92);
        let total_cost = (kwh * price * 100.0).round() / 100.0;
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();

        Charge {
            id: id.to_string(),
            date: Some(day.format("%Y-%m-%d").to_string()),
            time: Some(format!("{:02}:{:02}", self.rng.gen_range(18..23), self.rng.gen_range(0..60))),
            kwh_charged: kwh,
            kwh: None,
            liters_charged: 0.0,
            total_cost,
            price_per_kwh: price,
            price_per_liter: 0.0,
            charger_type_id: None,
            speed_kw: speed,
            initial_percentage: Some(initial),
            final_percentage: Some(final_target),
            odometer: Some(odometer.round()),
            kind: ChargeKind::Electric,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
