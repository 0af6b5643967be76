//! Trip pricing
//!
//! Cost of a trip = energy × electricity price + fuel × fuel price, where each
//! price comes from the configured strategy:
//! - `custom`: the flat price from settings
//! - `average`: total cost / total energy across the charge history
//! - `dynamic`: the effective price of the last charge before the trip

use serde::{Deserialize, Serialize};

use crate::coerce::{finite_or, safe_div};
use crate::config::Settings;
use crate::model::{Charge, Trip};

/// How the unit price of an energy source is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStrategy {
    /// Flat configured price
    #[default]
    Custom,
    /// Weighted average over all charges of that source
    Average,
    /// Price of the most recent charge before the trip started
    Dynamic,
}

/// Cost breakdown of one trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCost {
    /// Electricity cost
    pub electric: f64,
    /// Fuel cost
    pub fuel: f64,
    /// Sum of both
    pub total: f64,
}

/// Unit-price lookup for a single energy source
#[derive(Debug, Clone, Default)]
struct SourcePricing {
    strategy: PriceStrategy,
    custom: f64,
    average: f64,
    /// `(timestamp, effective price)`, ascending by timestamp
    timeline: Vec<(i64, f64)>,
}

impl SourcePricing {
    fn new<'a>(
        strategy: PriceStrategy,
        custom: f64,
        charges: impl Iterator<Item = &'a Charge> + Clone,
        quantity: fn(&Charge) -> f64,
        utc_offset_minutes: i32,
    ) -> Self {
        let (total_qty, total_cost) = charges
            .clone()
            .fold((0.0, 0.0), |(q, c), charge| (q + quantity(charge), c + charge.cost()));
        let average = if total_qty > 0.0 {
            safe_div(total_cost, total_qty)
        } else {
            0.0
        };

        let mut timeline = Vec::new();
        if strategy == PriceStrategy::Dynamic {
            timeline = charges
                .filter_map(|charge| {
                    let ts = charge.timestamp(utc_offset_minutes)?;
                    let qty = quantity(charge);
                    let price = if qty > 0.0 { safe_div(charge.cost(), qty) } else { 0.0 };
                    Some((ts, price))
                })
                .collect();
            timeline.sort_by_key(|&(ts, _)| ts);
        }

        Self {
            strategy,
            custom: finite_or(custom, 0.0),
            average,
            timeline,
        }
    }

    fn price_at(&self, trip_start: Option<i64>) -> f64 {
        match self.strategy {
            PriceStrategy::Custom => self.custom,
            PriceStrategy::Average if self.average > 0.0 => self.average,
            PriceStrategy::Average => self.custom,
            PriceStrategy::Dynamic => {
                let start = trip_start.unwrap_or(0);
                let before = self.timeline.partition_point(|&(ts, _)| ts < start);
                match before.checked_sub(1) {
                    Some(idx) => self.timeline[idx].1,
                    None => self.custom,
                }
            }
        }
    }
}

/// Prices for electricity and fuel, prepared once per aggregation
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    electric: SourcePricing,
    fuel: SourcePricing,
}

impl PriceBook {
    /// Prepare prices for the configured strategies
    pub fn new(settings: &Settings, charges: &[Charge]) -> Self {
        let offset = settings.utc_offset_minutes;
        let electric = SourcePricing::new(
            settings.electric_strategy,
            settings.electric_price,
            charges.iter().filter(|c| c.is_electric()),
            Charge::energy_kwh,
            offset,
        );
        let fuel = SourcePricing::new(
            settings.fuel_strategy,
            settings.fuel_price,
            charges.iter().filter(|c| c.is_fuel()),
            Charge::liters,
            offset,
        );
        tracing::debug!(
            electric = ?settings.electric_strategy,
            fuel = ?settings.fuel_strategy,
            avg_kwh_price = electric.average,
            avg_liter_price = fuel.average,
            "Prepared price book"
        );
        Self { electric, fuel }
    }

    /// Average electricity price over the charge history (0 without charges)
    pub fn average_electric_price(&self) -> f64 {
        self.electric.average
    }

    /// Average fuel price over the charge history (0 without charges)
    pub fn average_fuel_price(&self) -> f64 {
        self.fuel.average
    }

    /// Price a single trip
    pub fn trip_cost(&self, trip: &Trip) -> TripCost {
        let start = trip.start();
        let electric = finite_or(trip.energy() * self.electric.price_at(start), 0.0);
        let fuel = finite_or(trip.fuel() * self.fuel.price_at(start), 0.0);
        TripCost {
            electric,
            fuel,
            total: electric + fuel,
        }
    }
}
