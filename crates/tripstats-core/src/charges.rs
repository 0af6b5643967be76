//! Charging history totals

use serde::{Deserialize, Serialize};

use crate::coerce::{finite_or, safe_div};
use crate::model::Charge;

/// Totals over a charge list, split by energy source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeSummary {
    /// All sessions
    pub charge_count: u32,
    /// Electric sessions
    pub electric_count: u32,
    /// Fuel sessions
    pub fuel_count: u32,
    /// Energy charged (kWh)
    pub total_kwh: f64,
    /// Fuel added (L)
    pub total_liters: f64,
    /// Electric plus fuel cost
    pub total_cost: f64,
    /// Electricity cost
    pub electric_cost: f64,
    /// Fuel cost
    pub fuel_cost: f64,
    /// Mean of the per-session price per kWh
    pub avg_price_per_kwh: f64,
    /// Mean of the per-session price per litre
    pub avg_price_per_liter: f64,
}

/// Summarize a charge list; `None` when it is empty
pub fn summarize(charges: &[Charge]) -> Option<ChargeSummary> {
    if charges.is_empty() {
        return None;
    }

    let mut summary = ChargeSummary {
        charge_count: charges.len() as u32,
        ..Default::default()
    };
    let mut kwh_price_sum = 0.0;
    let mut liter_price_sum = 0.0;

    for charge in charges {
        if charge.is_electric() {
            summary.electric_count += 1;
            summary.total_kwh += charge.energy_kwh();
            summary.electric_cost += charge.cost();
            kwh_price_sum += finite_or(charge.price_per_kwh, 0.0);
        } else if charge.is_fuel() {
            summary.fuel_count += 1;
            summary.total_liters += charge.liters();
            summary.fuel_cost += charge.cost();
            liter_price_sum += finite_or(charge.price_per_liter, 0.0);
        }
    }

    summary.total_cost = summary.electric_cost + summary.fuel_cost;
    summary.avg_price_per_kwh = safe_div(kwh_price_sum, f64::from(summary.electric_count));
    summary.avg_price_per_liter = safe_div(liter_price_sum, f64::from(summary.fuel_count));
    Some(summary)
}

/// Most recent electric session: latest start time, then highest odometer.
/// Sessions without a date sort before dated ones; ties keep the later entry.
pub fn latest_electric(charges: &[Charge], utc_offset_minutes: i32) -> Option<&Charge> {
    charges.iter().filter(|c| c.is_electric()).max_by(|a, b| {
        let odometer = |c: &Charge| c.odometer.filter(|v| v.is_finite()).unwrap_or(f64::MIN);
        a.timestamp(utc_offset_minutes)
            .cmp(&b.timestamp(utc_offset_minutes))
            .then_with(|| odometer(a).total_cmp(&odometer(b)))
    })
}
