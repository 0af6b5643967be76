//! Battery State of Health Estimation
//!
//! Estimates LFP battery degradation from the charging history:
//! - Real cycles: efficiency-corrected energy delivered / net capacity
//! - Charging stress: session mix across four charger-speed tiers
//! - Degradation = SEI formation + cycle aging + calendar aging
//! - Calibration warning when too few sessions reach a full charge
//!
//! Also provides the initial state-of-charge projection used when logging a
//! new charge without a known starting percentage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::{finite_or, round2};
use crate::dates;
use crate::model::{Charge, ChargerType};

/// Net capacity used when the configured value is missing or zero (kWh)
pub const DEFAULT_NET_CAPACITY_KWH: f64 = 60.48;

/// Upper bound of the slow (portable charger) tier, also the slow-AC
/// efficiency boundary (kW)
pub const SLOW_MAX_KW: f64 = 3.5;
/// Upper bound of the AC wallbox tier (kW)
pub const AC_MAX_KW: f64 = 22.0;
/// Upper bound of the DC tier; faster sessions are HPC (kW)
pub const DC_MAX_KW: f64 = 70.0;

/// Grid-to-battery efficiency assumed for slow AC sessions
pub const SLOW_AC_EFFICIENCY: f64 = 0.85;
/// Grid-to-battery efficiency assumed for every other session
pub const DEFAULT_EFFICIENCY: f64 = 0.95;

/// Capacity lost to SEI formation once it has fully developed (% points)
pub const SEI_MAX_DROP: f64 = 2.0;
/// Real cycles over which the SEI drop develops
pub const SEI_RAMP_CYCLES: f64 = 50.0;
/// Capacity fraction lost per real cycle at stress 1.0
pub const CYCLE_WEAR_PER_CYCLE: f64 = 0.00005;
/// Calendar aging per year (% points)
pub const CALENDAR_LOSS_PER_YEAR: f64 = 0.75;
/// Minimum end-of-session SoC that counts as a full charge (%)
pub const FULL_CHARGE_PERCENT: f64 = 99.0;
/// Share of full charges below which the estimate is flagged
pub const CALIBRATION_MIN_RATIO: f64 = 0.1;

const SECONDS_PER_JULIAN_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Charger speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    /// Portable charger, ≤ 3.5 kW
    Slow,
    /// AC wallbox, ≤ 22 kW
    Ac,
    /// DC fast charger, ≤ 70 kW
    Dc,
    /// High-power charger, > 70 kW
    Hpc,
}

impl SpeedTier {
    /// Classify a session by its charging power
    pub fn from_speed(speed_kw: f64) -> Self {
        if speed_kw <= SLOW_MAX_KW {
            SpeedTier::Slow
        } else if speed_kw <= AC_MAX_KW {
            SpeedTier::Ac
        } else if speed_kw <= DC_MAX_KW {
            SpeedTier::Dc
        } else {
            SpeedTier::Hpc
        }
    }

    /// Stress weight of one session in this tier
    pub fn coefficient(self) -> f64 {
        match self {
            SpeedTier::Slow => 0.9,
            SpeedTier::Ac => 1.0,
            SpeedTier::Dc => 1.2,
            SpeedTier::Hpc => 2.8,
        }
    }
}

/// Session count per speed tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    /// ≤ 3.5 kW sessions
    pub slow: u32,
    /// AC sessions
    pub ac: u32,
    /// DC sessions
    pub dc: u32,
    /// HPC sessions
    pub hpc: u32,
}

impl TierCounts {
    fn record(&mut self, tier: SpeedTier) {
        match tier {
            SpeedTier::Slow => self.slow += 1,
            SpeedTier::Ac => self.ac += 1,
            SpeedTier::Dc => self.dc += 1,
            SpeedTier::Hpc => self.hpc += 1,
        }
    }

    /// All sessions
    pub fn total(&self) -> u32 {
        self.slow + self.ac + self.dc + self.hpc
    }

    /// Session-weighted stress; 1.0 when there are no sessions. Not clamped:
    /// an all-HPC history reaches 2.8.
    pub fn charging_stress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        let weighted = f64::from(self.slow) * SpeedTier::Slow.coefficient()
            + f64::from(self.ac) * SpeedTier::Ac.coefficient()
            + f64::from(self.dc) * SpeedTier::Dc.coefficient()
            + f64::from(self.hpc) * SpeedTier::Hpc.coefficient();
        weighted / f64::from(total)
    }
}

/// Degradation contributions in percentage points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    /// SEI layer formation
    pub sei: f64,
    /// Cycle wear
    pub cycle: f64,
    /// Calendar aging
    pub calendar: f64,
}

/// State of health estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SohResult {
    /// State of health (%)
    pub estimated_soh: f64,
    /// Equivalent full cycles delivered to the battery
    pub real_cycles_count: f64,
    /// Charging stress times thermal factor
    pub stress_score: f64,
    /// Session-weighted speed-tier stress
    pub charging_stress: f64,
    /// Thermal factor applied
    pub thermal_stress: f64,
    /// Too few full charges for a trustworthy estimate
    pub calibration_warning: bool,
    /// Loss breakdown (% points)
    pub degradation: Degradation,
    /// Electric sessions considered
    pub sessions: u32,
    /// Sessions per speed tier
    pub tiers: TierCounts,
}

impl SohResult {
    /// Result for a history with nothing to estimate from
    pub fn baseline(thermal_stress_factor: f64) -> Self {
        Self {
            estimated_soh: 100.0,
            real_cycles_count: 0.0,
            stress_score: thermal_stress_factor,
            charging_stress: 1.0,
            thermal_stress: thermal_stress_factor,
            calibration_warning: false,
            degradation: Degradation::default(),
            sessions: 0,
            tiers: TierCounts::default(),
        }
    }
}

/// Grid-to-battery efficiency of one session.
///
/// A charger-type override strictly between 0 and 1 wins; otherwise slow AC
/// sessions (0 < speed ≤ 3.5 kW) get 0.85 and everything else 0.95.
pub fn session_efficiency(charge: &Charge, charger_types: &[ChargerType]) -> f64 {
    charger_override(charge, charger_types).unwrap_or_else(|| speed_efficiency(charge.speed()))
}

fn charger_override(charge: &Charge, charger_types: &[ChargerType]) -> Option<f64> {
    let id = charge.charger_type_id.as_deref()?;
    charger_types
        .iter()
        .find(|ct| ct.id == id)?
        .efficiency
        .filter(|&e| e > 0.0 && e < 1.0)
}

fn speed_efficiency(speed_kw: f64) -> f64 {
    if speed_kw > 0.0 && speed_kw <= SLOW_MAX_KW {
        SLOW_AC_EFFICIENCY
    } else {
        DEFAULT_EFFICIENCY
    }
}

/// Estimate state of health as of now.
///
/// See [`estimate_soh_at`].
pub fn estimate_soh(
    charges: &[Charge],
    mfg_date: Option<&str>,
    net_capacity_kwh: f64,
    charger_types: &[ChargerType],
    thermal_stress_factor: f64,
) -> SohResult {
    estimate_soh_at(
        charges,
        mfg_date,
        net_capacity_kwh,
        charger_types,
        thermal_stress_factor,
        Utc::now(),
    )
}

/// Estimate state of health as of `as_of`.
///
/// Empty histories and missing manufacturing dates yield
/// [`SohResult::baseline`]. A manufacturing date that is present but
/// unparsable only zeroes the calendar-aging term.
pub fn estimate_soh_at(
    charges: &[Charge],
    mfg_date: Option<&str>,
    net_capacity_kwh: f64,
    charger_types: &[ChargerType],
    thermal_stress_factor: f64,
    as_of: DateTime<Utc>,
) -> SohResult {
    let thermal = finite_or(thermal_stress_factor, 1.0);
    let mfg_date = mfg_date.map(str::trim).filter(|d| !d.is_empty());
    let Some(mfg_date) = mfg_date.filter(|_| !charges.is_empty()) else {
        return SohResult::baseline(thermal);
    };

    let capacity = match finite_or(net_capacity_kwh, 0.0) {
        c if c > 0.0 => c,
        _ => DEFAULT_NET_CAPACITY_KWH,
    };

    let mut tiers = TierCounts::default();
    let mut real_kwh = 0.0;
    let mut full_charges = 0u32;

    for charge in charges.iter().filter(|c| c.is_electric()) {
        real_kwh += charge.energy_kwh() * session_efficiency(charge, charger_types);
        tiers.record(SpeedTier::from_speed(charge.speed()));
        if charge.final_percentage.unwrap_or(0.0) >= FULL_CHARGE_PERCENT {
            full_charges += 1;
        }
    }

    let sessions = tiers.total();
    let real_cycles = real_kwh / capacity;
    let charging_stress = tiers.charging_stress();
    let stress_score = charging_stress * thermal;

    let sei = (real_cycles / SEI_RAMP_CYCLES * SEI_MAX_DROP).min(SEI_MAX_DROP);
    let cycle = real_cycles * CYCLE_WEAR_PER_CYCLE * stress_score * 100.0;
    let calendar = match dates::parse_instant(mfg_date) {
        Some(mfg) => {
            let age_years = (as_of - mfg).num_seconds() as f64 / SECONDS_PER_JULIAN_YEAR;
            (age_years * CALENDAR_LOSS_PER_YEAR).max(0.0)
        }
        None => {
            tracing::warn!("Unparsable manufacturing date '{mfg_date}', skipping calendar aging");
            0.0
        }
    };

    let estimated_soh = (100.0 - sei - cycle - calendar).max(0.0);
    let calibration_warning =
        sessions > 0 && f64::from(full_charges) / f64::from(sessions) < CALIBRATION_MIN_RATIO;

    tracing::debug!(
        sessions,
        real_cycles,
        stress_score,
        estimated_soh,
        "Estimated battery state of health"
    );

    SohResult {
        estimated_soh: round2(estimated_soh),
        real_cycles_count: round2(real_cycles),
        stress_score: round2(stress_score),
        charging_stress: round2(charging_stress),
        thermal_stress: round2(thermal),
        calibration_warning,
        degradation: Degradation {
            sei: round2(sei),
            cycle: round2(cycle),
            calendar: round2(calendar),
        },
        sessions,
        tiers,
    }
}

/// Project the state of charge at the start of a new session.
///
/// Energy used since `previous` = distance × `avg_efficiency` (kWh/100km).
/// Returns `None` (unknown, not 0%) when an input is missing or zero, or when
/// the odometer has not advanced since the previous session.
pub fn estimate_initial_soc(
    previous: &Charge,
    current_odometer: f64,
    avg_efficiency: f64,
    battery_size: f64,
) -> Option<u8> {
    let known = |v: f64| v.is_finite() && v != 0.0;
    if !known(current_odometer) || !known(avg_efficiency) || !known(battery_size) {
        return None;
    }
    let previous_odometer = previous.odometer.filter(|v| v.is_finite())?;
    let previous_final = previous.final_percentage.filter(|v| v.is_finite())?;

    let distance = current_odometer - previous_odometer;
    if distance <= 0.0 {
        return None;
    }

    let consumed_kwh = distance * avg_efficiency / 100.0;
    let soc_consumed = consumed_kwh / battery_size * 100.0;
    let estimate = (previous_final - soc_consumed).clamp(0.0, 100.0);
    Some(estimate.round() as u8)
}
