//! Trip Aggregation
//!
//! Turns a filtered trip list (plus the charge history for pricing and battery
//! health) into everything the dashboard charts consume:
//! - headline summary
//! - monthly and daily rollups
//! - hour-of-day and day-of-week distributions
//! - trip-distance histogram and efficiency scatter
//! - top-N record trips
//!
//! Stationary records (see [`STATIONARY_DISTANCE_KM`]) contribute energy to
//! the totals only. A record that lacks the field a series is keyed on is left
//! out of that series and nothing else.

mod buckets;
mod summary;
mod top;

pub use buckets::{
    DistanceBucket, HourBucket, PeriodBucket, ScatterPoint, WeekdayBucket, DISTANCE_BUCKETS,
    MAX_SCATTER_EFFICIENCY,
};
pub use summary::Summary;
pub use top::{RankedTrip, TopRecords, TOP_N};

pub use crate::model::STATIONARY_DISTANCE_KM;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::labels::Locale;
use crate::model::{Charge, Trip};
use crate::pricing::PriceBook;
use buckets::SeriesBuilder;
use summary::{SummaryContext, Totals};

/// Output of [`aggregate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Headline totals and ratios
    pub summary: Summary,
    /// Per-month rollup, ascending
    pub monthly: Vec<PeriodBucket>,
    /// Per-day rollup, ascending
    pub daily: Vec<PeriodBucket>,
    /// 24 hour-of-day buckets
    pub hourly: Vec<HourBucket>,
    /// 7 weekday buckets, Monday first
    pub weekday: Vec<WeekdayBucket>,
    /// Trip-distance histogram
    pub trip_dist: Vec<DistanceBucket>,
    /// Distance vs efficiency points
    pub eff_scatter: Vec<ScatterPoint>,
    /// Record trips
    pub top: TopRecords,
    /// Whether any trip used fuel
    pub is_hybrid: bool,
}

/// Aggregate trips into dashboard statistics.
///
/// Returns `None` when there is nothing to aggregate: an empty trip list, or
/// one where every row has a negative distance. The result is deterministic
/// for fixed inputs once `settings.reference_date` is set (otherwise battery
/// calendar aging is measured against the current date).
pub fn aggregate(
    trips: &[Trip],
    charges: &[Charge],
    settings: &Settings,
    locale: &str,
) -> Option<AggregateResult> {
    if trips.is_empty() {
        return None;
    }

    let locale = Locale::from_tag(locale);
    let prices = PriceBook::new(settings, charges);
    let mut totals = Totals::default();
    let mut series = SeriesBuilder::new(settings.utc_offset_minutes);
    let mut driving = Vec::with_capacity(trips.len());
    let mut accepted = 0usize;

    for (index, trip) in trips.iter().enumerate() {
        if trip.distance_km < 0.0 {
            tracing::debug!(index, distance = trip.distance_km, "Skipping trip with negative distance");
            continue;
        }
        accepted += 1;

        let cost = prices.trip_cost(trip);
        totals.record_any(trip, cost);

        if trip.is_stationary() {
            totals.add_stationary(trip);
            continue;
        }

        totals.add_driving(trip);
        series.add(trip);
        driving.push(RankedTrip {
            index,
            trip: trip.clone(),
            cost,
        });
    }

    if accepted == 0 {
        tracing::debug!(rows = trips.len(), "No usable trips to aggregate");
        return None;
    }

    let active_days = series.active_days() as u32;
    let date_range = series
        .date_span()
        .map(|(first, last)| format!("{} - {}", locale.date_label(first), locale.date_label(last)))
        .unwrap_or_default();

    let summary = summary::finalize(
        &totals,
        SummaryContext {
            settings,
            charges,
            active_days,
            date_range,
        },
    );
    let top = TopRecords::build(&driving, totals.has_fuel);
    let series = series.finish(locale);

    tracing::debug!(
        trips = summary.trips_count,
        stationary = summary.stationary_count,
        months = series.monthly.len(),
        "Aggregated trips"
    );

    Some(AggregateResult {
        is_hybrid: summary.is_hybrid,
        summary,
        monthly: series.monthly,
        daily: series.daily,
        hourly: series.hourly,
        weekday: series.weekday,
        trip_dist: series.distance,
        eff_scatter: series.scatter,
        top,
    })
}
