//! Time-bucketed series, distance histogram and efficiency scatter

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};

use crate::coerce::safe_div;
use crate::dates;
use crate::labels::{Locale, WEEKDAY_KEYS};
use crate::model::Trip;

/// Upper efficiency bound for scatter points (kWh/100km); higher values are
/// sensor noise on very short hops
pub const MAX_SCATTER_EFFICIENCY: f64 = 50.0;

/// Inclusive upper bounds of the trip-distance histogram (km)
pub const DISTANCE_BUCKETS: [(f64, &str); 5] = [
    (5.0, "0-5"),
    (15.0, "5-15"),
    (30.0, "15-30"),
    (50.0, "30-50"),
    (f64::INFINITY, "50+"),
];

/// Monthly (`YYYYMM`) or daily (`YYYYMMDD`) rollup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBucket {
    /// `YYYYMM` or `YYYYMMDD`
    pub key: String,
    /// Localized period label
    pub label: String,
    /// Driving trips in the period
    pub trips: u32,
    /// Distance (km)
    pub km: f64,
    /// Energy (kWh)
    pub kwh: f64,
    /// Fuel (L)
    pub fuel: f64,
    /// Driving time (s)
    pub duration_seconds: f64,
    /// kWh/100km
    pub efficiency: f64,
    /// L/100km
    pub fuel_efficiency: f64,
}

impl PeriodBucket {
    fn add(&mut self, trip: &Trip) {
        self.trips += 1;
        self.km += trip.distance();
        self.kwh += trip.energy();
        self.fuel += trip.fuel();
        self.duration_seconds += trip.duration();
    }

    fn finish(mut self, label: String) -> Self {
        self.efficiency = safe_div(self.kwh * 100.0, self.km);
        self.fuel_efficiency = safe_div(self.fuel * 100.0, self.km);
        self.label = label;
        self
    }
}

/// Trips started in one hour of the day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourBucket {
    /// Local hour, 0-23
    pub hour: u8,
    /// Trips started in this hour
    pub trips: u32,
    /// Distance (km)
    pub km: f64,
    /// Energy (kWh)
    pub kwh: f64,
}

/// Trips started on one day of the week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekdayBucket {
    /// Stable key (`mon` … `sun`)
    pub day: String,
    /// Localized short day name
    pub label: String,
    /// Trips started on this day
    pub trips: u32,
    /// Distance (km)
    pub km: f64,
    /// Energy (kWh)
    pub kwh: f64,
}

/// Trip-distance histogram bin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceBucket {
    /// Bin label, e.g. `5-15`
    pub range: String,
    /// Trips in the bin
    pub count: u32,
}

/// One trip in the distance/efficiency scatter plot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Distance (km)
    pub x: f64,
    /// Efficiency (kWh/100km)
    pub y: f64,
    /// Fuel used (L)
    pub fuel: f64,
}

/// Accumulates every chart series for the driving (non-stationary) trips
#[derive(Debug)]
pub(crate) struct SeriesBuilder {
    utc_offset_minutes: i32,
    monthly: BTreeMap<String, PeriodBucket>,
    daily: BTreeMap<String, PeriodBucket>,
    hourly: Vec<HourBucket>,
    weekday: Vec<WeekdayBucket>,
    distance: Vec<DistanceBucket>,
    scatter: Vec<ScatterPoint>,
}

/// Finished chart series
#[derive(Debug)]
pub(crate) struct Series {
    pub monthly: Vec<PeriodBucket>,
    pub daily: Vec<PeriodBucket>,
    pub hourly: Vec<HourBucket>,
    pub weekday: Vec<WeekdayBucket>,
    pub distance: Vec<DistanceBucket>,
    pub scatter: Vec<ScatterPoint>,
}

impl SeriesBuilder {
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self {
            utc_offset_minutes,
            monthly: BTreeMap::new(),
            daily: BTreeMap::new(),
            hourly: (0..24u8)
                .map(|hour| HourBucket {
                    hour,
                    ..Default::default()
                })
                .collect(),
            weekday: WEEKDAY_KEYS
                .iter()
                .map(|day| WeekdayBucket {
                    day: day.to_string(),
                    ..Default::default()
                })
                .collect(),
            distance: DISTANCE_BUCKETS
                .iter()
                .map(|(_, range)| DistanceBucket {
                    range: range.to_string(),
                    count: 0,
                })
                .collect(),
            scatter: Vec::new(),
        }
    }

    /// Distinct calendar days seen so far
    pub fn active_days(&self) -> usize {
        self.daily.len()
    }

    /// First and last daily keys
    pub fn date_span(&self) -> Option<(&str, &str)> {
        let first = self.daily.keys().next()?;
        let last = self.daily.keys().next_back()?;
        Some((first, last))
    }

    pub fn add(&mut self, trip: &Trip) {
        let offset = self.utc_offset_minutes;

        if let Some(month) = trip.month_key(offset) {
            self.monthly.entry(month).or_default().add(trip);
        }
        if let Some(date) = trip.date_key(offset) {
            self.daily.entry(date).or_default().add(trip);
        }

        if let Some(local) = trip.start().and_then(|ts| dates::local_datetime(ts, offset)) {
            let hour = &mut self.hourly[local.hour() as usize];
            hour.trips += 1;
            hour.km += trip.distance();
            hour.kwh += trip.energy();

            let day = &mut self.weekday[local.weekday().num_days_from_monday() as usize];
            day.trips += 1;
            day.km += trip.distance();
            day.kwh += trip.energy();
        }

        let km = trip.distance();
        if let Some(idx) = DISTANCE_BUCKETS.iter().position(|&(upper, _)| km <= upper) {
            self.distance[idx].count += 1;
        }

        let kwh = trip.energy();
        if km > 0.0 && kwh > 0.0 {
            let efficiency = safe_div(kwh * 100.0, km);
            if efficiency > 0.0 && efficiency < MAX_SCATTER_EFFICIENCY {
                self.scatter.push(ScatterPoint {
                    x: km,
                    y: efficiency,
                    fuel: trip.fuel(),
                });
            }
        }
    }

    pub fn finish(self, locale: Locale) -> Series {
        let monthly = self
            .monthly
            .into_iter()
            .map(|(key, bucket)| {
                let label = locale.month_label(&key);
                PeriodBucket { key, ..bucket }.finish(label)
            })
            .collect();
        let daily = self
            .daily
            .into_iter()
            .map(|(key, bucket)| {
                let label = locale.date_label(&key);
                PeriodBucket { key, ..bucket }.finish(label)
            })
            .collect();
        let weekday = self
            .weekday
            .into_iter()
            .enumerate()
            .map(|(idx, bucket)| WeekdayBucket {
                label: locale.weekday_label(idx),
                ..bucket
            })
            .collect();

        Series {
            monthly,
            daily,
            hourly: self.hourly,
            weekday,
            distance: self.distance,
            scatter: self.scatter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(km: f64, kwh: f64) -> Trip {
        Trip {
            distance_km: km,
            energy_kwh: kwh,
            ..Default::default()
        }
    }

    #[test]
    fn test_distance_histogram_bounds_are_inclusive() {
        let mut builder = SeriesBuilder::new(0);
        for km in [3.0, 5.0, 10.0, 25.0, 40.0, 50.0, 60.0] {
            builder.add(&trip(km, 1.0));
        }
        let series = builder.finish(Locale::En);
        let counts: Vec<u32> = series.distance.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 2, 1]);
    }

    #[test]
    fn test_hour_and_weekday_use_local_offset() {
        let mut builder = SeriesBuilder::new(120);
        // Sunday 2025-01-12 23:00 UTC is Monday 01:00 at UTC+2
        builder.add(&Trip {
            start_timestamp: Some(1_736_722_800),
            ..trip(10.0, 1.5)
        });
        // No timestamp: excluded from hour/weekday only
        builder.add(&Trip {
            date: Some("20250112".into()),
            ..trip(10.0, 1.5)
        });
        let series = builder.finish(Locale::En);

        assert_eq!(series.hourly[1].trips, 1);
        assert_eq!(series.hourly.iter().map(|h| h.trips).sum::<u32>(), 1);
        assert_eq!(series.weekday[0].day, "mon");
        assert_eq!(series.weekday[0].trips, 1);
        assert_eq!(series.weekday[0].label, "Mon");
        assert_eq!(series.daily.len(), 2);
    }

    #[test]
    fn test_scatter_filters() {
        let mut builder = SeriesBuilder::new(0);
        builder.add(&trip(10.0, 1.0));
        builder.add(&trip(10.0, 0.0));
        builder.add(&trip(10.0, 6.0));
        builder.add(&trip(10.0, -1.0));
        let series = builder.finish(Locale::Es);
        assert_eq!(series.scatter, vec![ScatterPoint { x: 10.0, y: 10.0, fuel: 0.0 }]);
    }
}
