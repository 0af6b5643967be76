//! Tests for trip aggregation

use pretty_assertions::assert_eq;
use serde_json::Value;
use tripstats_core::aggregate::{aggregate, TOP_N};
use tripstats_core::config::Settings;
use tripstats_core::demo::DemoGenerator;
use tripstats_core::filter::TripFilter;
use tripstats_core::model::Trip;
use tripstats_core::pricing::PriceStrategy;

fn trip(km: f64, kwh: f64, seconds: f64, date: &str) -> Trip {
    Trip {
        distance_km: km,
        energy_kwh: kwh,
        duration_seconds: seconds,
        date: Some(date.to_string()),
        ..Default::default()
    }
}

/// Paths of every JSON null below `value`
fn null_paths(value: &Value, path: String, out: &mut Vec<String>) {
    match value {
        Value::Null => out.push(path),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                null_paths(item, format!("{path}[{i}]"), out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                null_paths(item, child, out);
            }
        }
        _ => {}
    }
}

#[test]
fn test_single_trip_end_to_end() {
    let trips = vec![trip(100.0, 15.0, 3600.0, "20240101")];
    let result = aggregate(&trips, &[], &Settings::default(), "en").unwrap();
    let s = &result.summary;

    assert_eq!(s.total_km, 100.0);
    assert_eq!(s.total_kwh, 15.0);
    assert_eq!(s.avg_eff, 15.0);
    assert_eq!(s.avg_speed, 100.0);
    assert_eq!(s.trips_count, 1);
    assert_eq!(s.active_days, 1);
    assert_eq!(s.total_days, 1);
    assert!(!result.is_hybrid);

    assert_eq!(result.monthly.len(), 1);
    assert_eq!(result.monthly[0].key, "202401");
    assert_eq!(result.monthly[0].label, "Jan 2024");
    assert_eq!(result.daily.len(), 1);
    assert_eq!(result.daily[0].efficiency, 15.0);
    assert_eq!(result.trip_dist[4].count, 1);
}

#[test]
fn test_no_data_sentinel() {
    let settings = Settings::default();
    assert!(aggregate(&[], &[], &settings, "es").is_none());

    let negative = vec![trip(-1.0, 2.0, 60.0, "20240101"), trip(-5.0, 0.0, 0.0, "20240102")];
    assert!(aggregate(&negative, &[], &settings, "es").is_none());
}

#[test]
fn test_negative_rows_are_ignored() {
    let trips = vec![trip(-1.0, 2.0, 60.0, "20240101"), trip(10.0, 1.5, 600.0, "20240102")];
    let result = aggregate(&trips, &[], &Settings::default(), "es").unwrap();
    assert_eq!(result.summary.trips_count, 1);
    assert_eq!(result.summary.total_kwh, 1.5);
}

#[test]
fn test_aggregation_is_deterministic() {
    let data = DemoGenerator::with_seed(11).generate(
        chrono::NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        45,
    );
    let settings = Settings {
        mfg_date: Some("2023-01-15".into()),
        reference_date: chrono::NaiveDate::from_ymd_opt(2025, 5, 1),
        electric_strategy: PriceStrategy::Dynamic,
        electric_price: 0.2,
        utc_offset_minutes: 60,
        ..Default::default()
    };

    let first = aggregate(&data.trips, &data.charges, &settings, "de");
    let second = aggregate(&data.trips, &data.charges, &settings, "de");
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn test_degenerate_inputs_never_produce_nan() {
    let trips = vec![
        trip(0.0, 0.0, 0.0, "20240101"),
        trip(0.6, 5.0, 0.0, "20240102"),
        Trip {
            distance_km: 3.0,
            ..Default::default()
        },
    ];
    let settings = Settings {
        battery_size: 0.0,
        ..Default::default()
    };
    let result = aggregate(&trips, &[], &settings, "es").unwrap();

    let json = serde_json::to_value(&result).unwrap();
    let mut nulls = Vec::new();
    null_paths(&json, String::new(), &mut nulls);
    // Only the absent battery estimate may be null
    assert_eq!(nulls, vec!["summary.sohData".to_string()]);
    assert_eq!(result.summary.estimated_range, 0.0);
}

#[test]
fn test_top_lists_are_stable_and_capped() {
    let trips: Vec<Trip> = (0..15)
        .map(|i| trip(if i % 2 == 0 { 20.0 } else { 10.0 }, 2.0, 600.0, "20240105"))
        .collect();
    let result = aggregate(&trips, &[], &Settings::default(), "es").unwrap();

    assert_eq!(result.top.km.len(), TOP_N);
    let indices: Vec<usize> = result.top.km.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 2, 4, 6, 8, 10, 12, 14, 1, 3]);
    // Equal energy everywhere: input order is kept
    let kwh: Vec<usize> = result.top.kwh.iter().map(|r| r.index).collect();
    assert_eq!(kwh, (0..TOP_N).collect::<Vec<_>>());
    assert!(result.top.fuel.is_empty());
}

#[test]
fn test_hybrid_detection_and_fuel_records() {
    let mut hybrid = trip(80.0, 4.0, 3600.0, "20240110");
    hybrid.fuel_liters = 3.2;
    let trips = vec![trip(20.0, 3.0, 1200.0, "20240110"), hybrid];
    let settings = Settings {
        fuel_price: 1.5,
        electric_price: 0.2,
        ..Default::default()
    };
    let result = aggregate(&trips, &[], &settings, "es").unwrap();
    let s = &result.summary;

    assert!(result.is_hybrid);
    assert_eq!(s.total_fuel, 3.2);
    assert_eq!(s.avg_fuel_eff, 3.2);
    assert_eq!(s.electric_only_km, 20.0);
    assert_eq!(s.fuel_used_km, 80.0);
    assert_eq!(s.electric_percentage, 20.0);
    assert_eq!(s.ev_mode_usage, 50.0);
    assert_eq!(s.fuel_cost, 4.8);
    assert_eq!(s.electric_cost, 1.4);
    assert_eq!(s.total_cost, 6.2);
    assert_eq!(result.top.fuel.len(), 1);
    assert_eq!(result.top.fuel[0].index, 1);
}

#[test]
fn test_hour_and_weekday_use_local_time() {
    // 2024-01-07 23:30 UTC is Monday 00:30 at UTC+1
    let trips = vec![Trip {
        distance_km: 12.0,
        energy_kwh: 2.0,
        duration_seconds: 900.0,
        start_timestamp: Some(1_704_670_200),
        ..Default::default()
    }];
    let settings = Settings {
        utc_offset_minutes: 60,
        ..Default::default()
    };
    let result = aggregate(&trips, &[], &settings, "en").unwrap();

    assert_eq!(result.hourly.len(), 24);
    assert_eq!(result.hourly[0].trips, 1);
    assert_eq!(result.weekday[0].day, "mon");
    assert_eq!(result.weekday[0].trips, 1);
    assert_eq!(result.daily[0].key, "20240108");
}

#[test]
fn test_filtered_aggregation() {
    let trips = vec![
        trip(10.0, 1.5, 600.0, "20240115"),
        trip(30.0, 4.5, 1800.0, "20240203"),
        trip(50.0, 7.5, 2400.0, "20240228"),
    ];
    let february = TripFilter::Month {
        month: "202402".into(),
    }
    .apply(&trips, 0);
    let result = aggregate(&february, &[], &Settings::default(), "es").unwrap();

    assert_eq!(result.summary.total_km, 80.0);
    assert_eq!(result.summary.active_days, 2);
    assert_eq!(result.summary.date_range, "03/02/2024 - 28/02/2024");
    assert_eq!(result.monthly[0].label, "Feb 2024");
}
