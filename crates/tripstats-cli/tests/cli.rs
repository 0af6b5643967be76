//! End-to-end tests for the `tripstats` binary

use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn tripstats(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tripstats"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("TRIPSTATS_SETTINGS")
        .env_remove("TRIPSTATS_LOCALE")
        .output()
        .expect("failed to run tripstats");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

fn write_export(dir: &Path) -> String {
    let path = dir.join("export.json");
    let export = serde_json::json!({
        "trips": [
            { "trip": 100, "electricity": 15, "duration": 3600, "date": "20240101" },
            { "trip": "20.5", "electricity": "3.1", "duration": 1500, "date": "20240215" }
        ],
        "charges": [
            { "kwhCharged": 50, "speedKw": 11, "finalPercentage": 100, "odometer": 1000 }
        ]
    });
    std::fs::write(&path, export.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_summary_for_one_month() {
    let dir = tempdir().unwrap();
    let data = write_export(dir.path());

    let (ok, stdout) = tripstats(&["summary", "--data", &data, "--month", "202401", "--summary-only"]);
    assert!(ok);
    let summary: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["totalKm"], 100.0);
    assert_eq!(summary["avgEff"], 15.0);
    assert_eq!(summary["tripsCount"], 1);
}

#[test]
fn test_summary_without_matching_trips_prints_null() {
    let dir = tempdir().unwrap();
    let data = write_export(dir.path());

    let (ok, stdout) = tripstats(&["summary", "--data", &data, "--month", "199001"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_demo_output_can_be_summarized() {
    let dir = tempdir().unwrap();
    let demo = dir.path().join("demo.json");
    let demo = demo.to_string_lossy();

    let (ok, _) = tripstats(&[
        "demo", "--days", "20", "--seed", "5", "--start", "2025-01-06", "--output", &demo,
    ]);
    assert!(ok);

    let (ok, stdout) = tripstats(&["charges", "--data", &demo]);
    assert!(ok);
    let charges: Value = serde_json::from_str(&stdout).unwrap();
    assert!(charges["chargeCount"].as_u64().unwrap() > 0);
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let (ok, _) = tripstats(&["charges", "--data", &missing.to_string_lossy()]);
    assert!(!ok);
}

#[test]
fn test_initial_soc_uses_latest_charge_and_live_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    let export = serde_json::json!({
        "trips": [
            { "trip": 100, "electricity": 15, "duration": 3600, "date": "20250301" },
            { "trip": 100, "electricity": 60, "duration": 3600, "date": "20250302", "is_deleted": 1 }
        ],
        "charges": [
            { "date": "2025-03-10", "kwhCharged": 30, "finalPercentage": 80, "odometer": 1000 },
            { "date": "2025-02-01", "kwhCharged": 30, "finalPercentage": 20, "odometer": 500 }
        ]
    });
    std::fs::write(&path, export.to_string()).unwrap();

    // 100 km at 15 kWh/100km on 60.48 kWh is 24.8 points below 80%
    let (ok, stdout) = tripstats(&[
        "initial-soc",
        "--data",
        &path.to_string_lossy(),
        "--odometer",
        "1100",
    ]);
    assert!(ok);
    assert_eq!(stdout.trim(), "55");
}
