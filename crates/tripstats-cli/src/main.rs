use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use tripstats_core::prelude::*;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match cli.command {
        Commands::Summary {
            data,
            settings,
            locale,
            month,
            from,
            to,
            summary_only,
        } => {
            let filter = match (month, from, to) {
                (Some(month), _, _) => TripFilter::Month { month },
                (None, None, None) => TripFilter::All,
                (None, from, to) => TripFilter::Range { from, to },
            };
            run_summary(&data, settings.as_deref(), &locale, filter, summary_only).await
        }
        Commands::Soh {
            data,
            settings,
            as_of,
        } => run_soh(&data, settings.as_deref(), as_of),
        Commands::Charges { data } => {
            let dataset = load_dataset(&data)?;
            print_json(&summarize_charges(&dataset.charges))
        }
        Commands::InitialSoc {
            data,
            settings,
            odometer,
            efficiency,
        } => run_initial_soc(&data, settings.as_deref(), odometer, efficiency),
        Commands::Demo {
            days,
            seed,
            start,
            output,
        } => run_demo(days, seed, start, output),
    }
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    Dataset::load(path).with_context(|| format!("Failed to load dataset {}", path.display()))
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_summary(
    data: &Path,
    settings: Option<&Path>,
    locale: &str,
    filter: TripFilter,
    summary_only: bool,
) -> Result<()> {
    let dataset = load_dataset(data)?;
    let settings = load_settings(settings)?;
    let trips = filter.apply(&dataset.trips, settings.utc_offset_minutes);
    tracing::info!(
        selected = trips.len(),
        total = dataset.trips.len(),
        "Aggregating trips"
    );

    let processor = DataProcessor::new();
    let result = processor
        .process(ProcessRequest {
            trips,
            charges: dataset.charges,
            settings,
            locale: locale.to_string(),
        })
        .await
        .context("Aggregation failed")?;

    match result {
        None => {
            tracing::info!("No trips to aggregate");
            print_json(&serde_json::Value::Null)
        }
        Some(result) if summary_only => print_json(&result.summary),
        Some(result) => print_json(&result),
    }
}

fn run_soh(data: &Path, settings: Option<&Path>, as_of: Option<NaiveDate>) -> Result<()> {
    let dataset = load_dataset(data)?;
    let settings = load_settings(settings)?;
    let as_of = as_of
        .or(settings.reference_date)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or_else(Utc::now);

    if settings.mfg_date.is_none() {
        tracing::warn!("No manufacturing date configured; reporting the baseline estimate");
    }
    let result = estimate_soh_at(
        &dataset.charges,
        settings.mfg_date.as_deref(),
        settings.battery_size,
        &settings.charger_types,
        settings.thermal_factor(),
        as_of,
    );
    print_json(&result)
}

fn run_initial_soc(
    data: &Path,
    settings: Option<&Path>,
    odometer: f64,
    efficiency: Option<f64>,
) -> Result<()> {
    let dataset = load_dataset(data)?;
    let settings = load_settings(settings)?;

    let Some(previous) = latest_electric(&dataset.charges, settings.utc_offset_minutes) else {
        anyhow::bail!("Dataset has no electric charge to project from");
    };
    let efficiency = match efficiency {
        Some(eff) => eff,
        None => {
            let trips = TripFilter::All.apply(&dataset.trips, settings.utc_offset_minutes);
            aggregate(&trips, &[], &settings, "en")
                .map(|r| r.summary.avg_eff)
                .unwrap_or(0.0)
        }
    };

    let soc = estimate_initial_soc(previous, odometer, efficiency, settings.battery_size);
    if soc.is_none() {
        tracing::info!(efficiency, "Initial state of charge is unknown");
    }
    print_json(&soc)
}

fn run_demo(
    days: u32,
    seed: Option<u64>,
    start: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<()> {
    let start =
        start.unwrap_or_else(|| Utc::now().date_naive() - Duration::days(i64::from(days)));
    let mut generator = match seed {
        Some(seed) => DemoGenerator::with_seed(seed),
        None => DemoGenerator::new(),
    };
    let dataset = generator.generate(start, days);

    match output {
        Some(path) => {
            dataset
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                trips = dataset.trips.len(),
                charges = dataset.charges.len(),
                "Wrote demo dataset to {}",
                path.display()
            );
            Ok(())
        }
        None => print_json(&dataset),
    }
}
