use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tripstats")]
#[command(about = "Trip statistics and battery health for EV / PHEV exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate trips into dashboard statistics
    Summary {
        /// Dataset export (JSON with `trips` and `charges`)
        #[arg(short, long)]
        data: PathBuf,

        /// Settings file
        #[arg(short, long, env = "TRIPSTATS_SETTINGS")]
        settings: Option<PathBuf>,

        /// Label language (es, en, fr, de, pt, it)
        #[arg(short, long, default_value = "es", env = "TRIPSTATS_LOCALE")]
        locale: String,

        /// Only trips of this month (YYYYMM)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// First day to include (YYYY-MM-DD or YYYYMMDD)
        #[arg(long)]
        from: Option<String>,

        /// Last day to include (YYYY-MM-DD or YYYYMMDD)
        #[arg(long)]
        to: Option<String>,

        /// Print only the summary block
        #[arg(long)]
        summary_only: bool,
    },

    /// Estimate battery state of health from the charging history
    Soh {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long, env = "TRIPSTATS_SETTINGS")]
        settings: Option<PathBuf>,

        /// Evaluate calendar aging on this date instead of today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Totals over the charging history
    Charges {
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Project the state of charge at the start of a new session
    InitialSoc {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long, env = "TRIPSTATS_SETTINGS")]
        settings: Option<PathBuf>,

        /// Current odometer reading (km)
        #[arg(long)]
        odometer: f64,

        /// Consumption in kWh/100km (defaults to the trip average)
        #[arg(long)]
        efficiency: Option<f64>,
    },

    /// Generate a synthetic dataset
    Demo {
        /// Number of days to simulate
        #[arg(long, default_value = "90")]
        days: u32,

        /// Seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,

        /// First simulated day (defaults to `days` ago)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
