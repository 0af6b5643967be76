//! # TripStats Core Library
//!
//! Analytics engine for the TripStats EV / PHEV trip dashboard.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Lenient decoding of vehicle database exports (trips and charges)
//! - Trip aggregation: summary, time-series rollups, histograms, records
//! - Per-trip cost estimation (custom, average and dynamic pricing)
//! - Battery state-of-health estimation from charging history
//! - Background processing with last-request-wins semantics
//! - Localized period labels and a demo dataset generator
//!
//! ## Example
//!
//! ```rust,ignore
//! use tripstats_core::prelude::*;
//!
//! let data = Dataset::load("export.json")?;
//! let settings = Settings::load("settings.json")?;
//!
//! let trips = TripFilter::All.apply(&data.trips, settings.utc_offset_minutes);
//! if let Some(result) = aggregate(&trips, &data.charges, &settings, "en") {
//!     println!("{} km at {} kWh/100km", result.summary.total_km, result.summary.avg_eff);
//! }
//! ```

pub mod aggregate;
pub mod battery;
pub mod charges;
pub mod coerce;
pub mod config;
pub mod dates;
pub mod demo;
pub mod filter;
pub mod labels;
pub mod model;
pub mod pricing;
pub mod processor;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregate::{aggregate, AggregateResult, Summary, TopRecords};
    pub use crate::battery::{estimate_initial_soc, estimate_soh, estimate_soh_at, SohResult};
    pub use crate::charges::{latest_electric, summarize as summarize_charges, ChargeSummary};
    pub use crate::config::{ConfigError, Settings, SohMode};
    pub use crate::demo::DemoGenerator;
    pub use crate::filter::TripFilter;
    pub use crate::labels::Locale;
    pub use crate::model::{Charge, ChargeKind, ChargerType, Dataset, Trip};
    pub use crate::pricing::{PriceBook, PriceStrategy, TripCost};
    pub use crate::processor::{DataProcessor, ProcessRequest, ProcessorError};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
