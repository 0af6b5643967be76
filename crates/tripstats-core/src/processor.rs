//! Background aggregation
//!
//! Runs [`aggregate`] on Tokio's blocking pool so it never stalls the caller's
//! async tasks. Requests are numbered; when a newer request is submitted
//! before an older one finishes, the older result is reported as superseded
//! and should be dropped (last write wins).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::aggregate::{aggregate, AggregateResult};
use crate::config::Settings;
use crate::model::{Charge, Trip};

/// Errors reported by [`DataProcessor`]
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// A newer request was submitted while this one was running
    #[error("Result superseded: request {generation} finished after request {latest} was submitted")]
    Superseded {
        /// Number of the stale request
        generation: u64,
        /// Number of the newest request
        latest: u64,
    },

    /// The blocking task panicked or was cancelled
    #[error("Aggregation task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Owned inputs for one aggregation
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    /// Trips to aggregate, already filtered
    pub trips: Vec<Trip>,
    /// Charge history for pricing and battery health
    pub charges: Vec<Charge>,
    /// Engine settings
    pub settings: Settings,
    /// Label language tag
    pub locale: String,
}

/// An aggregation running in the background
pub struct PendingResult {
    generation: u64,
    latest: Arc<AtomicU64>,
    handle: JoinHandle<Option<AggregateResult>>,
}

impl PendingResult {
    /// Request number assigned at submission
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the result. Fails with [`ProcessorError::Superseded`] when a
    /// newer request was submitted in the meantime.
    pub async fn result(self) -> Result<Option<AggregateResult>, ProcessorError> {
        let output = self.handle.await?;
        let latest = self.latest.load(Ordering::SeqCst);
        if latest != self.generation {
            tracing::debug!(generation = self.generation, latest, "Dropping stale aggregation");
            return Err(ProcessorError::Superseded {
                generation: self.generation,
                latest,
            });
        }
        Ok(output)
    }
}

/// Hands aggregation requests to a blocking worker
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    latest: Arc<AtomicU64>,
}

impl DataProcessor {
    /// Create a processor with no requests yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the most recent request
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start aggregating in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, request: ProcessRequest) -> PendingResult {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, trips = request.trips.len(), "Submitting aggregation");
        let handle = tokio::task::spawn_blocking(move || {
            aggregate(
                &request.trips,
                &request.charges,
                &request.settings,
                &request.locale,
            )
        });
        PendingResult {
            generation,
            latest: Arc::clone(&self.latest),
            handle,
        }
    }

    /// Submit and wait in one step
    pub async fn process(
        &self,
        request: ProcessRequest,
    ) -> Result<Option<AggregateResult>, ProcessorError> {
        self.submit(request).result().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(km: f64) -> ProcessRequest {
        ProcessRequest {
            trips: vec![Trip {
                distance_km: km,
                energy_kwh: km * 0.15,
                duration_seconds: 1800.0,
                date: Some("20250110".into()),
                ..Default::default()
            }],
            locale: "en".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_process_returns_result() {
        let processor = DataProcessor::new();
        let result = processor.process(request(20.0)).await.unwrap().unwrap();
        assert_eq!(result.summary.total_km, 20.0);
        assert_eq!(processor.latest_generation(), 1);
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let processor = DataProcessor::new();
        let first = processor.submit(request(10.0));
        let second = processor.submit(request(30.0));
        assert_eq!(first.generation(), 1);
        assert_eq!(second.generation(), 2);

        match first.result().await {
            Err(ProcessorError::Superseded { generation, latest }) => {
                assert_eq!(generation, 1);
                assert_eq!(latest, 2);
            }
            other => panic!("expected superseded, got {:?}", other.map(|r| r.is_some())),
        }

        let latest = second.result().await.unwrap().unwrap();
        assert_eq!(latest.summary.total_km, 30.0);
    }

    #[tokio::test]
    async fn test_empty_input_is_no_data() {
        let processor = DataProcessor::new();
        let result = processor.process(ProcessRequest::default()).await.unwrap();
        assert!(result.is_none());
    }
}
