//! Tracking backends
//!
//! A [`Tracker`] receives everything a [`crate::Session`] forwards: run
//! start, logged metrics, artifact records and run finish. Calls are
//! blocking and failures propagate to the session caller unchanged; no
//! backend retries.
//!
//! # Example
//!
//! ```rust
//! use artifact_sink::experiment::{MetricRecord, RunRecord};
//! use artifact_sink::tracker::{MemoryTracker, Tracker};
//!
//! # fn example() -> artifact_sink::Result<()> {
//! let mut tracker = MemoryTracker::new();
//! let mut run = RunRecord::new("run-1", "proj", "team");
//! run.start();
//!
//! tracker.init(&run)?;
//! tracker.log(&MetricRecord::new("run-1", "loss", None, 0.7))?;
//! assert_eq!(tracker.with_store(|store| store.metric_count()), 1);
//! # Ok(())
//! # }
//! ```

mod http;
mod memory;

pub use http::{HttpTracker, HttpTrackerConfig, HttpTrackerConfigBuilder};
pub use memory::MemoryTracker;

use crate::experiment::{ArtifactRecord, MetricRecord, RunRecord};
use crate::Result;

/// Destination for run lifecycle events, metrics and artifact records.
pub trait Tracker {
    /// Open the run on the backend.
    ///
    /// Called once, with the run already in `Running` status.
    fn init(&mut self, run: &RunRecord) -> Result<()>;

    /// Record one metric.
    fn log(&mut self, metric: &MetricRecord) -> Result<()>;

    /// Record an artifact written to local disk.
    fn log_artifact(&mut self, artifact: &ArtifactRecord) -> Result<()>;

    /// Close the run.
    ///
    /// Called once, with the run in its final status. `summary` is the
    /// session's metadata map.
    fn finish(&mut self, run: &RunRecord, summary: &serde_json::Value) -> Result<()>;

    /// Record several metrics in order.
    ///
    /// Stops at the first failure; earlier metrics stay recorded.
    fn log_batch(&mut self, metrics: &[MetricRecord]) -> Result<()> {
        for metric in metrics {
            self.log(metric)?;
        }
        Ok(())
    }
}

impl<T: Tracker + ?Sized> Tracker for Box<T> {
    fn init(&mut self, run: &RunRecord) -> Result<()> {
        (**self).init(run)
    }

    fn log(&mut self, metric: &MetricRecord) -> Result<()> {
        (**self).log(metric)
    }

    fn log_artifact(&mut self, artifact: &ArtifactRecord) -> Result<()> {
        (**self).log_artifact(artifact)
    }

    fn finish(&mut self, run: &RunRecord, summary: &serde_json::Value) -> Result<()> {
        (**self).finish(run, summary)
    }

    fn log_batch(&mut self, metrics: &[MetricRecord]) -> Result<()> {
        (**self).log_batch(metrics)
    }
}
