//! Experiment Tracking Schema
//!
//! The records a [`crate::Session`] hands to its [`crate::tracker::Tracker`].
//!
//! ## Schema Overview
//!
//! ```text
//! RunRecord (1) ──┬──< MetricRecord (N)   [scalar | array | image, optional step]
//!                 └──< ArtifactRecord (N) [npz | object file on disk]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use artifact_sink::experiment::{MetricRecord, RunRecord, RunStatus};
//!
//! // Start a run
//! let mut run = RunRecord::new("run-001", "my-project", "my-team");
//! run.start();
//!
//! // Log metrics
//! let metric = MetricRecord::new(run.run_id(), "loss", Some(0), 0.5);
//!
//! // Complete the run
//! run.complete(RunStatus::Success);
//! ```

mod artifact_record;
mod metric_record;
mod run_record;
mod store;

pub use artifact_record::{ArtifactKind, ArtifactRecord};
pub use metric_record::{MetricRecord, MetricRecordBuilder, MetricValue};
pub use run_record::{RunRecord, RunRecordBuilder, RunStatus};
pub use store::ExperimentStore;
