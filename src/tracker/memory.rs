//! In-process tracker backed by an [`ExperimentStore`].
//!
//! Stands in for the remote service in tests and offline runs. Data is lost
//! when the last handle is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::Tracker;
use crate::experiment::{ArtifactRecord, ExperimentStore, MetricRecord, RunRecord};
use crate::Result;

#[derive(Debug, Default)]
struct MemoryState {
    store: ExperimentStore,
    next_step: HashMap<String, u64>,
}

/// Tracker that records into memory.
///
/// Clones share the same store, so a test can hand one handle to a
/// [`crate::Session`] and inspect the recorded data through another.
///
/// Unindexed metrics are placed at the run's current step, which then
/// advances by one. A metric with an explicit step `s` moves the current
/// step to `s + 1`.
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTracker {
    /// Create a tracker with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the recorded data.
    pub fn with_store<R>(&self, f: impl FnOnce(&ExperimentStore) -> R) -> R {
        f(&self.lock().store)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tracker for MemoryTracker {
    fn init(&mut self, run: &RunRecord) -> Result<()> {
        let mut state = self.lock();
        state.next_step.insert(run.run_id().to_string(), 0);
        state.store.put_run(run.clone());
        debug!(run = run.run_id(), "memory tracker: run opened");
        Ok(())
    }

    fn log(&mut self, metric: &MetricRecord) -> Result<()> {
        let mut state = self.lock();
        let next = state
            .next_step
            .entry(metric.run_id().to_string())
            .or_insert(0);
        let step = metric.step().unwrap_or(*next);
        *next = step.saturating_add(1);
        state.store.add_metric(metric.at_step(step));
        Ok(())
    }

    fn log_artifact(&mut self, artifact: &ArtifactRecord) -> Result<()> {
        self.lock().store.add_artifact(artifact.clone());
        Ok(())
    }

    fn finish(&mut self, run: &RunRecord, summary: &serde_json::Value) -> Result<()> {
        let mut state = self.lock();
        state.store.put_run(run.clone());
        state.store.set_summary(run.run_id(), summary.clone());
        debug!(run = run.run_id(), status = ?run.status(), "memory tracker: run closed");
        Ok(())
    }
}
