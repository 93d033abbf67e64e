//! Experiment Store - in-memory storage for experiment tracking data
//!
//! Backs [`crate::tracker::MemoryTracker`] and is useful on its own for
//! inspecting what a run logged.

use std::collections::HashMap;

use super::{ArtifactRecord, MetricRecord, RunRecord};

/// In-memory store for experiment tracking data.
///
/// ## Design
///
/// Runs are keyed by run ID for O(1) lookups. Metrics and artifacts are
/// kept in insertion order and filtered on query.
///
/// ## Time-Series Optimization
///
/// The `get_metrics_for_run` function returns metrics ordered by step,
/// enabling time-series visualization and analysis.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    runs: HashMap<String, RunRecord>,
    metrics: Vec<MetricRecord>,
    artifacts: Vec<ArtifactRecord>,
    summaries: HashMap<String, serde_json::Value>,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty (no runs, metrics, or artifacts).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.metrics.is_empty() && self.artifacts.is_empty()
    }

    /// Get the number of runs in the store.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Get the number of metrics in the store.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    /// Get the number of artifacts in the store.
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Add or replace a run.
    pub fn put_run(&mut self, run: RunRecord) {
        self.runs.insert(run.run_id().to_string(), run);
    }

    /// Get a run by ID.
    #[must_use]
    pub fn get_run(&self, run_id: &str) -> Option<&RunRecord> {
        self.runs.get(run_id)
    }

    /// Get all runs for a project.
    #[must_use]
    pub fn get_runs_for_project(&self, project: &str) -> Vec<&RunRecord> {
        self.runs
            .values()
            .filter(|run| run.project() == project)
            .collect()
    }

    /// Add a metric to the store.
    pub fn add_metric(&mut self, metric: MetricRecord) {
        self.metrics.push(metric);
    }

    /// Get metrics for a specific run and key, ordered by step.
    ///
    /// Unindexed metrics sort before indexed ones; ties keep insertion order.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use artifact_sink::experiment::{ExperimentStore, MetricRecord};
    ///
    /// let mut store = ExperimentStore::new();
    ///
    /// // Log some training metrics
    /// for step in 0..100u64 {
    ///     let loss = 1.0 / (step as f64 + 1.0);
    ///     store.add_metric(MetricRecord::new("run-001", "loss", Some(step), loss));
    /// }
    ///
    /// // Query the loss curve
    /// let loss_metrics = store.get_metrics_for_run("run-001", "loss");
    /// assert_eq!(loss_metrics.len(), 100);
    /// ```
    #[must_use]
    pub fn get_metrics_for_run(&self, run_id: &str, key: &str) -> Vec<MetricRecord> {
        let mut metrics: Vec<MetricRecord> = self
            .metrics
            .iter()
            .filter(|m| m.run_id() == run_id && m.key() == key)
            .cloned()
            .collect();

        // Stable sort: equal steps keep log order
        metrics.sort_by_key(MetricRecord::step);

        metrics
    }

    /// Every metric logged for a run, in log order.
    #[must_use]
    pub fn all_metrics_for_run(&self, run_id: &str) -> Vec<&MetricRecord> {
        self.metrics
            .iter()
            .filter(|m| m.run_id() == run_id)
            .collect()
    }

    /// Add an artifact record.
    pub fn add_artifact(&mut self, artifact: ArtifactRecord) {
        self.artifacts.push(artifact);
    }

    /// Artifacts recorded for a run, in save order.
    #[must_use]
    pub fn get_artifacts_for_run(&self, run_id: &str) -> Vec<&ArtifactRecord> {
        self.artifacts
            .iter()
            .filter(|a| a.run_id() == run_id)
            .collect()
    }

    /// Store the final summary of a run.
    pub fn set_summary(&mut self, run_id: impl Into<String>, summary: serde_json::Value) {
        self.summaries.insert(run_id.into(), summary);
    }

    /// Final summary of a run, if it finished.
    #[must_use]
    pub fn get_summary(&self, run_id: &str) -> Option<&serde_json::Value> {
        self.summaries.get(run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ArtifactKind;

    #[test]
    fn test_store_default() {
        let store = ExperimentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.run_count(), 0);
        assert_eq!(store.metric_count(), 0);
        assert_eq!(store.artifact_count(), 0);
    }

    #[test]
    fn test_store_add_and_get() {
        let mut store = ExperimentStore::new();

        store.put_run(RunRecord::new("run-1", "proj", "team"));
        store.add_metric(MetricRecord::new("run-1", "loss", Some(0), 0.5));
        store.add_artifact(ArtifactRecord::new(
            "run-1",
            "w",
            ArtifactKind::Npz,
            "w.npz",
            10,
        ));

        assert!(!store.is_empty());
        assert!(store.get_run("run-1").is_some());
        assert_eq!(store.get_runs_for_project("proj").len(), 1);
        assert!(store.get_runs_for_project("other").is_empty());
        assert_eq!(store.get_artifacts_for_run("run-1").len(), 1);
    }

    #[test]
    fn test_get_metrics_for_run_ordering() {
        let mut store = ExperimentStore::new();

        // Add out of order
        store.add_metric(MetricRecord::new("run-1", "loss", Some(2), 0.2));
        store.add_metric(MetricRecord::new("run-1", "loss", Some(0), 0.0));
        store.add_metric(MetricRecord::new("run-1", "loss", Some(1), 0.1));
        store.add_metric(MetricRecord::new("run-1", "acc", Some(1), 0.9));

        let metrics = store.get_metrics_for_run("run-1", "loss");

        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0].step(), Some(0));
        assert_eq!(metrics[1].step(), Some(1));
        assert_eq!(metrics[2].step(), Some(2));
        assert_eq!(store.all_metrics_for_run("run-1").len(), 4);
    }

    #[test]
    fn test_put_run_replaces() {
        let mut store = ExperimentStore::new();
        let mut run = RunRecord::new("run-1", "proj", "team");
        store.put_run(run.clone());
        run.start();
        store.put_run(run);

        assert_eq!(store.run_count(), 1);
        assert_eq!(
            store.get_run("run-1").map(RunRecord::status),
            Some(crate::experiment::RunStatus::Running)
        );
    }
}
