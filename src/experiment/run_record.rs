//! Run Record - one tracked execution, from start to finish

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run is created but not yet started.
    Pending,
    /// Run is accepting log calls.
    Running,
    /// Run completed successfully.
    Success,
    /// Run failed with an error.
    Failed,
    /// Run was cancelled by user or system.
    Cancelled,
}

impl RunStatus {
    /// Whether the run has reached a final status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Cancelled)
    }
}

/// Run Record identifies a run on the tracking service and tracks its
/// lifecycle.
///
/// A run is addressed by `entity / project / run_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    run_id: String,
    project: String,
    entity: String,
    status: RunStatus,
    config: Option<serde_json::Value>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Create a new run record in Pending status.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Run name, unique within the project
    /// * `project` - Project the run belongs to
    /// * `entity` - Owning team or user account
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        project: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            project: project.into(),
            entity: entity.into(),
            status: RunStatus::Pending,
            config: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Create a builder for constructing a run record with optional fields.
    #[must_use]
    pub fn builder(
        run_id: impl Into<String>,
        project: impl Into<String>,
        entity: impl Into<String>,
    ) -> RunRecordBuilder {
        RunRecordBuilder::new(run_id, project, entity)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the project.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Get the owning entity.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the run configuration, if any.
    #[must_use]
    pub const fn config(&self) -> Option<&serde_json::Value> {
        self.config.as_ref()
    }

    /// Get the start timestamp, if the run has started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the run has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Start the run, transitioning from Pending to Running.
    ///
    /// Sets the `started_at` timestamp to now.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Complete the run with the given final status.
    ///
    /// Sets the `ended_at` timestamp to now.
    ///
    /// # Arguments
    ///
    /// * `status` - Final status (Success, Failed, or Cancelled)
    pub fn complete(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder {
    run_id: String,
    project: String,
    entity: String,
    config: Option<serde_json::Value>,
}

impl RunRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        project: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            project: project.into(),
            entity: entity.into(),
            config: None,
        }
    }

    /// Set the run configuration.
    #[must_use]
    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord {
        RunRecord {
            run_id: self.run_id,
            project: self.project,
            entity: self.entity,
            status: RunStatus::Pending,
            config: self.config,
            started_at: None,
            ended_at: None,
        }
    }
}
