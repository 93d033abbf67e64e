//! Metrics Sink - one tracked run
//!
//! A [`Session`] owns a [`Tracker`] and a [`RunRecord`]. It forwards metrics,
//! arrays, tensors and images to the tracker and saves artifacts under the
//! configured output directory:
//!
//! ```text
//! {output_dir}[/{subdir}]/{prefix}_{data_name}.npz
//! {output_dir}[/{subdir}]/{prefix}_{data_name}.json
//! ```
//!
//! Once finished, the session rejects every further call with
//! [`Error::SessionFinished`].
//!
//! ```rust
//! use artifact_sink::array::Array;
//! use artifact_sink::tracker::MemoryTracker;
//! use artifact_sink::{Session, SessionConfig};
//!
//! # fn main() -> artifact_sink::Result<()> {
//! # let dir = std::env::temp_dir().join("artifact-sink-session-doc");
//! let config = SessionConfig::builder("my-project", "run-1", "my-team")
//!     .output_dir(&dir)
//!     .file_prefix("exp1")
//!     .build();
//! let mut session = Session::start(config, MemoryTracker::new())?;
//!
//! session.log_metric("loss", 0.42, Some(1))?;
//! let path = session.save_array_to_npz(&Array::from_vec(vec![1.0f32, 2.0]), "weights", None)?;
//! assert!(path.ends_with("exp1_weights.npz"));
//!
//! session.finish()?;
//! assert!(session.log_metric("loss", 0.1, None).is_err());
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::array::{Array, ToHostArray};
use crate::artifact::{ArtifactWriter, OutputLocation};
use crate::experiment::{ArtifactKind, ArtifactRecord, MetricRecord, MetricValue, RunRecord, RunStatus};
use crate::image::Image;
use crate::npz::Compression;
use crate::tracker::Tracker;
use crate::{Error, Result};

/// Settings for a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    project: String,
    run_name: String,
    entity: String,
    #[serde(default)]
    config: Option<serde_json::Value>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default)]
    file_prefix: Option<String>,
    #[serde(default)]
    compression: Compression,
}

impl SessionConfig {
    /// Create a builder with the run's identity.
    #[must_use]
    pub fn builder(
        project: impl Into<String>,
        run_name: impl Into<String>,
        entity: impl Into<String>,
    ) -> SessionConfigBuilder {
        SessionConfigBuilder::new(project, run_name, entity)
    }

    /// Parse settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON or missing fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Project identifier.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Run identifier.
    #[must_use]
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Owning entity.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Default artifact directory, if any.
    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Artifact filename prefix, if any.
    #[must_use]
    pub fn file_prefix(&self) -> Option<&str> {
        self.file_prefix.as_deref()
    }
}

/// Builder for `SessionConfig`.
#[derive(Debug)]
pub struct SessionConfigBuilder {
    inner: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        run_name: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            inner: SessionConfig {
                project: project.into(),
                run_name: run_name.into(),
                entity: entity.into(),
                config: None,
                output_dir: None,
                file_prefix: None,
                compression: Compression::default(),
            },
        }
    }

    /// Attach the run configuration (hyperparameters etc.).
    #[must_use]
    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.inner.config = Some(config);
        self
    }

    /// Default directory for saved artifacts.
    #[must_use]
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.inner.output_dir = Some(output_dir.into());
        self
    }

    /// Prefix for artifact file stems.
    #[must_use]
    pub fn file_prefix(mut self, file_prefix: impl Into<String>) -> Self {
        self.inner.file_prefix = Some(file_prefix.into());
        self
    }

    /// NPZ compression for saved arrays.
    #[must_use]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.inner.compression = compression;
        self
    }

    /// Build the `SessionConfig`.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        self.inner
    }
}

/// Handle to one tracked run.
pub struct Session<T: Tracker> {
    run: RunRecord,
    tracker: T,
    output_dir: Option<PathBuf>,
    file_prefix: Option<String>,
    writer: ArtifactWriter,
    metadata: serde_json::Map<String, serde_json::Value>,
    artifacts: Vec<ArtifactRecord>,
}

impl<T: Tracker> Session<T> {
    /// Open a run on `tracker`.
    ///
    /// # Errors
    ///
    /// Returns the tracker's error if the run cannot be opened.
    pub fn start(config: SessionConfig, mut tracker: T) -> Result<Self> {
        let SessionConfig {
            project,
            run_name,
            entity,
            config,
            output_dir,
            file_prefix,
            compression,
        } = config;

        let mut builder = RunRecord::builder(run_name, project, entity);
        if let Some(config) = config {
            builder = builder.config(config);
        }
        let mut run = builder.build();
        run.start();
        tracker.init(&run)?;
        info!(
            run = run.run_id(),
            project = run.project(),
            entity = run.entity(),
            "run started"
        );

        Ok(Self {
            run,
            tracker,
            output_dir,
            file_prefix,
            writer: ArtifactWriter::new(compression),
            metadata: serde_json::Map::new(),
            artifacts: Vec::new(),
        })
    }

    /// The run record (status, timestamps, identity).
    #[must_use]
    pub const fn run(&self) -> &RunRecord {
        &self.run
    }

    /// The tracker this session forwards to.
    #[must_use]
    pub const fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Whether [`Self::finish`] has been called.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.run.status().is_terminal()
    }

    /// Free-form metadata, sent as the run summary on finish.
    #[must_use]
    pub const fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    /// Set a metadata entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish.
    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<()> {
        self.ensure_active()?;
        self.metadata.insert(key.into(), value.into());
        Ok(())
    }

    /// Artifacts saved through this session, in save order.
    #[must_use]
    pub fn artifacts(&self) -> &[ArtifactRecord] {
        &self.artifacts
    }

    /// Log a scalar metric, at `step` if given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish, or the tracker's error.
    pub fn log_metric(&mut self, name: &str, value: f64, step: Option<u64>) -> Result<()> {
        self.forward(name, MetricValue::from(value), step)
    }

    /// Log an array as a generic array metric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish, or the tracker's error.
    pub fn log_array(&mut self, name: &str, array: &Array, step: Option<u64>) -> Result<()> {
        self.forward(name, MetricValue::from(array), step)
    }

    /// Convert a tensor to a host array and log it as an array metric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish, the conversion error,
    /// or the tracker's error.
    pub fn log_tensor<X: ToHostArray + ?Sized>(
        &mut self,
        name: &str,
        tensor: &X,
        step: Option<u64>,
    ) -> Result<()> {
        self.ensure_active()?;
        let array = tensor.to_host_array()?;
        self.log_array(name, &array, step)
    }

    /// Wrap an `H×W×C` (or `H×W`) array as an image and log it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish,
    /// [`Error::InvalidImage`] for arrays that are not images, or the
    /// tracker's error.
    pub fn log_image(&mut self, name: &str, image: &Array, step: Option<u64>) -> Result<()> {
        self.ensure_active()?;
        let image = Image::from_array(image.clone())?;
        self.forward(name, MetricValue::from(&image), step)
    }

    /// Where an artifact named `data_name` would be written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoOutputDir`] if no output directory is configured.
    pub fn output_location(&self, data_name: &str, subdir_name: Option<&str>) -> Result<OutputLocation> {
        let output_dir = self.output_dir.as_deref().ok_or(Error::NoOutputDir)?;
        let folder = match subdir_name {
            Some(subdir) => output_dir.join(subdir),
            None => output_dir.to_path_buf(),
        };
        Ok(OutputLocation::prefixed(
            folder,
            self.file_prefix.as_deref(),
            data_name,
        ))
    }

    /// Save `array` to `{output_dir}[/{subdir}]/{prefix}_{data_name}.npz`
    /// under key `data_name`, and record it as an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish,
    /// [`Error::NoOutputDir`], a filesystem/archive error, or the tracker's
    /// error.
    pub fn save_array_to_npz(
        &mut self,
        array: &Array,
        data_name: &str,
        subdir_name: Option<&str>,
    ) -> Result<PathBuf> {
        self.ensure_active()?;
        let location = self.output_location(data_name, subdir_name)?;
        let path = self.writer.save_array_at(&location, array, data_name)?;
        self.record_artifact(data_name, ArtifactKind::Npz, &path)?;
        Ok(path)
    }

    /// Convert a tensor to a host array, then save like
    /// [`Self::save_array_to_npz`].
    ///
    /// # Errors
    ///
    /// As [`Self::save_array_to_npz`], plus the conversion error.
    pub fn save_tensor_to_npz<X: ToHostArray + ?Sized>(
        &mut self,
        tensor: &X,
        data_name: &str,
        subdir_name: Option<&str>,
    ) -> Result<PathBuf> {
        self.ensure_active()?;
        let array = tensor.to_host_array()?;
        self.save_array_to_npz(&array, data_name, subdir_name)
    }

    /// Serialize `obj` to `{output_dir}[/{subdir}]/{prefix}_{data_name}.json`
    /// and record it as an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish,
    /// [`Error::NoOutputDir`], a filesystem/serialization error, or the
    /// tracker's error.
    pub fn save_obj_to_pkl<O: Serialize + ?Sized>(
        &mut self,
        obj: &O,
        data_name: &str,
        subdir_name: Option<&str>,
    ) -> Result<PathBuf> {
        self.ensure_active()?;
        let location = self.output_location(data_name, subdir_name)?;
        let path = self.writer.save_object_at(&location, obj)?;
        self.record_artifact(data_name, ArtifactKind::Object, &path)?;
        Ok(path)
    }

    /// Close the run with [`RunStatus::Success`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] if already finished, or the
    /// tracker's error (the session counts as finished either way).
    pub fn finish(&mut self) -> Result<()> {
        self.finish_with(RunStatus::Success)
    }

    /// Close the run with an explicit final status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`] for a non-final status,
    /// [`Error::SessionFinished`] if already finished, or the tracker's error.
    pub fn finish_with(&mut self, status: RunStatus) -> Result<()> {
        if !status.is_terminal() {
            return Err(Error::Other(format!(
                "cannot finish a run with non-final status {status:?}"
            )));
        }
        self.ensure_active()?;
        self.run.complete(status);
        let summary = serde_json::Value::Object(self.metadata.clone());
        self.tracker.finish(&self.run, &summary)?;
        info!(run = self.run.run_id(), status = ?status, "run finished");
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_finished() {
            warn!(run = self.run.run_id(), "call on finished run rejected");
            return Err(Error::SessionFinished {
                run: self.run.run_id().to_string(),
            });
        }
        Ok(())
    }

    fn forward(&mut self, name: &str, value: MetricValue, step: Option<u64>) -> Result<()> {
        self.ensure_active()?;
        let metric = MetricRecord::new(self.run.run_id(), name, step, value);
        debug!(run = self.run.run_id(), key = name, step, "forwarding metric");
        self.tracker.log(&metric)
    }

    fn record_artifact(&mut self, data_name: &str, kind: ArtifactKind, path: &Path) -> Result<()> {
        let size_bytes = fs::metadata(path)?.len();
        let artifact = ArtifactRecord::new(self.run.run_id(), data_name, kind, path, size_bytes);
        self.tracker.log_artifact(&artifact)?;
        self.artifacts.push(artifact);
        Ok(())
    }
}

impl<T: Tracker> Drop for Session<T> {
    fn drop(&mut self) {
        if !self.is_finished() {
            warn!(run = self.run.run_id(), "session dropped without finish");
        }
    }
}
