//! Metric Record - one logged value for a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::array::{Array, DType};
use crate::image::{Image, ImagePayload};

/// Logged value.
///
/// Serialized with a `type` tag so the tracking service can tell scalars,
/// arrays and images apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricValue {
    /// Scalar metric
    Scalar {
        /// Value
        value: f64,
    },
    /// Generic array metric
    Array {
        /// Original dtype
        dtype: DType,
        /// Original shape
        shape: Vec<usize>,
        /// Row-major values widened to `f64`
        values: Vec<f64>,
    },
    /// Image
    Image(ImagePayload),
}

impl MetricValue {
    /// Scalar value, if this is a scalar.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar { value } => Some(*value),
            _ => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Scalar { value }
    }
}

impl From<&Array> for MetricValue {
    fn from(array: &Array) -> Self {
        Self::Array {
            dtype: array.dtype(),
            shape: array.shape().to_vec(),
            values: array.to_f64_vec(),
        }
    }
}

impl From<&Image> for MetricValue {
    fn from(image: &Image) -> Self {
        Self::Image(image.to_payload())
    }
}

/// Metric Record represents a single logged data point.
///
/// `step` is `None` for unindexed logs; the tracker decides where those land
/// (see [`crate::tracker::MemoryTracker`] for the auto-increment rule).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    run_id: String,
    key: String,
    step: Option<u64>,
    value: MetricValue,
    timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Create a new metric record.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `key` - Metric name/key (e.g., "loss", "accuracy")
    /// * `step` - Training step, or `None` for an unindexed log
    /// * `value` - Logged value
    ///
    /// # Returns
    ///
    /// A new `MetricRecord` with the current timestamp.
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        key: impl Into<String>,
        step: Option<u64>,
        value: impl Into<MetricValue>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            step,
            value: value.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a builder for constructing a metric record with optional fields.
    #[must_use]
    pub fn builder(
        run_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> MetricRecordBuilder {
        MetricRecordBuilder::new(run_id, key, value)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the metric key/name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the step, if indexed.
    #[must_use]
    pub const fn step(&self) -> Option<u64> {
        self.step
    }

    /// Get the logged value.
    #[must_use]
    pub const fn value(&self) -> &MetricValue {
        &self.value
    }

    /// Get the timestamp when the metric was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Copy of this record placed at `step`.
    #[must_use]
    pub fn at_step(&self, step: u64) -> Self {
        Self {
            step: Some(step),
            ..self.clone()
        }
    }
}

/// Builder for `MetricRecord`.
#[derive(Debug)]
pub struct MetricRecordBuilder {
    run_id: String,
    key: String,
    step: Option<u64>,
    value: MetricValue,
    timestamp: DateTime<Utc>,
}

impl MetricRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            step: None,
            value: value.into(),
            timestamp: Utc::now(),
        }
    }

    /// Set the step.
    #[must_use]
    pub const fn step(mut self, step: u64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set a custom timestamp.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Build the `MetricRecord`.
    #[must_use]
    pub fn build(self) -> MetricRecord {
        MetricRecord {
            run_id: self.run_id,
            key: self.key,
            step: self.step,
            value: self.value,
            timestamp: self.timestamp,
        }
    }
}
