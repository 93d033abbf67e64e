//! # artifact-sink: Artifact Persistence and Metrics Forwarding for ML Runs
//!
//! Small, synchronous building blocks for training scripts:
//!
//! - **Artifact Writer** ([`artifact`]): save arrays and tensors as NumPy
//!   `.npz` archives and serializable objects as JSON, creating folders on
//!   demand.
//! - **Metrics Sink** ([`Session`]): forward scalars, arrays, tensors and
//!   images to an experiment tracker ([`tracker`]) and save run artifacts
//!   under a per-run output directory.
//! - **Log file** ([`LogFile`]): append-only text log flushed on every line.
//!
//! ## Design Principles
//!
//! - **Explicit handles**: a session owns its tracker; no global run state.
//! - **Explicit conversion**: tensors reach the archive format only through
//!   [`array::ToHostArray`].
//! - **Fail fast**: finished sessions and closed log files reject calls with
//!   their own error variants.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use artifact_sink::array::{Array, Device, Tensor};
//! use artifact_sink::tracker::{HttpTracker, HttpTrackerConfig};
//! use artifact_sink::{Session, SessionConfig};
//!
//! let tracker = HttpTracker::new(HttpTrackerConfig::builder("https://track.example.com").build());
//! let config = SessionConfig::builder("vision", "resnet-run-3", "lab")
//!     .config(serde_json::json!({"learning_rate": 0.001, "batch_size": 32}))
//!     .output_dir("outputs")
//!     .file_prefix("resnet")
//!     .build();
//! let mut session = Session::start(config, tracker)?;
//!
//! session.log_metric("accuracy", 0.95, Some(1))?;
//!
//! let weights = Tensor::from_vec(vec![0.1f32; 100])
//!     .with_requires_grad(true)
//!     .to_device(Device::Accelerator(0));
//! session.log_tensor("weights", &weights, Some(1))?;
//! session.save_tensor_to_npz(&weights, "weights", Some("epoch_1"))?;
//!
//! session.finish()?;
//! # Ok::<(), artifact_sink::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod array;
pub mod artifact;
pub mod error;
pub mod experiment;
pub mod image;
pub mod log_file;
pub mod npz;
pub mod session;
pub mod telemetry;
pub mod tracker;

pub use error::{Error, Result};
pub use log_file::LogFile;
pub use session::{Session, SessionConfig, SessionConfigBuilder};
