//! Error types for artifact-sink
//!
//! Underlying failures (filesystem, archive, serialization, network) are
//! propagated as-is through `#[from]` conversions; state violations get their
//! own variants so callers can match on them.

use std::path::PathBuf;

use thiserror::Error;

use crate::array::DType;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// artifact-sink error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error (folder creation, file writes, closed handles)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container error while reading or writing an NPZ archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Malformed NPY member inside an archive
    #[error("Invalid NPY data: {0}")]
    InvalidNpy(String),

    /// Array could not be encoded as an NPY member
    #[error("NPY write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// Requested key is not present in the archive
    #[error("Archive has no array named '{0}'")]
    MissingKey(String),

    /// Object (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Tracking service request failed (transport error or non-2xx status)
    #[error("Tracking service error: {0}")]
    Http(#[from] ureq::Error),

    /// Element type requested does not match the array's dtype
    #[error("Dtype mismatch: expected {expected}, found {actual}")]
    DtypeMismatch {
        /// Dtype the caller asked for
        expected: DType,
        /// Dtype stored in the array
        actual: DType,
    },

    /// Element count does not match the requested shape
    #[error("Shape mismatch: shape {shape:?} needs {expected} elements, got {actual}")]
    ShapeMismatch {
        /// Requested shape
        shape: Vec<usize>,
        /// Element count implied by the shape
        expected: usize,
        /// Element count supplied
        actual: usize,
    },

    /// Array cannot be interpreted as an image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Session was asked to save an artifact without an output directory
    #[error("No output directory configured for this session")]
    NoOutputDir,

    /// Call on a session whose run has already finished
    #[error("Run '{run}' is already finished and accepts no further calls")]
    SessionFinished {
        /// Run identifier
        run: String,
    },

    /// Operation on a closed log file
    #[error("Log file {path} is closed")]
    Closed {
        /// Path the file was opened with
        path: PathBuf,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
