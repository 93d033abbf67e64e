//! Artifact Record - a file a run wrote to disk

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk format of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// NPZ archive holding one array
    Npz,
    /// Serialized object
    Object,
}

/// Artifact Record represents a stored artifact from a run.
///
/// Only the location and size are tracked; the file itself stays on local
/// disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    run_id: String,
    key: String,
    kind: ArtifactKind,
    path: PathBuf,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Create a new artifact record.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `key` - Logical artifact name (the `data_name` it was saved under)
    /// * `kind` - On-disk format
    /// * `path` - Where the file was written
    /// * `size_bytes` - Size of the file in bytes
    ///
    /// # Returns
    ///
    /// A new `ArtifactRecord` with the current timestamp.
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        key: impl Into<String>,
        kind: ArtifactKind,
        path: impl Into<PathBuf>,
        size_bytes: u64,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            kind,
            path: path.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the artifact key/name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the on-disk format.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Get the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the artifact size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
