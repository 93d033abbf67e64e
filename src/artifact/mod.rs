//! Artifact Writer - persist named arrays, tensors and objects to a folder
//!
//! Every save call creates its target folder on demand (idempotent) and
//! derives the file path from an [`OutputLocation`]:
//!
//! ```text
//! {folder}/{stem}.npz    arrays and tensors, one member named by the caller
//! {folder}/{stem}.json   serde-serializable objects
//! ```
//!
//! Writes go straight to the final path; a crash mid-write leaves a partial
//! file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::array::{Array, ToHostArray};
use crate::npz::{self, Compression, NpzArchive, NPZ_EXTENSION};
use crate::Result;

/// File extension of serialized objects
pub const OBJECT_EXTENSION: &str = "json";

/// File stem for `name`: `{prefix}_{name}` with a non-empty prefix, else `name`.
#[must_use]
pub fn file_stem(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}_{name}"),
        _ => name.to_string(),
    }
}

/// Folder plus file stem of an artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputLocation {
    folder: PathBuf,
    stem: String,
}

impl OutputLocation {
    /// Location with an explicit stem.
    pub fn new(folder: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            stem: stem.into(),
        }
    }

    /// Location whose stem follows the prefix convention (see [`file_stem`]).
    pub fn prefixed(folder: impl Into<PathBuf>, prefix: Option<&str>, name: &str) -> Self {
        Self::new(folder, file_stem(prefix, name))
    }

    /// Target folder.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// File stem (no extension).
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Full path with the given extension.
    #[must_use]
    pub fn path(&self, extension: &str) -> PathBuf {
        self.folder.join(format!("{}.{extension}", self.stem))
    }

    /// Create the folder (and parents) if absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the folder cannot be created.
    pub fn ensure_folder(&self) -> Result<()> {
        fs::create_dir_all(&self.folder)?;
        Ok(())
    }
}

/// Writes artifacts with a fixed NPZ compression setting.
///
/// The free functions in this module use `ArtifactWriter::default()`
/// (deflate-compressed archives).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactWriter {
    compression: Compression,
}

impl ArtifactWriter {
    /// Writer using `compression` for NPZ members.
    #[must_use]
    pub const fn new(compression: Compression) -> Self {
        Self { compression }
    }

    /// NPZ compression in use.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }

    /// Save `array` to `folder/name.npz` under `attribute_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created or the archive
    /// cannot be written.
    pub fn save_array(
        &self,
        folder: impl AsRef<Path>,
        name: &str,
        array: &Array,
        attribute_name: &str,
    ) -> Result<PathBuf> {
        self.save_array_at(&OutputLocation::new(folder.as_ref(), name), array, attribute_name)
    }

    /// Convert `tensor` to a host array, then save it like [`Self::save_array`].
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion or the save fails.
    pub fn save_tensor<T: ToHostArray + ?Sized>(
        &self,
        folder: impl AsRef<Path>,
        name: &str,
        tensor: &T,
        attribute_name: &str,
    ) -> Result<PathBuf> {
        let array = tensor.to_host_array()?;
        self.save_array(folder, name, &array, attribute_name)
    }

    /// Serialize `obj` to `folder/name.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created, the object cannot
    /// be serialized, or the file cannot be written.
    pub fn save_object<T: Serialize + ?Sized>(
        &self,
        folder: impl AsRef<Path>,
        name: &str,
        obj: &T,
    ) -> Result<PathBuf> {
        self.save_object_at(&OutputLocation::new(folder.as_ref(), name), obj)
    }

    pub(crate) fn save_array_at(
        &self,
        location: &OutputLocation,
        array: &Array,
        attribute_name: &str,
    ) -> Result<PathBuf> {
        location.ensure_folder()?;
        let path = location.path(NPZ_EXTENSION);
        npz::write_single(&path, attribute_name, array, self.compression)?;
        info!(
            path = %path.display(),
            key = attribute_name,
            dtype = %array.dtype(),
            shape = ?array.shape(),
            "array saved"
        );
        Ok(path)
    }

    #[allow(clippy::unused_self)]
    pub(crate) fn save_object_at<T: Serialize + ?Sized>(
        &self,
        location: &OutputLocation,
        obj: &T,
    ) -> Result<PathBuf> {
        location.ensure_folder()?;
        let path = location.path(OBJECT_EXTENSION);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, obj)?;
        writer.flush()?;
        info!(path = %path.display(), "object saved");
        Ok(path)
    }
}

/// Save `array` to `folder/name.npz` under `attribute_name`.
///
/// # Errors
///
/// See [`ArtifactWriter::save_array`].
pub fn save_array(
    folder: impl AsRef<Path>,
    name: &str,
    array: &Array,
    attribute_name: &str,
) -> Result<PathBuf> {
    ArtifactWriter::default().save_array(folder, name, array, attribute_name)
}

/// Save a tensor's host values to `folder/name.npz` under `attribute_name`.
///
/// # Errors
///
/// See [`ArtifactWriter::save_tensor`].
pub fn save_tensor<T: ToHostArray + ?Sized>(
    folder: impl AsRef<Path>,
    name: &str,
    tensor: &T,
    attribute_name: &str,
) -> Result<PathBuf> {
    ArtifactWriter::default().save_tensor(folder, name, tensor, attribute_name)
}

/// Serialize `obj` to `folder/name.json`.
///
/// # Errors
///
/// See [`ArtifactWriter::save_object`].
pub fn save_object<T: Serialize + ?Sized>(
    folder: impl AsRef<Path>,
    name: &str,
    obj: &T,
) -> Result<PathBuf> {
    ArtifactWriter::default().save_object(folder, name, obj)
}

/// Read the array stored under `attribute_name` in the archive at `path`.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened, has no such key, or
/// holds a malformed member.
pub fn load_array(path: impl AsRef<Path>, attribute_name: &str) -> Result<Array> {
    NpzArchive::open(path)?.by_name(attribute_name)
}

/// Deserialize an object saved with [`save_object`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not deserialize
/// into `T`.
pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
