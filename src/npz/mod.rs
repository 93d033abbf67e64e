//! NPZ archives: zip containers of NPY members
//!
//! Each array is stored as `{key}.npy`, matching what `numpy.savez` and
//! `numpy.savez_compressed` produce, so files round-trip through
//! `numpy.load`.
//!
//! ```rust,no_run
//! use artifact_sink::array::Array;
//! use artifact_sink::npz::{Compression, NpzArchive, NpzWriter};
//!
//! let mut writer = NpzWriter::create("weights.npz", Compression::Deflated)?;
//! writer.add_array("w", &Array::from_vec(vec![0.5f32, 1.5]))?;
//! writer.finish()?;
//!
//! let mut archive = NpzArchive::open("weights.npz")?;
//! assert_eq!(archive.keys(), vec!["w".to_string()]);
//! let w = archive.by_name("w")?;
//! assert_eq!(w.to_vec::<f32>()?, vec![0.5, 1.5]);
//! # Ok::<(), artifact_sink::Error>(())
//! ```

pub mod npy;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::array::Array;
use crate::{Error, Result};

/// File extension of NPZ archives
pub const NPZ_EXTENSION: &str = "npz";

const MEMBER_SUFFIX: &str = ".npy";

/// How members are stored in the zip container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Deflate members (`numpy.savez_compressed` layout)
    #[default]
    Deflated,
    /// Store members uncompressed (`numpy.savez` layout)
    Stored,
}

impl Compression {
    const fn method(self) -> CompressionMethod {
        match self {
            Self::Deflated => CompressionMethod::Deflated,
            Self::Stored => CompressionMethod::Stored,
        }
    }
}

/// Streaming NPZ writer.
///
/// Members are appended in call order; the central directory is written by
/// [`NpzWriter::finish`]. Dropping the writer without finishing leaves a
/// truncated archive.
pub struct NpzWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl NpzWriter<BufWriter<File>> {
    /// Create (or truncate) an archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, compression: Compression) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file), compression))
    }
}

impl<W: Write + Seek> NpzWriter<W> {
    /// Wrap any seekable writer.
    pub fn new(inner: W, compression: Compression) -> Self {
        let options = SimpleFileOptions::default().compression_method(compression.method());
        Self {
            zip: ZipWriter::new(inner),
            options,
        }
    }

    /// Append `array` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be started or written.
    pub fn add_array(&mut self, key: &str, array: &Array) -> Result<()> {
        self.zip.start_file(format!("{key}{MEMBER_SUFFIX}"), self.options)?;
        npy::write_npy(&mut self.zip, array)
    }

    /// Write the central directory and return the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be written or flushed.
    pub fn finish(self) -> Result<W> {
        let mut inner = self.zip.finish()?;
        inner.flush()?;
        Ok(inner)
    }
}

/// Read access to an NPZ archive.
pub struct NpzArchive<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl NpzArchive<BufReader<File>> {
    /// Open the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a zip archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> NpzArchive<R> {
    /// Wrap any seekable reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] if the reader is not a zip archive.
    pub fn new(inner: R) -> Result<Self> {
        Ok(Self {
            zip: ZipArchive::new(inner)?,
        })
    }

    /// Array keys, in archive order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.members().map(ToString::to_string).collect()
    }

    /// Number of arrays (`.npy` members); other zip entries are ignored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members().count()
    }

    /// Whether the archive holds no arrays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members().next().is_none()
    }

    fn members(&self) -> impl Iterator<Item = &str> {
        self.zip
            .file_names()
            .filter_map(|name| name.strip_suffix(MEMBER_SUFFIX))
    }

    /// Read the array stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if no such member exists, or a decoding
    /// error for a malformed member.
    pub fn by_name(&mut self, key: &str) -> Result<Array> {
        let mut member = match self.zip.by_name(&format!("{key}{MEMBER_SUFFIX}")) {
            Ok(member) => member,
            Err(ZipError::FileNotFound) => return Err(Error::MissingKey(key.to_string())),
            Err(e) => return Err(e.into()),
        };
        npy::read_npy(&mut member)
    }
}

/// Write a single-array archive to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_single<P: AsRef<Path>>(
    path: P,
    key: &str,
    array: &Array,
    compression: Compression,
) -> Result<()> {
    let mut writer = NpzWriter::create(path, compression)?;
    writer.add_array(key, array)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn archive_bytes(compression: Compression, members: &[(&str, Array)]) -> Vec<u8> {
        let mut writer = NpzWriter::new(Cursor::new(Vec::new()), compression);
        for (key, array) in members {
            writer.add_array(key, array).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_members_use_npy_suffix() {
        let bytes = archive_bytes(
            Compression::Stored,
            &[("weights", Array::from_vec(vec![1.0f32]))],
        );
        let zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert_eq!(names, vec!["weights.npy"]);
    }

    #[test]
    fn test_keys_in_write_order() {
        let bytes = archive_bytes(
            Compression::Deflated,
            &[
                ("b", Array::from_vec(vec![1u8])),
                ("a", Array::from_vec(vec![2u8])),
                ("c", Array::from_vec(vec![3u8])),
            ],
        );
        let archive = NpzArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.keys(), vec!["b", "a", "c"]);
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn test_missing_key() {
        let bytes = archive_bytes(Compression::Stored, &[("x", Array::from_vec(vec![0i8]))]);
        let mut archive = NpzArchive::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(archive.by_name("y"), Err(Error::MissingKey(k)) if k == "y"));
    }

    #[test]
    fn test_deflated_is_smaller_for_repetitive_data() {
        let array = Array::zeros(crate::array::DType::F64, [256, 256]);
        let stored = archive_bytes(Compression::Stored, &[("z", array.clone())]);
        let deflated = archive_bytes(Compression::Deflated, &[("z", array)]);
        assert!(deflated.len() < stored.len());
    }

    #[test]
    fn test_len_ignores_non_npy_entries() {
        let mut writer = NpzWriter::new(Cursor::new(Vec::new()), Compression::Stored);
        writer.add_array("w", &Array::from_vec(vec![1u8])).unwrap();
        writer
            .zip
            .start_file("README.txt", SimpleFileOptions::default())
            .unwrap();
        writer.zip.write_all(b"not an array").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let archive = NpzArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.keys(), vec!["w"]);
        assert_eq!(archive.len(), 1);
        assert!(!archive.is_empty());
    }

    #[test]
    fn test_not_a_zip() {
        let result = NpzArchive::new(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(Error::Archive(_))));
    }
}
