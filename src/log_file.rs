//! Line-buffered text log with immediate flush
//!
//! Every [`LogFile::write`] appends one line and flushes it, so the text is
//! visible to other readers before the call returns.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Append-only text log.
///
/// ```rust,no_run
/// use artifact_sink::LogFile;
///
/// let mut log = LogFile::open("train.log")?;
/// log.write("epoch 1: loss=0.42")?;
/// log.close()?;
/// assert!(log.write("too late").is_err());
/// # Ok::<(), artifact_sink::Error>(())
/// ```
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl LogFile {
    /// Create `path`, truncating existing content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Some(BufWriter::new(file)),
        })
    }

    /// Path the log was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the log still accepts writes.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append `text` and a newline, then flush.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] after [`Self::close`], or [`Error::Io`] if
    /// the write fails.
    pub fn write(&mut self, text: &str) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| Error::Closed {
            path: self.path.clone(),
        })?;
        writeln!(file, "{text}")?;
        file.flush()?;
        Ok(())
    }

    /// Flush and release the file handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if already closed, or [`Error::Io`] if the
    /// final flush fails.
    pub fn close(&mut self) -> Result<()> {
        let mut file = self.file.take().ok_or_else(|| Error::Closed {
            path: self.path.clone(),
        })?;
        file.flush()?;
        Ok(())
    }
}
