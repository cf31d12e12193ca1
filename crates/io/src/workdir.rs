//! Scratch directory for downloaded and generated spreadsheets.
//!
//! Files are handed out as `NamedTempFile`s, so they are removed when the
//! handle is dropped on every exit path, including errors and panics that
//! unwind.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

/// Extension of every file created in the work directory
const XLSX_SUFFIX: &str = ".xlsx";

#[derive(Debug, Clone)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create the directory if needed. Safe to race: an existing directory is
    /// not an error.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// New empty `.xlsx` temp file, e.g. `ООО_ФИО_a1b2c3.xlsx`.
    pub fn temp_xlsx(&self, prefix: &str) -> io::Result<NamedTempFile> {
        // Another batch may have removed the directory in the meantime
        std::fs::create_dir_all(&self.path)?;
        Builder::new()
            .prefix(prefix)
            .suffix(XLSX_SUFFIX)
            .tempfile_in(&self.path)
    }
}
