//! Report archive unpacking.
//!
//! Every report object is a zip archive holding exactly one CSV file. The
//! entry is streamed into a fresh temp file owned by the caller.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use playreports_core::ReportsError;
use tempfile::TempPath;
use tracing::debug;
use zip::ZipArchive;

/// Extracts single-entry report archives into temp files.
#[derive(Debug, Clone, Default)]
pub struct Unpacker {
    temp_dir: Option<PathBuf>,
}

impl Unpacker {
    /// Unpacks into the system temp dir.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpacks into `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: Some(dir.into()),
        }
    }

    /// Extracts the only entry of `bytes` and returns its temp path and the
    /// entry name recorded in the archive.
    ///
    /// The temp file is deleted when the returned path is dropped.
    pub fn unpack(&self, bytes: &[u8]) -> Result<(TempPath, String), ReportsError> {
        if bytes.is_empty() {
            return Err(ReportsError::Format("empty archive".to_string()));
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ReportsError::Format(format!("unreadable archive: {e}")))?;

        match archive.len() {
            0 => return Err(ReportsError::Format("empty archive".to_string())),
            1 => {}
            n => {
                return Err(ReportsError::Format(format!(
                    "expected exactly one file, found {n} entries"
                )));
            }
        }

        let mut entry = archive
            .by_index(0)
            .map_err(|e| ReportsError::Format(format!("unreadable archive entry: {e}")))?;
        let original_name = entry.name().to_string();

        let mut builder = tempfile::Builder::new();
        builder.prefix("report-").suffix(".csv");
        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let written = std::io::copy(&mut entry, &mut file)?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!(entry = %original_name, path = %path.display(), bytes = written, "Archive unpacked");
        Ok((path, original_name))
    }
}

// ============================================================================
// Tests
// ============================================================================
