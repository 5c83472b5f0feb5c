//! Report files, sets, and export mappings.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempPath;

use super::period::ReportMonth;

// ============================================================================
// Report Kind
// ============================================================================

/// Which subset of a report set a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Monthly earnings report. Mandatory.
    Earnings,
    /// Sales report. May be absent.
    Sales,
}

impl ReportKind {
    /// Object name prefix, without the month key.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Self::Earnings => "earnings/earnings_",
            Self::Sales => "sales/salesreport_",
        }
    }

    /// Full listing prefix for a month.
    pub fn object_prefix(&self, month: ReportMonth) -> String {
        format!("{}{}", self.name_prefix(), month.key())
    }

    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Earnings => "earnings",
            Self::Sales => "sales",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Report File
// ============================================================================

/// One unpacked report living in a temporary file.
///
/// The temporary file is removed when this value is dropped unless the
/// caller persists it with [`ReportFile::keep`].
#[derive(Debug)]
pub struct ReportFile {
    path: TempPath,
    object_name: String,
    original_name: String,
}

impl ReportFile {
    /// Wraps an unpacked temp file.
    pub fn new(path: TempPath, object_name: impl Into<String>, original_name: impl Into<String>) -> Self {
        Self {
            path,
            object_name: object_name.into(),
            original_name: original_name.into(),
        }
    }

    /// Location of the temp file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the remote object the archive was downloaded from.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Name stored inside the archive. Display only.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Detaches the temp file from automatic cleanup and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file could not be persisted.
    pub fn keep(self) -> std::io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }
}

// ============================================================================
// Report Set
// ============================================================================

/// Earnings and sales files fetched for one month.
#[derive(Debug)]
pub struct ReportSet {
    month: ReportMonth,
    earnings: Vec<ReportFile>,
    sales: Vec<ReportFile>,
}

impl ReportSet {
    /// Creates an empty set for `month`.
    pub fn new(month: ReportMonth) -> Self {
        Self {
            month,
            earnings: Vec::new(),
            sales: Vec::new(),
        }
    }

    /// Month the set was requested for.
    pub fn month(&self) -> ReportMonth {
        self.month
    }

    /// Appends a file to the given subset.
    pub fn push(&mut self, kind: ReportKind, file: ReportFile) {
        match kind {
            ReportKind::Earnings => self.earnings.push(file),
            ReportKind::Sales => self.sales.push(file),
        }
    }

    /// Files of one subset, in fetch order.
    pub fn files(&self, kind: ReportKind) -> &[ReportFile] {
        match kind {
            ReportKind::Earnings => &self.earnings,
            ReportKind::Sales => &self.sales,
        }
    }

    /// Earnings files.
    pub fn earnings(&self) -> &[ReportFile] {
        &self.earnings
    }

    /// Sales files.
    pub fn sales(&self) -> &[ReportFile] {
        &self.sales
    }

    /// Total number of files.
    pub fn len(&self) -> usize {
        self.earnings.len() + self.sales.len()
    }

    /// Returns true if no file was fetched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the export mapping, earnings first, each subset in fetch order.
    pub fn export_mapping(&self) -> ExportMapping {
        let mut mapping = ExportMapping::new();
        for file in self.earnings.iter().chain(&self.sales) {
            mapping.push(file.path(), file.original_name());
        }
        mapping
    }

    /// Splits the set into its earnings and sales files.
    pub fn into_parts(self) -> (Vec<ReportFile>, Vec<ReportFile>) {
        (self.earnings, self.sales)
    }
}

// ============================================================================
// Export Mapping
// ============================================================================

/// One temp file and the name it should be exported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// Temp file to copy from.
    pub source: PathBuf,
    /// Final file name inside the destination directory.
    pub display_name: String,
}

/// Ordered temp file to display name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMapping {
    entries: Vec<ExportEntry>,
}

impl ExportMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, source: impl Into<PathBuf>, display_name: impl Into<String>) {
        self.entries.push(ExportEntry {
            source: source.into(),
            display_name: display_name.into(),
        });
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    /// Mutable entries, for renaming.
    pub fn entries_mut(&mut self) -> &mut [ExportEntry] {
        &mut self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PathBuf, String)> for ExportMapping {
    fn from_iter<I: IntoIterator<Item = (PathBuf, String)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (source, name) in iter {
            mapping.push(source, name);
        }
        mapping
    }
}

// ============================================================================
// Tests
// ============================================================================
