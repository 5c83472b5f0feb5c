//! Output formatting for CLI.

mod json;
mod text;

use std::path::PathBuf;

use playreports_core::{ReportFile, ReportKind};
use playreports_fetch::RunOutcome;
use serde::Serialize;

pub use json::JsonFormatter;
pub use text::TextFormatter;

// ============================================================================
// Report Summary
// ============================================================================

/// What a fetch produced, with every path guaranteed to outlive the process.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub bucket: String,
    pub month: String,
    pub exported: bool,
    pub reports: Vec<ReportOutput>,
}

/// One fetched report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub kind: ReportKind,
    pub object: String,
    pub name: String,
    pub path: PathBuf,
}

impl ReportSummary {
    /// Builds the summary of a run.
    ///
    /// Exported reports are listed under their exported paths and the temp
    /// files are released. Otherwise the temp files are kept on disk.
    pub fn from_outcome(bucket: &str, outcome: RunOutcome) -> std::io::Result<Self> {
        let month = outcome.reports.month().to_string();
        let exported = !outcome.exported.is_empty();
        let (earnings, sales) = outcome.reports.into_parts();

        let files = earnings
            .into_iter()
            .map(|f| (ReportKind::Earnings, f))
            .chain(sales.into_iter().map(|f| (ReportKind::Sales, f)));

        let mut reports = Vec::new();
        if exported {
            for ((kind, file), path) in files.zip(outcome.exported) {
                reports.push(ReportOutput::new(kind, &file, path));
            }
        } else {
            for (kind, file) in files {
                let object = file.object_name().to_string();
                let name = file.original_name().to_string();
                let path = file.keep()?;
                reports.push(ReportOutput {
                    kind,
                    object,
                    name,
                    path,
                });
            }
        }

        Ok(Self {
            bucket: bucket.to_string(),
            month,
            exported,
            reports,
        })
    }
}

impl ReportOutput {
    fn new(kind: ReportKind, file: &ReportFile, path: PathBuf) -> Self {
        Self {
            kind,
            object: file.object_name().to_string(),
            name: file.original_name().to_string(),
            path,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use playreports_core::{ReportMonth, ReportSet};

    fn report(object: &str, name: &str) -> ReportFile {
        let path = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        ReportFile::new(path, object, name)
    }

    fn outcome(exported: Vec<PathBuf>) -> RunOutcome {
        let mut reports = ReportSet::new(ReportMonth::new(2021, 3).unwrap());
        reports.push(
            ReportKind::Earnings,
            report("earnings/earnings_202103_x.zip", "PlayApps_202103.csv"),
        );
        reports.push(
            ReportKind::Sales,
            report("sales/salesreport_202103.zip", "salesreport_202103.csv"),
        );
        RunOutcome { reports, exported }
    }

    #[test]
    fn test_summary_keeps_temp_files() {
        let summary = ReportSummary::from_outcome("bucket", outcome(Vec::new())).unwrap();

        assert!(!summary.exported);
        assert_eq!(summary.month, "2021-03");
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.reports[0].kind, ReportKind::Earnings);
        for report in &summary.reports {
            assert!(report.path.exists());
            std::fs::remove_file(&report.path).unwrap();
        }
    }

    #[test]
    fn test_summary_lists_exported_paths() {
        let exported = vec![
            PathBuf::from("out/PlayApps_202103.csv"),
            PathBuf::from("out/salesreport_202103.csv"),
        ];
        let summary = ReportSummary::from_outcome("bucket", outcome(exported.clone())).unwrap();

        assert!(summary.exported);
        let paths: Vec<_> = summary.reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, exported);
        assert_eq!(summary.reports[1].name, "salesreport_202103.csv");
    }
}
