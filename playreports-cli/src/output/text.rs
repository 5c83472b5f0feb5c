//! Text output formatting with colors.

use playreports_core::ReportKind;

use super::{ReportOutput, ReportSummary};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the result of a fetch.
    pub fn format_summary(&self, summary: &ReportSummary) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {}",
            self.bold(&format!("Reports for {}", summary.month)),
            self.dim(&format!("(gs://{})", summary.bucket))
        ));

        for kind in [ReportKind::Earnings, ReportKind::Sales] {
            let reports: Vec<&ReportOutput> =
                summary.reports.iter().filter(|r| r.kind == kind).collect();
            lines.push(format!("  {}:", self.color(kind.display_name(), CYAN)));
            if reports.is_empty() {
                lines.push(format!("    {}", self.dim("none")));
            }
            for report in reports {
                lines.push(format!("    {}", self.format_report(report)));
            }
        }

        let action = if summary.exported { "Exported" } else { "Kept" };
        lines.push(format!(
            "{} {} file(s)",
            self.color(action, GREEN),
            summary.reports.len()
        ));

        lines.join("\n")
    }

    fn format_report(&self, report: &ReportOutput) -> String {
        format!(
            "{} {} {}",
            report.name,
            self.dim("->"),
            report.path.display()
        )
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        self.color(text, DIM)
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
