use crate::app::models::WalkState;
use anyhow::{Context, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const REPORT_NAME: &str = "utrunner-report.txt";

const RULE: &str = "-------------------------------------------------";

/// Counts derived from the raw report buffer.
///
/// Markers are counted as plain substrings, so a test whose name contains
/// `PASS`, `FAIL` or `SKIP` inflates the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub dirs_walked: i64,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_state(state: &WalkState) -> Self {
        let text = String::from_utf8_lossy(&state.report_data);
        Self {
            dirs_walked: state.dir_count,
            passed: text.matches("PASS").count(),
            failed: text.matches("FAIL").count(),
            skipped: text.matches("SKIP").count(),
        }
    }

    pub fn tests_run(&self) -> usize {
        self.passed + self.failed
    }

    pub fn tests_written(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "| {:<46} |", "Report")?;
        writeln!(f, "{:<22}|", RULE)?;
        let rows: [(&str, String); 6] = [
            ("Directories walked:", self.dirs_walked.to_string()),
            ("Tests passed:", self.passed.to_string()),
            ("Tests failed:", self.failed.to_string()),
            ("Tests run:", self.tests_run().to_string()),
            ("Tests skipped:", self.skipped.to_string()),
            ("Tests written:", self.tests_written().to_string()),
        ];
        for (label, value) in rows {
            writeln!(f, "| {:<22} | {:<22}|", label, value)?;
        }
        writeln!(f, "{}", RULE)
    }
}

/// Writes the raw buffer followed by the summary table into `dir`.
pub fn write_report(dir: &Path, state: &WalkState, summary: &Summary) -> Result<PathBuf> {
    let path = dir.join(REPORT_NAME);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options
        .open(&path)
        .context(format!("Failed to create report at {:?}", path))?;
    file.write_all(&state.report_data)
        .and_then(|_| file.write_all(summary.render().as_bytes()))
        .context(format!("Failed to write report at {:?}", path))?;

    Ok(path)
}

/// Report location as printed for the user: `base` joined with the report
/// name, with `.` components dropped.
pub fn display_report_path(base: &Path) -> PathBuf {
    base.join(REPORT_NAME)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Elapsed time rounded to the nearest whole second, e.g. `1m 5s`.
pub fn format_run_time(elapsed: Duration) -> String {
    let rounded = (elapsed + Duration::from_millis(500)).as_secs();
    humantime::format_duration(Duration::from_secs(rounded)).to_string()
}
