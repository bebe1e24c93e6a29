//! Report formatting.
//!
//! The console report is always printed; JSON, Markdown and CSV reports are
//! written to a file on request.

mod csv_format;
mod json_format;
mod markdown;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use markdown::write_markdown;
pub use plain::{print_error, print_info, print_results, print_summary, print_warning};

use crate::engine::SuiteRun;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// File report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// JSON document with all results and the per-host summary
    Json,
    /// Markdown summary and per-host listing
    Markdown,
    /// One CSV row per property and host
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Write `run` in `format` to any writer.
pub fn write_report<W: Write>(run: &SuiteRun, format: ReportFormat, writer: W) -> io::Result<()> {
    match format {
        ReportFormat::Json => write_json(run, writer),
        ReportFormat::Markdown => write_markdown(run, writer),
        ReportFormat::Csv => write_csv(run, writer),
    }
}

/// Write `run` in `format` to the file at `path`, replacing it.
pub fn write_report_file(run: &SuiteRun, format: ReportFormat, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_report(run, format, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), %format, "Wrote report");
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::checks::ProtocolTag;
    use crate::engine::{Outcome, PropertyRun, SuiteRun};
    use crate::types::{Port, RunId};
    use chrono::Utc;

    pub fn run() -> SuiteRun {
        let row = |i: usize, host: &str, property: &str, module: &str, port: u16, outcome| PropertyRun {
            hosts: "raspi".to_string(),
            host: host.to_string(),
            property: property.to_string(),
            module: module.to_string(),
            protocol: ProtocolTag::TextTcp,
            port: Port::new(port).unwrap(),
            outcome,
            duration_ms: 3,
            order: (0, i, 0),
        };
        SuiteRun {
            id: RunId::new(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
            duration_ms: 12,
            results: vec![
                row(0, "heimbot.fritz.box", "Checking SSH", "ssh", 22, Outcome::Success),
                row(
                    1,
                    "heimbot.fritz.box",
                    "Checking FTP",
                    "ftp",
                    21,
                    Outcome::ResponseCheck("Unexpected response code '421'; expected '220'.".into()),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_report_file(&fixtures::run(), ReportFormat::Markdown, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Dirac Report"));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(ReportFormat::Markdown.to_string(), "markdown");
    }
}
