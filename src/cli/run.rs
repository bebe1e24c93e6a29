//! Run subcommand implementation.
//!
//! Handles `dirac run <suite>...`: loads each suite, runs it, prints the
//! console report and optionally writes a file report.

use crate::checks::ModuleRegistry;
use crate::config::AppSettings;
use crate::engine::run_suite;
use crate::report::{self, ReportFormat};
use crate::suite::CheckSuite;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Run check suites against their inventories.
#[derive(Parser, Debug)]
pub struct RunCommand {
    /// Check suite files to run
    #[arg(value_name = "SUITE", required = true)]
    pub suites: Vec<PathBuf>,

    /// File report format (defaults to the configured format, else json)
    #[arg(short, long, value_enum, requires = "output")]
    pub report: Option<ReportFormat>,

    /// Write the file report here
    ///
    /// With several suites, each report gets the suite name appended,
    /// e.g. report-web.json.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Connect and read timeout in milliseconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent exchanges
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

impl RunCommand {
    /// Execute the run command. Returns whether every property succeeded.
    pub async fn execute(&self, mut settings: AppSettings, registry: &ModuleRegistry) -> Result<bool> {
        if let Some(timeout) = self.timeout {
            settings.timeout_ms = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        settings.validate().context("Invalid command-line settings")?;

        let run_settings = settings.run_settings(self.progress);
        let format = self
            .report
            .or(settings.report_format)
            .unwrap_or(ReportFormat::Json);
        debug!(?run_settings, %format, "Effective settings");

        // Load everything first so a broken suite fails before any traffic.
        let suites = self
            .suites
            .iter()
            .map(|path| {
                CheckSuite::from_file(path, registry)
                    .with_context(|| format!("Failed to load check suite {}", path.display()))
                    .map(|suite| (path, suite))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut all_passed = true;
        for (path, suite) in &suites {
            if suites.len() > 1 {
                report::print_info(&format!("Suite {}", path.display()));
            }
            if suite.job_count() == 0 {
                report::print_warning(&format!("{} has no checks to run", path.display()));
            }

            let run = run_suite(suite, registry, &run_settings).await;
            report::print_results(&run).context("Failed to print results")?;
            report::print_summary(&run).context("Failed to print summary")?;
            all_passed &= run.is_success();

            if let Some(output) = &self.output {
                let target = report_path(output, path, suites.len() > 1);
                report::write_report_file(&run, format, &target)
                    .with_context(|| format!("Failed to write report {}", target.display()))?;
                report::print_info(&format!("Report written to {}", target.display()));
            }
        }

        Ok(all_passed)
    }
}

/// Where the report for `suite` goes.
fn report_path(output: &Path, suite: &Path, per_suite: bool) -> PathBuf {
    if !per_suite {
        return output.to_path_buf();
    }
    let suite_name = suite
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "suite".to_string());
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let file = match output.extension() {
        Some(ext) => format!("{}-{}.{}", stem, suite_name, ext.to_string_lossy()),
        None => format!("{}-{}", stem, suite_name),
    };
    output.with_file_name(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_path_single_suite() {
        let path = report_path(Path::new("out/report.json"), Path::new("suites/web.yml"), false);
        assert_eq!(path, PathBuf::from("out/report.json"));
    }

    #[test]
    fn test_report_path_per_suite() {
        let path = report_path(Path::new("out/report.json"), Path::new("suites/web.yml"), true);
        assert_eq!(path, PathBuf::from("out/report-web.json"));
        let path = report_path(Path::new("report"), Path::new("db.yaml"), true);
        assert_eq!(path, PathBuf::from("report-db"));
    }

    #[tokio::test]
    async fn test_execute_missing_suite() {
        let command = RunCommand {
            suites: vec![PathBuf::from("/nonexistent/suite.yml")],
            report: None,
            output: None,
            timeout: None,
            concurrency: None,
            progress: false,
        };
        let err = command
            .execute(AppSettings::default(), &ModuleRegistry::builtin())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/suite.yml"));
    }

    #[tokio::test]
    async fn test_execute_empty_suite() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let command = RunCommand {
            suites: vec![file.path().to_path_buf()],
            report: None,
            output: None,
            timeout: None,
            concurrency: None,
            progress: false,
        };
        assert!(command
            .execute(AppSettings::default(), &ModuleRegistry::builtin())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_execute_rejects_zero_timeout() {
        let command = RunCommand {
            suites: vec![PathBuf::from("unused.yml")],
            report: None,
            output: None,
            timeout: Some(0),
            concurrency: None,
            progress: false,
        };
        assert!(command
            .execute(AppSettings::default(), &ModuleRegistry::builtin())
            .await
            .is_err());
    }
}
