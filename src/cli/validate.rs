//! Validate subcommand implementation.
//!
//! Loads every suite exactly as `run` would, which checks all module
//! parameters, but never opens a connection.

use crate::checks::ModuleRegistry;
use crate::report;
use crate::suite::CheckSuite;
use clap::Parser;
use console::style;
use std::path::PathBuf;

/// Validate check suites.
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// Check suite files to validate
    #[arg(value_name = "SUITE", required = true)]
    pub suites: Vec<PathBuf>,
}

impl ValidateCommand {
    /// Returns whether every suite is valid.
    pub fn execute(&self, registry: &ModuleRegistry) -> bool {
        let mut valid = true;
        for path in &self.suites {
            match CheckSuite::from_file(path, registry) {
                Ok(suite) => println!(
                    "{} {}: {} checks, {} jobs",
                    style("✓").green().bold(),
                    path.display(),
                    suite.checks.len(),
                    suite.job_count()
                ),
                Err(e) => {
                    report::print_error(&format!("{}: {}", path.display(), e));
                    valid = false;
                }
            }
        }
        valid
    }
}
