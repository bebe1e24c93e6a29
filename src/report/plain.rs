//! Console output.
//!
//! Produces human-readable output with colors and formatting.

use crate::engine::{Outcome, SuiteRun};
use console::{style, Style};
use std::io::{self, Write};

/// Print every result, grouped by check and property.
pub fn print_results(run: &SuiteRun) -> io::Result<()> {
    let stdout = io::stdout();
    write_results(run, stdout.lock())
}

/// Print the per-host summary.
pub fn print_summary(run: &SuiteRun) -> io::Result<()> {
    let stdout = io::stdout();
    write_summary(run, stdout.lock())
}

pub(crate) fn write_results<W: Write>(run: &SuiteRun, mut out: W) -> io::Result<()> {
    let mut current_check = None;
    let mut current_property = None;

    for result in &run.results {
        let (check, property, _) = result.order;

        if current_check != Some(check) {
            if current_check.is_some() {
                writeln!(out)?;
            }
            writeln!(out, "CHECKING [{}]", style(&result.hosts).bold())?;
            current_check = Some(check);
            current_property = None;
        }

        if current_property != Some(property) {
            writeln!(
                out,
                "  PROPERTY: {} [{}:{}]",
                result.property,
                style(&result.module).bold(),
                result.port
            )?;
            current_property = Some(property);
        }

        let status_style = match result.outcome {
            Outcome::Success => Style::new().green(),
            _ => Style::new().red(),
        };
        write!(
            out,
            "    {:>11}: [{}]",
            status_style.apply_to(result.outcome.label()),
            result.host
        )?;
        match result.outcome.message() {
            Some(message) => writeln!(out, " {}", style(message).dim())?,
            None => writeln!(out)?,
        }
    }

    if !run.results.is_empty() {
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn write_summary<W: Write>(run: &SuiteRun, mut out: W) -> io::Result<()> {
    writeln!(out, "{}", style("SUMMARY").bold())?;
    for host in run.summary() {
        writeln!(
            out,
            " * {:<30} Success {:4}, Failed {:4}",
            host.host,
            style(host.succeeded).green(),
            style(host.failed).red()
        )?;
    }
    writeln!(
        out,
        "{} properties checked in {:.2}s (run {})",
        run.results.len(),
        run.duration_ms as f64 / 1000.0,
        style(run.id.short()).dim()
    )?;
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
