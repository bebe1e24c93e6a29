//! Markdown report: overall summary followed by the checks of each host.

use crate::engine::{PropertyRun, SuiteRun};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Write the run as a Markdown document.
pub fn write_markdown<W: Write>(run: &SuiteRun, mut writer: W) -> io::Result<()> {
    writeln!(writer, "# Dirac Report")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Run `{}` started {} and took {} ms.",
        run.id.short(),
        run.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        run.duration_ms
    )?;
    writeln!(writer)?;

    writeln!(writer, "## Summary")?;
    writeln!(writer)?;
    for host in run.summary() {
        writeln!(
            writer,
            " * *{}* Success {}, Failed {}",
            host.host, host.succeeded, host.failed
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "## Host Checks")?;
    let mut by_host: BTreeMap<&str, Vec<&PropertyRun>> = BTreeMap::new();
    for result in &run.results {
        by_host.entry(result.host.as_str()).or_default().push(result);
    }

    for (host, results) in by_host {
        writeln!(writer)?;
        writeln!(writer, "### {}", host)?;
        writeln!(writer)?;
        for result in results {
            let status = if result.outcome.is_success() {
                "Success".to_string()
            } else {
                match result.outcome.message() {
                    Some(message) => format!("**Failed**: {}", message),
                    None => "**Failed**".to_string(),
                }
            };
            writeln!(
                writer,
                "* {} *{}* ({}) {}",
                result.property, result.module, result.port, status
            )?;
        }
    }

    Ok(())
}
