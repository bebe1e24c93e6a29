//! CSV report.

use crate::engine::SuiteRun;
use std::io::{self, Write};

/// Write one row per property and host.
pub fn write_csv<W: Write>(run: &SuiteRun, writer: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "hosts", "host", "property", "module", "protocol", "port", "result", "message",
        "duration_ms",
    ])?;

    for result in &run.results {
        wtr.write_record([
            result.hosts.as_str(),
            result.host.as_str(),
            result.property.as_str(),
            result.module.as_str(),
            result.protocol.as_str(),
            result.port.to_string().as_str(),
            result.outcome.label(),
            result.outcome.message().unwrap_or(""),
            result.duration_ms.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
