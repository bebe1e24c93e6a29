//! JSON report.

use crate::engine::{HostSummary, PropertyRun, SuiteRun};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: String,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    duration_ms: u64,
    succeeded: usize,
    failed: usize,
    summary: Vec<HostSummary>,
    results: &'a [PropertyRun],
}

/// Write the run as pretty-printed JSON.
pub fn write_json<W: Write>(run: &SuiteRun, mut writer: W) -> io::Result<()> {
    let report = JsonReport {
        run_id: run.id.to_string(),
        started_at: run.started_at,
        completed_at: run.completed_at,
        duration_ms: run.duration_ms,
        succeeded: run.succeeded(),
        failed: run.failed(),
        summary: run.summary(),
        results: &run.results,
    };
    serde_json::to_writer_pretty(&mut writer, &report).map_err(io::Error::other)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn test_json_report() {
        let run = fixtures::run();
        let mut out = Vec::new();
        write_json(&run, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["run_id"], run.id.to_string());
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["summary"][0]["host"], "heimbot.fritz.box");
        assert_eq!(value["results"][0]["property"], "Checking SSH");
        assert_eq!(value["results"][0]["protocol"], "text/tcp");
        assert_eq!(value["results"][0]["port"], 22);
        assert_eq!(value["results"][1]["outcome"]["status"], "response_check");
    }
}
