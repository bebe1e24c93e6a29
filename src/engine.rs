//! Engine: runs a check suite against its inventory.
//!
//! Every (property, host) pair becomes one job. Jobs run concurrently on the
//! tokio runtime, bounded by the configured concurrency; each job performs a
//! single transport exchange and hands the captured reply to the property's
//! checker.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::checks::{Checker, ModuleRegistry, ProtocolTag};
use crate::error::CheckError;
use crate::suite::{CheckSuite, Property};
use crate::transport::{self, TransportOptions};
use crate::types::{Endpoint, Port, RunId};

/// How a single property check ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// The response proved the expected service.
    Success,
    /// The response was deterministically not the expected protocol.
    NoMatch,
    /// The response did not match an expectation.
    ResponseCheck(String),
    /// The exchange itself failed (resolve, connect, I/O).
    Execution(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short label used by the console and tabular reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NoMatch => "Failed (N)",
            Self::ResponseCheck(_) => "Failed (R)",
            Self::Execution(_) => "Failed (E)",
        }
    }

    /// Failure detail, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::ResponseCheck(m) | Self::Execution(m) => Some(m),
            Self::Success | Self::NoMatch => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::NoMatch => write!(f, "no match"),
            Self::ResponseCheck(m) => write!(f, "response check failed: {}", m),
            Self::Execution(m) => write!(f, "execution failed: {}", m),
        }
    }
}

/// Result of one property on one host.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyRun {
    /// Inventory group the check targets.
    pub hosts: String,
    pub host: String,
    pub property: String,
    pub module: String,
    pub protocol: ProtocolTag,
    pub port: Port,
    pub outcome: Outcome,
    pub duration_ms: u64,
    #[serde(skip)]
    pub(crate) order: (usize, usize, usize),
}

/// Successes and failures of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSummary {
    pub host: String,
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything a suite run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteRun {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Results in suite order: check, then property, then host.
    pub results: Vec<PropertyRun>,
}

impl SuiteRun {
    /// Per-host success and failure counts, sorted by host.
    pub fn summary(&self) -> Vec<HostSummary> {
        let mut hosts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for result in &self.results {
            let entry = hosts.entry(result.host.as_str()).or_default();
            if result.outcome.is_success() {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        hosts
            .into_iter()
            .map(|(host, (succeeded, failed))| HostSummary {
                host: host.to_string(),
                succeeded,
                failed,
            })
            .collect()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// True when every property succeeded.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Knobs for a suite run.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub transport: TransportOptions,
    /// Maximum number of exchanges in flight.
    pub concurrency: usize,
    /// Show a progress bar on stderr.
    pub progress: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            transport: TransportOptions::default(),
            concurrency: 32,
            progress: false,
        }
    }
}

/// One (property, host) pair waiting to run.
struct Job<'a> {
    order: (usize, usize, usize),
    hosts: &'a str,
    host: &'a str,
    property: &'a Property,
    checker: Result<&'a dyn Checker, String>,
}

/// Run every property of `suite` against its hosts.
pub async fn run_suite(suite: &CheckSuite, registry: &ModuleRegistry, settings: &RunSettings) -> SuiteRun {
    let id = RunId::new();
    let started_at = Utc::now();
    let start = Instant::now();
    info!(run = %id.short(), jobs = suite.job_count(), "Running check suite");

    // Build each checker once; all hosts of a property share it.
    let checkers: Vec<Vec<Result<Box<dyn Checker>, String>>> = suite
        .checks
        .iter()
        .map(|check| {
            check
                .properties
                .iter()
                .map(|property| {
                    property.checker(registry).map_err(|e| {
                        warn!(property = %property.name, error = %e, "Could not build checker");
                        e.to_string()
                    })
                })
                .collect()
        })
        .collect();

    let mut jobs = Vec::with_capacity(suite.job_count());
    for (ci, check) in suite.checks.iter().enumerate() {
        for (pi, property) in check.properties.iter().enumerate() {
            for (hi, host) in suite.hosts(check).iter().enumerate() {
                let checker = match &checkers[ci][pi] {
                    Ok(checker) => Ok(checker.as_ref()),
                    Err(e) => Err(e.clone()),
                };
                jobs.push(Job {
                    order: (ci, pi, hi),
                    hosts: &check.hosts,
                    host,
                    property,
                    checker,
                });
            }
        }
    }

    let progress = settings.progress.then(|| {
        let pb = ProgressBar::new(jobs.len() as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    });

    let options = settings.transport;
    let mut results: Vec<PropertyRun> = stream::iter(jobs)
        .map(|job| {
            let progress = progress.clone();
            async move {
                let result = run_job(job, options).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                    if !result.outcome.is_success() {
                        pb.set_message(format!("{} failed on {}", result.property, result.host));
                    }
                }
                result
            }
        })
        .buffer_unordered(settings.concurrency.max(1))
        .collect()
        .await;

    if let Some(pb) = progress {
        pb.finish_with_message("Suite complete");
    }

    results.sort_by_key(|r| r.order);

    let run = SuiteRun {
        id,
        started_at,
        completed_at: Utc::now(),
        duration_ms: elapsed_ms(start.elapsed()),
        results,
    };
    info!(
        run = %run.id.short(),
        succeeded = run.succeeded(),
        failed = run.failed(),
        duration_ms = run.duration_ms,
        "Check suite finished"
    );
    run
}

async fn run_job(job: Job<'_>, options: TransportOptions) -> PropertyRun {
    let start = Instant::now();
    let endpoint = job.property.endpoint(job.host);
    debug!(
        property = %job.property.name,
        module = %job.property.module,
        %endpoint,
        "Running property"
    );

    let outcome = match job.checker {
        Ok(checker) => probe(checker, &endpoint, options).await,
        Err(e) => Outcome::Execution(e),
    };
    debug!(property = %job.property.name, %endpoint, %outcome, "Property finished");

    PropertyRun {
        hosts: job.hosts.to_string(),
        host: job.host.to_string(),
        property: job.property.name.clone(),
        module: job.property.module.clone(),
        protocol: job.property.protocol,
        port: job.property.port,
        outcome,
        duration_ms: elapsed_ms(start.elapsed()),
        order: job.order,
    }
}

/// Exchange `checker`'s challenge with `endpoint` and judge the reply.
pub async fn probe(checker: &dyn Checker, endpoint: &Endpoint, options: TransportOptions) -> Outcome {
    let transport = transport::for_protocol(checker.protocol(), options);
    let challenge = checker.challenge();

    let captured = match transport.exchange(endpoint, challenge.as_ref()).await {
        Ok(captured) => captured,
        Err(e) => return Outcome::Execution(e.to_string()),
    };
    debug!(%endpoint, len = captured.len(), "Captured reply");

    match checker.check_response(&captured.as_response()) {
        Ok(true) => Outcome::Success,
        Ok(false) => Outcome::NoMatch,
        Err(CheckError::ResponseCheck(message)) => Outcome::ResponseCheck(message),
        Err(e @ CheckError::InvalidArgument { .. }) => Outcome::Execution(e.to_string()),
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
