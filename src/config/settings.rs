//! Application settings and paths.
//!
//! Settings come from (lowest to highest precedence) built-in defaults, the
//! settings file, `DIRAC_*` environment variables and command-line flags.

use crate::engine::RunSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::report::ReportFormat;
use crate::transport::TransportOptions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding `timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "DIRAC_TIMEOUT_MS";
/// Environment variable overriding `concurrency`.
pub const ENV_CONCURRENCY: &str = "DIRAC_CONCURRENCY";

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/dirac)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories, if the home directory is known.
    pub fn discover() -> Option<Self> {
        let project = ProjectDirs::from("org", "dirac", "dirac")?;
        Some(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Connect and read timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of exchanges in flight.
    pub concurrency: usize,
    /// Largest reply kept per exchange.
    pub max_response_bytes: usize,
    /// Report format used when `--output` is given without `--report`.
    pub report_format: Option<ReportFormat>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            concurrency: 32,
            max_response_bytes: 1024,
            report_format: None,
        }
    }
}

impl AppSettings {
    /// Load settings from `explicit`, else from the default location, else
    /// use defaults. Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut settings = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Paths::discover().map(|p| p.settings_file()) {
                Some(file) if file.exists() => Self::load_from(&file)?,
                _ => Self::default(),
            },
        };
        settings.apply_env_from(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded settings");

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Apply `DIRAC_*` overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_env(ENV_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_env(ENV_CONCURRENCY, &value)?;
        }
        Ok(())
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> ConfigResult<()> {
        let zero = |name: &str| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be greater than 0".to_string(),
        };
        if self.timeout_ms == 0 {
            return Err(zero("timeout_ms"));
        }
        if self.concurrency == 0 {
            return Err(zero("concurrency"));
        }
        if self.max_response_bytes == 0 {
            return Err(zero("max_response_bytes"));
        }
        Ok(())
    }

    /// Engine settings derived from these settings.
    pub fn run_settings(&self, progress: bool) -> RunSettings {
        RunSettings {
            transport: TransportOptions {
                timeout: Duration::from_millis(self.timeout_ms),
                max_response_bytes: self.max_response_bytes,
            },
            concurrency: self.concurrency,
            progress,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("'{}' is not a number", value),
    })
}
