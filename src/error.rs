//! Error types for Dirac.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer has its own
//! error enum and `Result` alias; the binary glues them together with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by protocol checkers.
///
/// These are the only two error kinds a checker ever produces. Neither is
/// fatal: both are scoped to a single checker invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A configuration parameter is missing or outside its domain.
    #[error("'{argument}': '{value}'{}", .reason.as_ref().map(|r| format!(" {r}")).unwrap_or_default())]
    InvalidArgument {
        argument: String,
        value: String,
        reason: Option<String>,
    },

    /// The captured response is malformed or does not match expectations.
    #[error("{0}")]
    ResponseCheck(String),
}

impl CheckError {
    /// Build an `InvalidArgument` error with a reason.
    pub fn invalid_argument(
        argument: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            value: value.into(),
            reason: Some(reason.into()),
        }
    }

    /// Build a `ResponseCheck` error.
    pub fn response_check(message: impl Into<String>) -> Self {
        Self::ResponseCheck(message.into())
    }

    /// Name of the offending parameter, for `InvalidArgument` errors.
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { argument, .. } => Some(argument),
            Self::ResponseCheck(_) => None,
        }
    }
}

/// Result type alias for checker operations.
pub type CheckResult<T> = Result<T, CheckError>;

/// Errors raised while loading a check suite.
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Failed to read check suite {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid check suite format: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("Check suite entry {index} is neither an inventory nor a check")]
    UnknownEntry { index: usize },

    #[error("Check for hosts '{0}' refers to an unknown inventory group")]
    UnknownInventory(String),

    #[error("Property '{property}' uses unknown module '{module}'")]
    UnknownModule { property: String, module: String },

    #[error("Property '{property}': {reason}")]
    MalformedProperty { property: String, reason: String },

    #[error("Property '{property}' has an invalid argument {source}")]
    InvalidProperty {
        property: String,
        #[source]
        source: CheckError,
    },
}

/// Result type alias for suite loading.
pub type SuiteResult<T> = Result<T, SuiteError>;

/// Errors raised while exchanging a challenge with a target.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Could not resolve {0}")]
    Resolve(String),

    #[error("Connection to {target} failed: {reason}")]
    ConnectionFailed { target: String, reason: String },

    #[error("Connection timed out")]
    Timeout,

    #[error("HTTP exchange failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("Invalid setting '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
