//! HTTP and HTTPS status checkers.
//!
//! The transport performs the HTTP exchange and parses the reply; these
//! checkers only compare the status code. Headers and body are passed along
//! for callers that want them but are not matched here.

use std::fmt;

use crate::checks::{
    validate, Challenge, CheckModule, Checker, Params, ProtocolTag, Response,
};
use crate::error::{CheckError, CheckResult};
use crate::types::Port;

/// Request methods a check may use.
const ALLOWED_VERBS: &[&str] = &["GET"];

/// URL scheme a check talks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Scheme of an absolute URI, or `None` for a bare path.
    pub fn of_uri(uri: &str) -> Option<&str> {
        uri.split_once("://").map(|(scheme, _)| scheme)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated HTTP parameters.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub port: Port,
    pub verb: String,
    pub uri: String,
    pub response_code: u16,
}

impl HttpConfig {
    /// Validate parameters for a check speaking `scheme`.
    ///
    /// `uri` is either an absolute path or an absolute URI of the same scheme.
    pub fn from_params(params: &Params, scheme: Scheme) -> CheckResult<Self> {
        let port = validate::port_param(params)?;

        let verb = params.require("verb")?;
        let normalized = verb.trim().to_ascii_uppercase();
        if !ALLOWED_VERBS.contains(&normalized.as_str()) {
            return Err(CheckError::invalid_argument("verb", verb, "is not a valid HTTP verb"));
        }

        let uri = params.require("uri")?;
        match Scheme::of_uri(uri) {
            Some(found) if !found.eq_ignore_ascii_case(scheme.as_str()) => {
                return Err(CheckError::invalid_argument(
                    "uri",
                    uri,
                    format!("does not use the {} scheme", scheme),
                ))
            }
            None if !uri.starts_with('/') => {
                return Err(CheckError::invalid_argument("uri", uri, "is not a valid URI"))
            }
            _ => {}
        }

        let response_code = validate::number(
            params.require("response_code")?,
            1,
            599,
            "response_code",
            "is not a valid HTTP response code",
        )?;

        Ok(Self {
            port,
            verb: normalized,
            uri: uri.to_string(),
            response_code: response_code as u16,
        })
    }

    fn challenge(&self) -> Challenge {
        Challenge::Text(format!("{} {}", self.verb, self.uri))
    }

    /// Compare a status code obtained by the caller against the expectation.
    pub fn check_status(&self, status: u16) -> CheckResult<bool> {
        if status != self.response_code {
            return Err(CheckError::response_check(format!(
                "Unexpected response code '{}'; expected '{}'.",
                status, self.response_code
            )));
        }
        Ok(true)
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        match response {
            Response::Http(reply) => self.check_status(reply.status),
            other => Err(CheckError::response_check(format!(
                "Expected an HTTP response, got {}.",
                other.kind()
            ))),
        }
    }
}

/// Plain HTTP status check.
#[derive(Debug, Clone)]
pub struct HttpChecker {
    config: HttpConfig,
}

impl HttpChecker {
    pub fn check_status(&self, status: u16) -> CheckResult<bool> {
        self.config.check_status(status)
    }
}

impl Checker for HttpChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn challenge(&self) -> Option<Challenge> {
        Some(self.config.challenge())
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        self.config.check_response(response)
    }
}

impl CheckModule for HttpChecker {
    type Config = HttpConfig;

    const NAME: &'static str = "http";
    const PROTOCOL: ProtocolTag = ProtocolTag::HttpTcp;

    fn validate_config(params: &Params) -> CheckResult<HttpConfig> {
        HttpConfig::from_params(params, Scheme::Http)
    }

    fn construct(config: HttpConfig) -> Self {
        Self { config }
    }
}

/// HTTP status check over TLS.
#[derive(Debug, Clone)]
pub struct HttpsChecker {
    config: HttpConfig,
}

impl Checker for HttpsChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn challenge(&self) -> Option<Challenge> {
        Some(self.config.challenge())
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        self.config.check_response(response)
    }
}

impl CheckModule for HttpsChecker {
    type Config = HttpConfig;

    const NAME: &'static str = "https";
    const PROTOCOL: ProtocolTag = ProtocolTag::HttpsTcp;

    fn validate_config(params: &Params) -> CheckResult<HttpConfig> {
        HttpConfig::from_params(params, Scheme::Https)
    }

    fn construct(config: HttpConfig) -> Self {
        Self { config }
    }
}
