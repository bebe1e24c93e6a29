//! Protocol checkers.
//!
//! Every checker answers a single question: does the captured response prove
//! that the expected service is present? Checkers are pure; the transport layer
//! owns all I/O and hands the captured reply over as a [`Response`].
//!
//! A checker comes to life in two steps. [`CheckModule::validate_config`]
//! turns raw [`Params`] into a typed configuration, failing with
//! [`CheckError::InvalidArgument`] before any network traffic happens.
//! [`CheckModule::construct`] then builds the checker from that configuration
//! and cannot fail.

pub mod dns_udp;
pub mod ftp;
pub mod http;
pub mod mysql;
pub mod pattern;
pub mod raw;
pub mod registry;
pub mod smtp;
pub mod ssh;
pub mod validate;

use crate::error::{CheckError, CheckResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use dns_udp::DnsUdpChecker;
pub use ftp::FtpChecker;
pub use http::{HttpChecker, HttpsChecker, Scheme};
pub use mysql::MysqlChecker;
pub use pattern::Pattern;
pub use raw::{ConnectTcpChecker, RawTcpChecker};
pub use registry::{ModuleEntry, ModuleRegistry};
pub use smtp::SmtpChecker;
pub use ssh::SshChecker;

/// Transport a checker expects its challenge to travel over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolTag {
    /// Plain TCP connect, nothing exchanged.
    #[serde(rename = "connect/tcp")]
    ConnectTcp,
    /// TCP exchange of raw bytes.
    #[serde(rename = "raw/tcp")]
    RawTcp,
    /// TCP exchange of text lines.
    #[serde(rename = "text/tcp")]
    TextTcp,
    /// UDP datagram exchange of text.
    #[serde(rename = "text/udp")]
    TextUdp,
    /// HTTP request over TCP.
    #[serde(rename = "http/tcp")]
    HttpTcp,
    /// HTTP request over TLS.
    #[serde(rename = "https/tcp")]
    HttpsTcp,
}

impl ProtocolTag {
    /// The tag as written in reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectTcp => "connect/tcp",
            Self::RawTcp => "raw/tcp",
            Self::TextTcp => "text/tcp",
            Self::TextUdp => "text/udp",
            Self::HttpTcp => "http/tcp",
            Self::HttpsTcp => "https/tcp",
        }
    }
}

impl fmt::Display for ProtocolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProtocolTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connect/tcp" => Ok(Self::ConnectTcp),
            "raw/tcp" => Ok(Self::RawTcp),
            "text/tcp" => Ok(Self::TextTcp),
            "text/udp" => Ok(Self::TextUdp),
            "http/tcp" => Ok(Self::HttpTcp),
            "https/tcp" => Ok(Self::HttpsTcp),
            _ => Err(format!("unknown protocol tag: {}", s)),
        }
    }
}

/// Raw parameters of one property, as supplied by a target descriptor.
///
/// All values are kept as strings; each module parses what it needs during
/// validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.insert(name.into(), value.to_string());
    }

    /// Look up an optional parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Look up a parameter that must be present.
    pub fn require(&self, name: &str) -> CheckResult<&str> {
        self.get(name)
            .ok_or_else(|| CheckError::invalid_argument(name, "", "is required"))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Outbound payload used to provoke an identifying response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    Text(String),
    Bytes(Vec<u8>),
}

impl Challenge {
    /// The payload as it goes on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Bytes(b) => b,
        }
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bytes(b) => write!(f, "{} bytes", b.len()),
        }
    }
}

/// A parsed HTTP reply, as produced by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Borrowed view of everything the caller captured from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'a> {
    /// The target accepted the connection but sent nothing back in time.
    Nothing,
    /// Connection established; no payload was expected.
    Connected,
    /// Raw bytes as read from the socket.
    Bytes(&'a [u8]),
    /// Text as read from the socket.
    Text(&'a str),
    /// A parsed HTTP reply.
    Http(&'a HttpReply),
}

impl<'a> Response<'a> {
    /// Short description of the response shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nothing => "no response",
            Self::Connected => "bare connection",
            Self::Bytes(_) => "binary response",
            Self::Text(_) => "text response",
            Self::Http(_) => "HTTP response",
        }
    }

    /// The response as text, for line oriented protocols.
    pub fn text(&self) -> CheckResult<&'a str> {
        match *self {
            Self::Text(s) => Ok(s),
            Self::Bytes(b) => std::str::from_utf8(b).map_err(|_| {
                CheckError::response_check("Response is not valid UTF-8 text.")
            }),
            other => Err(CheckError::response_check(format!(
                "Expected a text response, got {}.",
                other.kind()
            ))),
        }
    }
}

/// A configured protocol checker.
///
/// Implementations hold no per-call state, so a single instance may be shared
/// across threads and reused for any number of responses.
pub trait Checker: Send + Sync + fmt::Debug {
    /// Transport this checker's challenge travels over.
    fn protocol(&self) -> ProtocolTag;

    /// Payload to send before reading the response, if any.
    fn challenge(&self) -> Option<Challenge> {
        None
    }

    /// Decide whether the captured response proves the expected service.
    ///
    /// Returns `Ok(true)` on a match and `Ok(false)` when the response is
    /// deterministically not the expected protocol. A `ResponseCheck` error
    /// describes a concrete mismatch.
    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool>;
}

/// Static half of a protocol module: configuration handling.
pub trait CheckModule: Checker + Sized + 'static {
    /// Validated configuration.
    type Config;

    /// Module name used in check suites.
    const NAME: &'static str;

    /// Transport this module's checkers use.
    const PROTOCOL: ProtocolTag;

    /// Check the raw parameters and turn them into a typed configuration.
    fn validate_config(params: &Params) -> CheckResult<Self::Config>;

    /// Build a checker from an already validated configuration.
    fn construct(config: Self::Config) -> Self;
}
