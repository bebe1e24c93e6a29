//! Network endpoint of a single property check.

use crate::types::Port;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A host (name or address literal) paired with a validated port.
///
/// Resolution is deferred to the transport layer so that a suite can be
/// loaded and validated without touching the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Hostname or IP address as written in the inventory.
    pub host: String,
    /// Destination port.
    pub port: Port,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(host: impl Into<String>, port: Port) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host and port in the form accepted by `tokio::net::lookup_host`.
    ///
    /// IPv6 literals are bracketed.
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.port)
    }
}
