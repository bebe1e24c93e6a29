//! DNS-over-UDP presence checker.
//!
//! Sends a fixed datagram and treats any non-empty reply as confirmation that
//! something answers on the port. Silence is not a match.

use crate::checks::{validate, Challenge, CheckModule, Checker, Params, ProtocolTag, Response};
use crate::error::CheckResult;
use crate::types::Port;

/// Datagram sent to provoke a reply.
const BANNER: &str = "Dirac";

/// Validated DNS parameters.
#[derive(Debug, Clone)]
pub struct DnsUdpConfig {
    pub port: Port,
}

#[derive(Debug, Clone)]
pub struct DnsUdpChecker {
    config: DnsUdpConfig,
}

impl Checker for DnsUdpChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn challenge(&self) -> Option<Challenge> {
        Some(Challenge::Text(BANNER.to_string()))
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        Ok(match response {
            Response::Text(text) => !text.is_empty(),
            Response::Bytes(bytes) => !bytes.is_empty(),
            Response::Http(_) => true,
            Response::Nothing | Response::Connected => false,
        })
    }
}

impl CheckModule for DnsUdpChecker {
    type Config = DnsUdpConfig;

    const NAME: &'static str = "dns_udp";
    const PROTOCOL: ProtocolTag = ProtocolTag::TextUdp;

    fn validate_config(params: &Params) -> CheckResult<DnsUdpConfig> {
        Ok(DnsUdpConfig {
            port: validate::port_param(params)?,
        })
    }

    fn construct(config: DnsUdpConfig) -> Self {
        Self { config }
    }
}

impl DnsUdpChecker {
    pub fn port(&self) -> Port {
        self.config.port
    }
}
