//! Connection-only checkers.
//!
//! Reaching the port is the whole test. The transport reports a failed
//! connection as an execution error long before `check_response` runs, so
//! these checkers accept whatever they are given.

use crate::checks::{validate, CheckModule, Checker, Params, ProtocolTag, Response};
use crate::error::CheckResult;
use crate::types::Port;

/// Validated parameters shared by both connection checkers.
#[derive(Debug, Clone)]
pub struct PortConfig {
    pub port: Port,
}

/// Opens a TCP connection and reads whatever the server volunteers.
#[derive(Debug, Clone)]
pub struct RawTcpChecker {
    config: PortConfig,
}

/// Opens a TCP connection and closes it again.
#[derive(Debug, Clone)]
pub struct ConnectTcpChecker {
    config: PortConfig,
}

impl RawTcpChecker {
    pub fn port(&self) -> Port {
        self.config.port
    }
}

impl ConnectTcpChecker {
    pub fn port(&self) -> Port {
        self.config.port
    }
}

impl Checker for RawTcpChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn check_response(&self, _response: &Response<'_>) -> CheckResult<bool> {
        Ok(true)
    }
}

impl Checker for ConnectTcpChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn check_response(&self, _response: &Response<'_>) -> CheckResult<bool> {
        Ok(true)
    }
}

impl CheckModule for RawTcpChecker {
    type Config = PortConfig;

    const NAME: &'static str = "raw_tcp";
    const PROTOCOL: ProtocolTag = ProtocolTag::RawTcp;

    fn validate_config(params: &Params) -> CheckResult<PortConfig> {
        Ok(PortConfig {
            port: validate::port_param(params)?,
        })
    }

    fn construct(config: PortConfig) -> Self {
        Self { config }
    }
}

impl CheckModule for ConnectTcpChecker {
    type Config = PortConfig;

    const NAME: &'static str = "connect_tcp";
    const PROTOCOL: ProtocolTag = ProtocolTag::ConnectTcp;

    fn validate_config(params: &Params) -> CheckResult<PortConfig> {
        Ok(PortConfig {
            port: validate::port_param(params)?,
        })
    }

    fn construct(config: PortConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_succeeds() {
        let params = Params::new().with("port", 8080);
        let raw = RawTcpChecker::construct(RawTcpChecker::validate_config(&params).unwrap());
        let connect =
            ConnectTcpChecker::construct(ConnectTcpChecker::validate_config(&params).unwrap());

        for response in [
            Response::Nothing,
            Response::Connected,
            Response::Text("anything"),
            Response::Bytes(&[0xde, 0xad]),
        ] {
            assert!(raw.check_response(&response).unwrap());
            assert!(connect.check_response(&response).unwrap());
        }
        assert!(raw.challenge().is_none());
        assert!(connect.challenge().is_none());
        assert_eq!(raw.port(), connect.port());
    }

    #[test]
    fn test_port_bounds() {
        for port in [1i64, 22, 65535] {
            let params = Params::new().with("port", port);
            assert!(RawTcpChecker::validate_config(&params).is_ok());
            assert!(ConnectTcpChecker::validate_config(&params).is_ok());
        }
        for port in [-1i64, 0, 65536, 100_000] {
            let params = Params::new().with("port", port);
            assert!(RawTcpChecker::validate_config(&params).is_err());
            assert!(ConnectTcpChecker::validate_config(&params).is_err());
        }
    }

    #[test]
    fn test_protocol_tags() {
        assert_eq!(RawTcpChecker::PROTOCOL, ProtocolTag::RawTcp);
        assert_eq!(ConnectTcpChecker::PROTOCOL, ProtocolTag::ConnectTcp);
    }
}
