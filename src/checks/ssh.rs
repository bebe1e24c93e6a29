//! SSH identification string checker.
//!
//! Per RFC 4253, section 4.2, a server announces itself with
//! `SSH-<protoversion>-<softwareversion> [comments]`. The checker reads that
//! banner; it never sends anything.

use crate::checks::{validate, CheckModule, Checker, Params, Pattern, ProtocolTag, Response};
use crate::error::{CheckError, CheckResult};
use crate::types::Port;

/// Validated SSH parameters.
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub port: Port,
    pub version: String,
    pub software: Pattern,
}

#[derive(Debug, Clone)]
pub struct SshChecker {
    config: SshConfig,
}

impl Checker for SshChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        let text = response.text()?;
        let identification = text.split_whitespace().next().unwrap_or_default();

        let mut parts = identification.splitn(3, '-');
        let (Some(prefix), Some(version), Some(software)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CheckError::response_check(format!(
                "Invalid identification string '{}' in response; cf. RFC4253, section 4.2.",
                text.trim()
            )));
        };

        if prefix != "SSH" {
            return Err(CheckError::response_check(format!(
                "Invalid prefix '{}' in response; cf. RFC4253, section 4.2.",
                prefix
            )));
        }

        if version != self.config.version {
            return Err(CheckError::response_check(format!(
                "Unexpected version '{}'; expected '{}'.",
                version, self.config.version
            )));
        }

        if !self.config.software.matches_start(software) {
            return Err(CheckError::response_check(format!(
                "Unexpected software version '{}'; expected to match against '{}'.",
                software, self.config.software
            )));
        }

        Ok(true)
    }
}

impl CheckModule for SshChecker {
    type Config = SshConfig;

    const NAME: &'static str = "ssh";
    const PROTOCOL: ProtocolTag = ProtocolTag::TextTcp;

    fn validate_config(params: &Params) -> CheckResult<SshConfig> {
        let port = validate::port_param(params)?;
        let version = params.require("version")?;
        if version.trim().is_empty() {
            return Err(CheckError::invalid_argument(
                "version",
                version,
                "is not a valid protocol version",
            ));
        }
        let software = validate::regex(params.require("software")?, "software")?;

        Ok(SshConfig {
            port,
            version: version.trim().to_string(),
            software,
        })
    }

    fn construct(config: SshConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> SshChecker {
        let params = Params::new()
            .with("port", 22)
            .with("version", "2.0")
            .with("software", "OpenSSH.*");
        SshChecker::construct(SshChecker::validate_config(&params).unwrap())
    }

    #[test]
    fn test_openssh_ubuntu_banner() {
        let response = Response::Text("SSH-2.0-OpenSSH_6.6.1p1 Ubuntu-2ubuntu2");
        assert!(checker().check_response(&response).unwrap());
    }

    #[test]
    fn test_banner_with_line_ending() {
        let response = Response::Text("SSH-2.0-OpenSSH_8.9p1\r\n");
        assert!(checker().check_response(&response).unwrap());
    }

    #[test]
    fn test_bad_prefix() {
        let err = checker()
            .check_response(&Response::Text("FOO-2.0-OpenSSH_6.6.1p1"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid prefix 'FOO'"));
    }

    #[test]
    fn test_wrong_version() {
        let err = checker()
            .check_response(&Response::Text("SSH-1.99-OpenSSH_3.9p1"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Unexpected version '1.99'"));
    }

    #[test]
    fn test_wrong_software() {
        let err = checker()
            .check_response(&Response::Text("SSH-2.0-dropbear_2019.78"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Unexpected software version 'dropbear_2019.78'"));
    }

    #[test]
    fn test_too_few_parts() {
        for banner in ["SSH-2.0", "", "   ", "220 ftp ready"] {
            let err = checker().check_response(&Response::Text(banner)).unwrap_err();
            assert!(err.to_string().starts_with("Invalid identification string"));
        }
    }

    #[test]
    fn test_software_may_contain_dashes() {
        let params = Params::new()
            .with("port", 22)
            .with("version", "2.0")
            .with("software", "Cisco-1.25");
        let checker = SshChecker::construct(SshChecker::validate_config(&params).unwrap());
        assert!(checker.check_response(&Response::Text("SSH-2.0-Cisco-1.25")).unwrap());
    }

    #[test]
    fn test_no_challenge() {
        assert!(checker().challenge().is_none());
    }

    #[test]
    fn test_validate_requires_version() {
        let params = Params::new().with("port", 22).with("software", ".*");
        assert_eq!(
            SshChecker::validate_config(&params).unwrap_err().argument(),
            Some("version")
        );
    }
}
