//! FTP greeting checker.
//!
//! An FTP server greets every client with `<code> <text>`, usually
//! `220 <banner>`. The checker compares the leading code against the
//! configured one.

use crate::checks::{validate, CheckModule, Checker, Params, ProtocolTag, Response};
use crate::error::{CheckError, CheckResult};
use crate::types::Port;

/// Validated FTP parameters.
#[derive(Debug, Clone)]
pub struct FtpConfig {
    pub port: Port,
    pub response_code: u16,
}

#[derive(Debug, Clone)]
pub struct FtpChecker {
    config: FtpConfig,
}

impl Checker for FtpChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        let text = response.text()?;
        let token = text.split(' ').next().unwrap_or_default().trim();
        let code: u16 = token.parse().map_err(|_| {
            CheckError::response_check(format!("Invalid response code '{}' in response.", token))
        })?;

        if code != self.config.response_code {
            return Err(CheckError::response_check(format!(
                "Unexpected response code '{}'; expected '{}'.",
                code, self.config.response_code
            )));
        }

        Ok(true)
    }
}

impl CheckModule for FtpChecker {
    type Config = FtpConfig;

    const NAME: &'static str = "ftp";
    const PROTOCOL: ProtocolTag = ProtocolTag::TextTcp;

    fn validate_config(params: &Params) -> CheckResult<FtpConfig> {
        let port = validate::port_param(params)?;
        let response_code = validate::number(
            params.require("response_code")?,
            1,
            699,
            "response_code",
            "is not a valid FTP response code",
        )?;

        Ok(FtpConfig {
            port,
            response_code: response_code as u16,
        })
    }

    fn construct(config: FtpConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(code: u16) -> FtpChecker {
        let params = Params::new().with("port", 21).with("response_code", code);
        FtpChecker::construct(FtpChecker::validate_config(&params).unwrap())
    }

    #[test]
    fn test_validate_config() {
        let params = Params::new().with("port", 21).with("response_code", 220);
        let config = FtpChecker::validate_config(&params).unwrap();
        assert_eq!(config.port.as_u16(), 21);
        assert_eq!(config.response_code, 220);
    }

    #[test]
    fn test_validate_rejects_code_out_of_range() {
        let params = Params::new().with("port", 21).with("response_code", 700);
        let err = FtpChecker::validate_config(&params).unwrap_err();
        assert_eq!(err.argument(), Some("response_code"));
    }

    #[test]
    fn test_validate_requires_code() {
        let params = Params::new().with("port", 21);
        let err = FtpChecker::validate_config(&params).unwrap_err();
        assert_eq!(err.argument(), Some("response_code"));
    }

    #[test]
    fn test_proftpd_greeting() {
        assert!(checker(220).check_response(&Response::Text("220 FTP Server")).unwrap());
    }

    #[test]
    fn test_greeting_with_line_ending() {
        let response = Response::Text("220 ProFTPD 1.3.5 Server (Debian) [::ffff:10.0.2.15]\r\n");
        assert!(checker(220).check_response(&response).unwrap());
        assert!(checker(220).check_response(&Response::Text("220\r\n")).unwrap());
    }

    #[test]
    fn test_unexpected_code() {
        let err = checker(220)
            .check_response(&Response::Text("421 Too many connections"))
            .unwrap_err();
        assert!(matches!(err, CheckError::ResponseCheck(ref m) if m.contains("'421'")));
    }

    #[test]
    fn test_garbage_response() {
        let result = checker(220).check_response(&Response::Text("SSH-2.0-OpenSSH_7.4"));
        assert!(matches!(result, Err(CheckError::ResponseCheck(_))));
        let result = checker(220).check_response(&Response::Nothing);
        assert!(matches!(result, Err(CheckError::ResponseCheck(_))));
    }

    #[test]
    fn test_no_challenge() {
        assert!(checker(220).challenge().is_none());
        assert_eq!(checker(220).protocol(), ProtocolTag::TextTcp);
    }
}
