//! SMTP greeting checker.
//!
//! Expects `<code>[-| ]<text>` and checks both the reply code and the
//! software signature of the whole greeting.

use crate::checks::{
    validate, Challenge, CheckModule, Checker, Params, Pattern, ProtocolTag, Response,
};
use crate::error::{CheckError, CheckResult};
use crate::types::Port;

/// PROXY protocol v1 header sent ahead of the challenge in proxy mode.
const PROXY_HEADER: &str = "PROXY TCP4 127.0.0.1 127.0.0.1 63322 25\n";

/// Validated SMTP parameters.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub port: Port,
    pub software: Pattern,
    pub proxy: bool,
    pub return_code: u16,
}

#[derive(Debug, Clone)]
pub struct SmtpChecker {
    config: SmtpConfig,
}

impl Checker for SmtpChecker {
    fn protocol(&self) -> ProtocolTag {
        Self::PROTOCOL
    }

    fn challenge(&self) -> Option<Challenge> {
        let mut challenge = String::new();
        if self.config.proxy {
            challenge.push_str(PROXY_HEADER);
        }
        challenge.push_str("quit\n");
        Some(Challenge::Text(challenge))
    }

    fn check_response(&self, response: &Response<'_>) -> CheckResult<bool> {
        let text = response.text()?;
        let token = text.split(['-', ' ']).next().unwrap_or_default().trim();
        let code: u16 = token.parse().map_err(|_| {
            CheckError::response_check(format!("Invalid identification string '{}' in response.", text))
        })?;

        if code != self.config.return_code {
            return Err(CheckError::response_check(format!(
                "Unexpected result code '{}'; expected '{}'.",
                code, self.config.return_code
            )));
        }

        if !self.config.software.matches_start(text) {
            return Err(CheckError::response_check(format!(
                "Unexpected software version '{}'; expected to match against '{}'.",
                text, self.config.software
            )));
        }

        Ok(true)
    }
}

impl CheckModule for SmtpChecker {
    type Config = SmtpConfig;

    const NAME: &'static str = "smtp";
    const PROTOCOL: ProtocolTag = ProtocolTag::TextTcp;

    fn validate_config(params: &Params) -> CheckResult<SmtpConfig> {
        let port = validate::port_param(params)?;
        let software = validate::regex(params.require("software")?, "software")?;
        let proxy = match params.get("proxy") {
            Some(value) => validate::flag(value, "proxy")?,
            None => false,
        };
        let return_code = validate::number(
            params.require("return_code")?,
            100,
            600,
            "return_code",
            "is not a valid return code",
        )?;

        Ok(SmtpConfig {
            port,
            software,
            proxy,
            return_code: return_code as u16,
        })
    }

    fn construct(config: SmtpConfig) -> Self {
        Self { config }
    }
}
