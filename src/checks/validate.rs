//! Validation primitives shared by every module's `validate_config`.
//!
//! All functions are pure and report failures as
//! [`CheckError::InvalidArgument`] carrying the parameter name, the value
//! that was given and a human readable reason.

use crate::checks::Pattern;
use crate::error::{CheckError, CheckResult};
use crate::types::Port;

/// Parse an integer and check it lies within `[min, max]`.
pub fn number(value: &str, min: i64, max: i64, name: &str, reason: &str) -> CheckResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(CheckError::invalid_argument(name, value, reason)),
    }
}

/// Parse a port number (1-65535).
pub fn port(value: &str) -> CheckResult<Port> {
    let n = number(
        value,
        i64::from(Port::MIN),
        i64::from(Port::MAX),
        "port",
        "is not a valid port number",
    )?;
    Port::try_from(n).map_err(|e| CheckError::invalid_argument("port", value, e.to_string()))
}

/// Compile a regular expression.
pub fn regex(value: &str, name: &str) -> CheckResult<Pattern> {
    Pattern::new(value)
        .map_err(|_| CheckError::invalid_argument(name, value, "is not a valid regular expression"))
}

/// Parse a boolean flag.
pub fn flag(value: &str, name: &str) -> CheckResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CheckError::invalid_argument(name, value, "is not a bool")),
    }
}

/// Validate the `port` parameter every module carries.
pub fn port_param(params: &crate::checks::Params) -> CheckResult<Port> {
    port(params.require("port")?)
}
