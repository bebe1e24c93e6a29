//! # Dirac - host properties checker
//!
//! Dirac verifies that hosts expose the services they are supposed to. A
//! check suite names groups of hosts and, for each group, a list of
//! properties: "port 22 speaks SSH 2.0", "port 3306 is a MySQL server",
//! "GET / on port 80 answers 200". Each property is checked by sending a
//! small protocol challenge and judging the reply.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use dirac::checks::{CheckModule, Params, SshChecker};
//! use dirac::engine::probe;
//! use dirac::transport::TransportOptions;
//! use dirac::types::{Endpoint, Port};
//!
//! #[tokio::main]
//! async fn main() {
//!     let params = Params::new()
//!         .with("port", 22)
//!         .with("version", "2.0")
//!         .with("software", "OpenSSH.*");
//!     let checker = SshChecker::construct(SshChecker::validate_config(&params).unwrap());
//!     let endpoint = Endpoint::new("192.168.1.1", Port::new(22).unwrap());
//!
//!     let outcome = probe(&checker, &endpoint, TransportOptions::default()).await;
//!     println!("{} is {}", endpoint, outcome);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`checks`] - Protocol checkers, the `Checker`/`CheckModule` traits and the module registry
//! - [`suite`] - Check suite loading and validation
//! - [`transport`] - Network exchanges for each protocol tag
//! - [`engine`] - Concurrent suite execution
//! - [`report`] - Console and file reports
//! - [`config`] - Application settings
//! - [`types`] - Core newtypes
//! - [`error`] - Error types

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod suite;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use checks::{CheckModule, Checker, ModuleRegistry, Params, ProtocolTag, Response};
pub use engine::{run_suite, Outcome, SuiteRun};
pub use error::{CheckError, CheckResult, SuiteError};
pub use suite::CheckSuite;
pub use types::{Endpoint, Port};
