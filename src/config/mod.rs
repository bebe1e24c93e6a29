//! Configuration management for Dirac.
//!
//! Provides XDG-compliant settings lookup with environment overrides.

mod settings;

pub use settings::{AppSettings, Paths, ENV_CONCURRENCY, ENV_TIMEOUT_MS};
