//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `dirac run <suite>...` - Run check suites against their inventories
//! - `dirac validate <suite>...` - Load and validate suites without running them
//! - `dirac modules` - List the available check modules

mod modules;
mod run;
mod validate;

pub use modules::ModulesCommand;
pub use run::RunCommand;
pub use validate::ValidateCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dirac - host property checker.
///
/// Verifies that the services listed in a check suite really speak the
/// protocol they are expected to, by sending a short challenge and checking
/// the reply.
#[derive(Parser, Debug)]
#[command(name = "dirac")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dirac host properties checker", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run check suites
    #[command(alias = "r")]
    Run(RunCommand),

    /// Validate check suites without touching the network
    #[command(alias = "v")]
    Validate(ValidateCommand),

    /// List available check modules
    #[command(alias = "m")]
    Modules(ModulesCommand),
}
