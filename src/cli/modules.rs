//! Modules subcommand implementation.

use crate::checks::{ModuleRegistry, ProtocolTag};
use clap::Parser;
use console::style;

/// List the available check modules and the transport each one uses.
#[derive(Parser, Debug)]
pub struct ModulesCommand {
    /// Only list modules using this protocol tag (e.g. "text/tcp")
    #[arg(short, long, value_name = "TAG")]
    pub protocol: Option<ProtocolTag>,
}

impl ModulesCommand {
    pub fn execute(&self, registry: &ModuleRegistry) {
        for entry in registry.entries() {
            if self.protocol.is_some_and(|p| p != entry.protocol) {
                continue;
            }
            println!("{:<12} {}", style(entry.name).bold(), entry.protocol);
        }
    }
}
