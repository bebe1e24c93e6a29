use anyhow::{Context, Result};
use clap::Parser;
use dirac::checks::ModuleRegistry;
use dirac::cli::{Cli, Commands};
use dirac::config::AppSettings;
use dirac::report;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise only warnings unless --verbose.
    let default_filter = if cli.verbose { "dirac=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            report::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let registry = ModuleRegistry::builtin();

    match cli.command {
        Commands::Run(command) => {
            let settings = AppSettings::load(cli.config.as_deref()).context("Failed to load settings")?;
            command.execute(settings, &registry).await
        }
        Commands::Validate(command) => Ok(command.execute(&registry)),
        Commands::Modules(command) => {
            command.execute(&registry);
            Ok(true)
        }
    }
}
