//! build_env - Main entry point
//!
//! Prepares a clean machine for building: system packages first, then
//! third-party dependencies from source.

use anyhow::Context;
use build_env::cli::Cli;
use build_env::{BuildRequest, HostDetector};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the logger; `RUST_LOG` overrides the default level
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    info!("build_env starting up");

    // Terminate running package managers and builds if we are interrupted
    #[cfg(unix)]
    if let Err(e) = build_env::process_guard::init_signal_handlers() {
        tracing::warn!("Failed to initialize signal handlers: {}", e);
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let request = BuildRequest::from_cli(cli).context("Invalid command line")?;
    debug!("Build request: {:?}", request);

    build_env::app::run(&request, &HostDetector::new()).context("build_env failed")?;

    if !request.print_profile {
        info!("build_env finished");
    }
    Ok(())
}
