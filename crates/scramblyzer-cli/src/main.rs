mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod utils;

use crate::cli::Cli;
use crate::config::{PartialConfig, Settings};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!(
        "🚀 Scramblyzer v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let settings = PartialConfig::load(cli.config.as_deref())?.merge_with_cli(&cli)?;
    let progress = if cli.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };

    let command_result = match settings {
        Settings::Composition(settings) => {
            info!("Dispatching to 'composition' command.");
            commands::composition::run(settings, &progress)
        }
        Settings::Rate(settings) => {
            info!("Dispatching to 'rate' command.");
            commands::rate::run(settings, &progress)
        }
        Settings::FlipFlops(settings) => {
            info!("Dispatching to 'flipflops' command.");
            commands::flipflops::run(settings, &progress)
        }
        Settings::Positions(settings) => {
            info!("Dispatching to 'positions' command.");
            commands::positions::run(settings, &progress)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
