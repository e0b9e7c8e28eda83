//! # blockprobe
//!
//! Checks a list of domains for network-level blocking. Each domain is probed
//! over the host's direct path; failures are re-probed through a transient
//! `WireGuard` tunnel and the verdict is appended to a CSV log.
//!
//! ## Modules
//! - [`cli`]: Command-line argument parsing and command handlers.
//! - [`config`]: Runtime configuration and `.env` loading.
//! - [`core`]: Prober, domain list, results log and the classification workflow.
//! - [`tunnel`]: Tunnel lifecycle and the run-scoped session guard.
//! - [`platform`]: External tunnel tooling.

mod cli;
mod config;
mod constants;
mod core;
mod interrupt;
mod logger;
mod platform;
mod state;
mod tunnel;
mod utils;

use std::path::Path;

use clap::Parser;
use cli::args::Args;
use color_eyre::Result;
use config::{DotenvStatus, RunConfig};
use logger::LogLevel;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Must precede argument parsing so env fallbacks see the file's values
    let dotenv = config::load_dotenv(Path::new(constants::DOTENV_FILE));

    let args = Args::parse();
    let config = RunConfig::from_args(&args)
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {e}"))?;

    logger::set_min_level(if config.debug {
        LogLevel::Debug
    } else {
        logger::parse_log_level(constants::DEFAULT_LOG_LEVEL)
    });

    match dotenv {
        DotenvStatus::Loaded(n) => {
            crate::log_debug!("CONFIG", "Applied {n} variables from {}", constants::DOTENV_FILE);
        }
        DotenvStatus::NotFound => {}
        DotenvStatus::Invalid(e) => {
            crate::log_warning!("CONFIG", "Ignoring {}: {e}", constants::DOTENV_FILE);
        }
    }

    crate::log_debug!("CONFIG", "{:?}", config.tunnel);

    if !utils::is_root() {
        crate::log_warning!("APP", "{}", constants::CLI_MSG_NOT_ROOT);
    }

    if !interrupt::install() {
        crate::log_warning!(
            "APP",
            "Could not install signal handlers; an interrupt will skip tunnel teardown"
        );
    }

    crate::log_info!("APP", "{} v{} starting", constants::APP_NAME, constants::APP_VERSION);
    cli::commands::handle_command(args.command, &config)
}
