pub mod backends;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod operations;
pub mod packages;
pub mod traits;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;

/// Run the unipkg CLI entrypoint.
pub fn run_cli() {
    // Color settings first so every later message honours them
    ui::init_colors();

    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.format.is_machine());

    if let Err(e) = utils::logging::init(args.global.verbose) {
        eprintln!("{}", e);
    }

    if let Err(e) = cli::dispatcher::dispatch(&args) {
        tracing::debug!(error = ?e, "command failed");
        ui::error(&format!("{}", e));
        exit(1);
    }
}
