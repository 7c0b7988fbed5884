use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod config;
mod logging;

use cli::Args;
use commands::execute_command;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init_with_defaults(logging::default_filter(args.debug)) {
        eprintln!("{e}");
    }
    debug!(command = ?args.command, "Starting pbi");

    if let Err(e) = execute_command(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
