//! Shroud CLI - the `shroud` binary entry point.

use anyhow::Result;
use clap::Parser;

use shroud_cli::{Cli, Commands};
use shroud_core::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format.clone().into());

    match cli.command {
        Commands::Suppress(args) => shroud_cli::commands::suppress::execute(&args, &cli.format),
    }
}
