//! Examstat CLI - examination results analysis tool.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file, json } => commands::validate::run(file, json, cli.verbose),

        Commands::Analyze { file, json, opts } => {
            commands::analyze::run(file, json, opts, cli.verbose)
        }

        Commands::Report { file, output, opts } => {
            commands::report::run(file, output, opts, cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
