//! Wrangler CLI - clean and transform tabular data from the command line.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze { file, json } => commands::analyze::run(file, json, cli.verbose),

        Commands::Suggest { file, json } => commands::suggest::run(file, json, cli.verbose),

        Commands::Apply {
            file,
            recipe,
            output,
            format,
        } => commands::apply::run(file, recipe, output, format, cli.verbose),

        Commands::Convert {
            file,
            output,
            format,
        } => commands::convert::run(file, output, format, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for `--json`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
