//! Sitepoi CLI - Command-line interface
//!
//! Runs the site enrichment pipeline against an Overpass endpoint.

mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;
use output::OutputWriter;

fn main() {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli, &output)));

    if let Err(error) = result {
        if output.is_json() {
            output.error(format!("{:#}", error));
        } else {
            errors::from_anyhow(&error).display();
        }
        std::process::exit(1);
    }
}
