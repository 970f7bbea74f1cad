//! Command implementations

mod config;
mod enrich;
mod plan;
mod run;

use crate::cli::{ClusteringArgs, Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use sitepoi_core::config::CliConfigOverrides;

/// Execute a CLI command
pub async fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::execute(args, output, cli.dry_run).await,
        Commands::Plan(args) => plan::execute(args, output),
        Commands::Enrich(args) => enrich::execute(args, output, cli.dry_run),
        Commands::Config(args) => config::execute(args, output),
    }
}

/// Clustering flags as configuration overrides
fn clustering_overrides(args: &ClusteringArgs) -> CliConfigOverrides {
    CliConfigOverrides {
        eps_km: args.eps_km,
        min_cluster_size: args.min_cluster_size,
        min_samples: args.min_samples,
        ..Default::default()
    }
}
