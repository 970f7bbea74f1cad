use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Sitepoi - Enrich sites with nearby points of interest
#[derive(Parser, Debug)]
#[command(name = "sitepoi")]
#[command(about = "Enrich retail and fuel sites with nearby POI statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full enrichment pipeline
    Run(RunArgs),

    /// Clean and cluster sites, then show the queries a run would issue
    Plan(PlanArgs),

    /// Rebuild the enriched table from an existing staging directory
    Enrich(EnrichArgs),

    /// Show the effective configuration and where each value came from
    Config(ConfigArgs),
}

/// Options shared by commands that cluster sites
#[derive(Args, Debug, Clone)]
pub struct ClusteringArgs {
    /// HDBSCAN linking radius in kilometres
    #[arg(long)]
    pub eps_km: Option<f64>,

    /// Smallest group of sites that counts as a cluster
    #[arg(long)]
    pub min_cluster_size: Option<usize>,

    /// Neighbourhood size for core-point density
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// CSV file with one row per site
    #[arg(long, value_name = "CSV")]
    pub site_file: PathBuf,

    /// Directory for intermediate files
    #[arg(long, value_name = "DIR")]
    pub staging_dir: PathBuf,

    /// Directory for enriched_site_data.csv
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Overpass interpreter endpoint
    #[arg(long, value_name = "URL")]
    pub overpass_url: Option<String>,

    /// Maximum number of queries in flight
    #[arg(long)]
    pub max_concurrent_queries: Option<usize>,

    #[command(flatten)]
    pub clustering: ClusteringArgs,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// CSV file with one row per site
    #[arg(long, value_name = "CSV")]
    pub site_file: PathBuf,

    /// List every planned query instead of a summary
    #[arg(long)]
    pub detailed: bool,

    #[command(flatten)]
    pub clustering: ClusteringArgs,
}

#[derive(Parser, Debug)]
pub struct EnrichArgs {
    /// Staging directory written by a previous run
    #[arg(long, value_name = "DIR")]
    pub staging_dir: PathBuf,

    /// Directory for enriched_site_data.csv
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
