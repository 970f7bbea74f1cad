use chrono::{DateTime, Utc};
use serde::Serialize;
use sitepoi_pipeline::{EnrichSummary, RunPlan, RunSummary};

/// Output for run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub sites: usize,
    pub outliers_removed: usize,
    pub clusters: usize,
    pub noise_sites: usize,
    pub queries: usize,
    pub failed_queries: usize,
    pub pois: usize,
    pub duplicates_dropped: usize,
    pub proximity_edges: usize,
    pub output_file: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutput {
    pub fn new(summary: &RunSummary, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        Self {
            sites: summary.sites,
            outliers_removed: summary.outliers,
            clusters: summary.clusters,
            noise_sites: summary.noise_sites,
            queries: summary.queries,
            failed_queries: summary.failed_queries,
            pois: summary.pois,
            duplicates_dropped: summary.duplicates,
            proximity_edges: summary.edges,
            output_file: summary.output_path.display().to_string(),
            started_at,
            finished_at,
        }
    }
}

/// Output for plan command
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub sites: usize,
    pub outliers_removed: usize,
    pub clusters: Vec<ClusterInfo>,
    pub noise_sites: usize,
    pub bbox_queries: usize,
    pub radius_queries: usize,
}

#[derive(Debug, Serialize)]
pub struct ClusterInfo {
    pub cluster_id: u32,
    pub sites: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl From<&RunPlan> for PlanOutput {
    fn from(plan: &RunPlan) -> Self {
        let clusters = plan
            .boxes
            .iter()
            .map(|bbox| ClusterInfo {
                cluster_id: bbox.cluster_id,
                sites: plan
                    .sites
                    .iter()
                    .filter(|s| s.cluster_id.and_then(|l| l.cluster_id()) == Some(bbox.cluster_id))
                    .count(),
                min_lat: bbox.min_lat,
                max_lat: bbox.max_lat,
                min_lon: bbox.min_lon,
                max_lon: bbox.max_lon,
            })
            .collect::<Vec<_>>();

        Self {
            sites: plan.sites.len(),
            outliers_removed: plan.outliers,
            bbox_queries: clusters.len(),
            clusters,
            noise_sites: plan.noise_sites(),
            radius_queries: plan.noise_sites(),
        }
    }
}

/// Output for enrich command
#[derive(Debug, Serialize)]
pub struct EnrichOutput {
    pub sites: usize,
    pub pois: usize,
    pub proximity_edges: usize,
    pub output_file: String,
}

impl From<&EnrichSummary> for EnrichOutput {
    fn from(summary: &EnrichSummary) -> Self {
        Self {
            sites: summary.sites,
            pois: summary.pois,
            proximity_edges: summary.edges,
            output_file: summary.output_path.display().to_string(),
        }
    }
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}
