//! End-to-end orchestration of the enrichment stages

use sitepoi_core::config::PipelineConfig;
use sitepoi_core::error::Result;
use sitepoi_core::models::{ClusterBoundingBox, Site};
use sitepoi_core::ports::PoiSource;
use sitepoi_geo::{
    assign_clusters, compute_proximity_edges, extract_cluster_bounding_boxes, HdbscanClusterer, SiteClusterer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::cleaner::load_sites;
use crate::features::aggregate_features;
use crate::fetch::{plan_queries, FetchCoordinator, PlannedQuery};
use crate::normalize::normalize_pois;
use crate::staging::{write_output, StagingLayout};

/// Progress information for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    pub phase: PipelinePhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Current stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Cleaning,
    Clustering,
    FetchingPois,
    Normalizing,
    ComputingProximity,
    Aggregating,
}

/// Everything decided before the first external query
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Cleaned and labelled sites, in input order
    pub sites: Vec<Site>,
    pub outliers: usize,
    pub boxes: Vec<ClusterBoundingBox>,
    pub queries: Vec<PlannedQuery>,
}

impl RunPlan {
    pub fn noise_sites(&self) -> usize {
        self.sites.iter().filter(|s| s.is_noise()).count()
    }
}

/// Counts reported at the end of a full run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub sites: usize,
    pub outliers: usize,
    pub clusters: usize,
    pub noise_sites: usize,
    pub queries: usize,
    pub failed_queries: usize,
    pub pois: usize,
    pub duplicates: usize,
    pub edges: usize,
    pub output_path: PathBuf,
}

/// Counts reported by a staging-only re-run
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichSummary {
    pub sites: usize,
    pub pois: usize,
    pub edges: usize,
    pub output_path: PathBuf,
}

/// Cleans and clusters the site file and plans the external queries
///
/// Needs no POI source, so a plan can be produced without network access.
pub struct RunPlanner {
    config: PipelineConfig,
    clusterer: Box<dyn SiteClusterer>,
}

impl RunPlanner {
    /// Create a planner using HDBSCAN with the configured parameters
    pub fn new(config: PipelineConfig) -> Self {
        let clusterer = Box::new(HdbscanClusterer::new(config.clustering));
        Self { config, clusterer }
    }

    /// Replace the clustering strategy
    pub fn with_clusterer(mut self, clusterer: Box<dyn SiteClusterer>) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn plan(&self, site_file: &Path) -> Result<RunPlan> {
        self.plan_with_progress(site_file, &mut |_: PipelineProgress| {})
    }

    fn plan_with_progress<F>(&self, site_file: &Path, progress: &mut F) -> Result<RunPlan>
    where
        F: FnMut(PipelineProgress),
    {
        progress(PipelineProgress {
            phase: PipelinePhase::Cleaning,
            current: 0,
            total: 1,
            message: format!("Reading {}", site_file.display()),
        });
        let cleaned = load_sites(site_file, &self.config.region)?;

        progress(PipelineProgress {
            phase: PipelinePhase::Clustering,
            current: 0,
            total: cleaned.sites.len(),
            message: format!("Clustering {} sites", cleaned.sites.len()),
        });
        let sites = assign_clusters(cleaned.sites, self.clusterer.as_ref())?;

        let boxes = extract_cluster_bounding_boxes(&sites, self.config.bbox_padding_deg);
        let queries = plan_queries(&sites, &boxes, self.config.query_radius_m);

        Ok(RunPlan { sites, outliers: cleaned.outliers, boxes, queries })
    }
}

/// Runs clean → cluster → fetch → normalize → join → aggregate
pub struct EnrichmentPipeline {
    planner: RunPlanner,
    source: Arc<dyn PoiSource>,
}

impl EnrichmentPipeline {
    /// Create a pipeline using HDBSCAN with the configured parameters
    pub fn new(config: PipelineConfig, source: Arc<dyn PoiSource>) -> Self {
        Self { planner: RunPlanner::new(config), source }
    }

    /// Replace the clustering strategy
    pub fn with_clusterer(mut self, clusterer: Box<dyn SiteClusterer>) -> Self {
        self.planner = self.planner.with_clusterer(clusterer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        self.planner.config()
    }

    /// Clean and cluster the site file and plan the external queries
    pub fn plan(&self, site_file: &Path) -> Result<RunPlan> {
        self.planner.plan(site_file)
    }

    /// Run the full pipeline
    pub async fn run(&self, site_file: &Path, staging_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
        self.run_with_progress(site_file, staging_dir, output_dir, |_| {}).await
    }

    /// Run the full pipeline with progress reporting
    pub async fn run_with_progress<F>(
        &self,
        site_file: &Path,
        staging_dir: &Path,
        output_dir: &Path,
        mut progress: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(PipelineProgress),
    {
        let staging = StagingLayout::new(staging_dir);
        let plan = self.planner.plan_with_progress(site_file, &mut progress)?;
        staging.write_sites(&plan.sites)?;

        let total_queries = plan.queries.len();
        progress(PipelineProgress {
            phase: PipelinePhase::FetchingPois,
            current: 0,
            total: total_queries,
            message: format!("Issuing {} POI queries", total_queries),
        });
        let config = self.planner.config();
        let coordinator = FetchCoordinator::new(self.source.clone(), config.fetch);
        let fetched = coordinator
            .fetch_all_with_progress(&plan.queries, |current, total| {
                progress(PipelineProgress {
                    phase: PipelinePhase::FetchingPois,
                    current,
                    total,
                    message: "Fetching POIs".to_string(),
                })
            })
            .await;

        for (target, elements) in &fetched.by_target {
            staging.write_raw(target, elements)?;
        }

        progress(PipelineProgress {
            phase: PipelinePhase::Normalizing,
            current: 0,
            total: fetched.total_elements(),
            message: "Normalizing POIs".to_string(),
        });
        let normalized = normalize_pois(fetched.by_target.values().map(Vec::as_slice));
        staging.write_category_pois(&normalized.by_category())?;

        progress(PipelineProgress {
            phase: PipelinePhase::ComputingProximity,
            current: 0,
            total: plan.sites.len(),
            message: "Computing site/POI distances".to_string(),
        });
        let edges = compute_proximity_edges(&plan.sites, &normalized.records, config.proximity_cutoff_m);
        staging.write_edges(&edges)?;

        progress(PipelineProgress {
            phase: PipelinePhase::Aggregating,
            current: 0,
            total: plan.sites.len(),
            message: "Aggregating site features".to_string(),
        });
        let rows = aggregate_features(&plan.sites, &edges, &normalized.records);
        let output_path = write_output(output_dir, &rows)?;

        let summary = RunSummary {
            sites: plan.sites.len(),
            outliers: plan.outliers,
            clusters: plan.boxes.len(),
            noise_sites: plan.noise_sites(),
            queries: total_queries,
            failed_queries: fetched.failed.len(),
            pois: normalized.records.len(),
            duplicates: normalized.duplicates,
            edges: edges.len(),
            output_path,
        };

        info!(
            sites = summary.sites,
            clusters = summary.clusters,
            noise = summary.noise_sites,
            edges = summary.edges,
            output = %summary.output_path.display(),
            "Enrichment complete"
        );

        Ok(summary)
    }
}

/// Rebuild the enriched table from staging files alone
pub fn enrich_from_staging(staging_dir: &Path, output_dir: &Path) -> Result<EnrichSummary> {
    let staging = StagingLayout::new(staging_dir);
    let sites = staging.read_sites()?;
    let pois = staging.read_pois()?;
    let edges = staging.read_edges()?;

    let rows = aggregate_features(&sites, &edges, &pois);
    let output_path = write_output(output_dir, &rows)?;

    info!(sites = sites.len(), pois = pois.len(), edges = edges.len(), "Rebuilt features from staging");

    Ok(EnrichSummary { sites: sites.len(), pois: pois.len(), edges: edges.len(), output_path })
}
