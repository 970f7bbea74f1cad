//! Sitepoi Pipeline - Site cleaning, POI fetching and feature aggregation
//!
//! Stages run in order: clean, cluster, fetch, normalize, join, aggregate.
//! Each stage hands an immutable value to the next and writes its output to
//! the staging directory.

pub mod cleaner;
pub mod features;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod staging;

pub use cleaner::{clean_sites, load_sites, parse_coordinates, CleanedSites};
pub use features::{aggregate_features, extract_poi_features};
pub use fetch::{plan_queries, FetchCoordinator, FetchResults, PlannedQuery};
pub use normalize::{normalize_pois, NormalizedPois};
pub use pipeline::{
    enrich_from_staging, EnrichSummary, EnrichmentPipeline, PipelinePhase, PipelineProgress, RunPlan,
    RunPlanner, RunSummary,
};
pub use staging::{StagingLayout, OUTPUT_FILE_NAME};
