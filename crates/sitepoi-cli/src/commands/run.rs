use crate::cli::RunArgs;
use crate::config_loader::load_config_with_overrides;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output::OutputWriter;
use crate::output_types::RunOutput;
use crate::progress::RunProgress;
use anyhow::{Context, Result};
use chrono::Utc;
use sitepoi_core::models::PoiQuery;
use sitepoi_overpass::OverpassClient;
use sitepoi_pipeline::{EnrichmentPipeline, RunPlan, OUTPUT_FILE_NAME};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn execute(args: RunArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    let mut overrides = super::clustering_overrides(&args.clustering);
    overrides.overpass_url = args.overpass_url.clone();
    overrides.max_concurrent_queries = args.max_concurrent_queries;

    let layered = load_config_with_overrides(args.clustering.config.as_deref(), overrides)?;
    let config = layered.to_pipeline_config()?;

    let source = Arc::new(OverpassClient::new(&config.source)?);
    let pipeline = EnrichmentPipeline::new(config, source);

    if dry_run {
        let plan = pipeline.plan(&args.site_file)?;
        let endpoint = &pipeline.config().source.endpoint;
        let actions = planned_actions(&plan, endpoint, &args);
        return display_planned_actions(output, &actions);
    }

    output.info(format!("Enriching sites from {}", args.site_file.display()));
    info!(
        site_file = %args.site_file.display(),
        staging_dir = %args.staging_dir.display(),
        endpoint = %pipeline.config().source.endpoint,
        "Starting enrichment run"
    );

    let started_at = Utc::now();
    let mut progress = RunProgress::new(!output.is_json());
    let summary = pipeline
        .run_with_progress(&args.site_file, &args.staging_dir, &args.output_dir, |event| {
            progress.update(event)
        })
        .await
        .context("Enrichment run failed")?;
    progress.finish();
    let finished_at = Utc::now();

    if summary.failed_queries > 0 {
        warn!(
            failed = summary.failed_queries,
            queries = summary.queries,
            "Run finished with failed POI queries"
        );
    }

    if output.is_json() {
        output.result(RunOutput::new(&summary, started_at, finished_at))?;
    } else {
        output.success("Enrichment complete");
        output.section("Run Summary");
        output.kv("Sites", summary.sites);
        output.kv("Outliers removed", summary.outliers);
        output.kv("Clusters", summary.clusters);
        output.kv("Noise sites", summary.noise_sites);
        output.kv("Queries", summary.queries);
        output.kv("POIs", summary.pois);
        output.kv("Duplicates dropped", summary.duplicates);
        output.kv("Proximity edges", summary.edges);
        output.kv("Output", summary.output_path.display());
        output.kv("Duration", format!("{:.1}s", (finished_at - started_at).num_milliseconds() as f64 / 1000.0));

        if summary.failed_queries > 0 {
            output.warning(format!(
                "{} of {} POI queries failed; affected sites were enriched with empty results",
                summary.failed_queries, summary.queries
            ));
        }
    }

    Ok(())
}

fn planned_actions(plan: &RunPlan, endpoint: &str, args: &RunArgs) -> Vec<PlannedAction> {
    let mut actions: Vec<PlannedAction> = plan
        .queries
        .iter()
        .map(|planned| {
            let action = PlannedAction::new(ActionType::QueryPois, format!("Query POIs for {}", planned.target))
                .with_detail(format!("Endpoint: {}", endpoint));
            match &planned.query {
                PoiQuery::BoundingBox(bbox) => action.with_detail(format!(
                    "Bounding box: ({}, {}, {}, {})",
                    bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
                )),
                PoiQuery::Around { lat, lon, radius_m } => {
                    action.with_detail(format!("Radius: {} m around ({}, {})", radius_m, lat, lon))
                }
            }
        })
        .collect();

    actions.push(
        PlannedAction::new(ActionType::WriteFile, "Write staging files")
            .with_detail(format!("Directory: {}", args.staging_dir.display()))
            .with_detail(format!("Sites: {} ({} outliers removed)", plan.sites.len(), plan.outliers)),
    );
    actions.push(
        PlannedAction::new(ActionType::WriteFile, "Write enriched site table")
            .with_detail(format!("Path: {}", args.output_dir.join(OUTPUT_FILE_NAME).display())),
    );

    actions
}
