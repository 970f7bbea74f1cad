use crate::cli::EnrichArgs;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output::OutputWriter;
use crate::output_types::EnrichOutput;
use anyhow::{Context, Result};
use sitepoi_pipeline::{enrich_from_staging, StagingLayout, OUTPUT_FILE_NAME};

pub fn execute(args: EnrichArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    if dry_run {
        let staging = StagingLayout::new(&args.staging_dir);
        let actions = vec![
            PlannedAction::new(ActionType::WriteFile, "Rebuild enriched site table from staging")
                .with_detail(format!("Sites: {}", staging.sites_path().display()))
                .with_detail(format!("Edges: {}", staging.edges_path().display()))
                .with_detail(format!("Output: {}", args.output_dir.join(OUTPUT_FILE_NAME).display())),
        ];
        return display_planned_actions(output, &actions);
    }

    let summary =
        enrich_from_staging(&args.staging_dir, &args.output_dir).context("Failed to rebuild features")?;

    if output.is_json() {
        output.result(EnrichOutput::from(&summary))?;
    } else {
        output.success("Features rebuilt from staging");
        output.kv("Sites", summary.sites);
        output.kv("POIs", summary.pois);
        output.kv("Proximity edges", summary.edges);
        output.kv("Output", summary.output_path.display());
    }

    Ok(())
}
