use crate::cli::PlanArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::PlanOutput;
use anyhow::Result;
use sitepoi_pipeline::RunPlanner;
use tabled::Tabled;

pub fn execute(args: PlanArgs, output: &OutputWriter) -> Result<()> {
    let overrides = super::clustering_overrides(&args.clustering);
    let config = load_config_with_overrides(args.clustering.config.as_deref(), overrides)?.to_pipeline_config()?;

    let plan = RunPlanner::new(config).plan(&args.site_file)?;
    let summary = PlanOutput::from(&plan);

    if output.is_json() {
        return output.result(summary);
    }

    output.section("Site Partition");
    output.kv("Sites", summary.sites);
    output.kv("Outliers removed", summary.outliers_removed);
    output.kv("Clusters", summary.clusters.len());
    output.kv("Noise sites", summary.noise_sites);

    output.section("Queries");
    output.kv("Bounding-box queries", summary.bbox_queries);
    output.kv("Radius queries", summary.radius_queries);
    output.kv("Total", summary.bbox_queries + summary.radius_queries);

    if args.detailed {
        #[derive(Tabled)]
        struct ClusterRow {
            #[tabled(rename = "Cluster")]
            cluster: u32,
            #[tabled(rename = "Sites")]
            sites: usize,
            #[tabled(rename = "Latitude")]
            lat: String,
            #[tabled(rename = "Longitude")]
            lon: String,
        }

        let rows: Vec<ClusterRow> = summary
            .clusters
            .iter()
            .map(|c| ClusterRow {
                cluster: c.cluster_id,
                sites: c.sites,
                lat: format!("{:.4} .. {:.4}", c.min_lat, c.max_lat),
                lon: format!("{:.4} .. {:.4}", c.min_lon, c.max_lon),
            })
            .collect();

        output.section("Clusters");
        output.table(rows);
    }

    Ok(())
}
