use async_trait::async_trait;
use sitepoi_core::config::{LayeredConfig, PipelineConfig};
use sitepoi_core::error::{QueryFailureKind, Result, SitePoiError};
use sitepoi_core::models::{ClusterLabel, PoiCategory, PoiCenter, PoiQuery, QueryTarget, RawPoi};
use sitepoi_core::ports::PoiSource;
use sitepoi_geo::{haversine_m, SiteClusterer, EARTH_RADIUS_M};
use sitepoi_pipeline::staging::read_output;
use sitepoi_pipeline::{enrich_from_staging, EnrichmentPipeline, RunPlanner, StagingLayout, OUTPUT_FILE_NAME};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-memory POI source answering queries from a fixed catalogue
struct CatalogueSource {
    catalogue: Vec<RawPoi>,
    queries: Mutex<Vec<PoiQuery>>,
    fail: bool,
}

impl CatalogueSource {
    fn new(catalogue: Vec<RawPoi>) -> Self {
        Self { catalogue, queries: Mutex::new(Vec::new()), fail: false }
    }

    fn failing() -> Self {
        Self { catalogue: Vec::new(), queries: Mutex::new(Vec::new()), fail: true }
    }

    fn issued(&self) -> Vec<PoiQuery> {
        self.queries.lock().unwrap().clone()
    }
}

fn position(poi: &RawPoi) -> (f64, f64) {
    match (poi.lat, poi.lon, poi.center) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(center)) => (center.lat, center.lon),
        _ => (f64::NAN, f64::NAN),
    }
}

#[async_trait]
impl PoiSource for CatalogueSource {
    async fn fetch(&self, query: &PoiQuery) -> Result<Vec<RawPoi>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(SitePoiError::query_failure("catalogue", QueryFailureKind::Status(400), "bad query"));
        }

        let hits = self
            .catalogue
            .iter()
            .filter(|poi| {
                let (lat, lon) = position(poi);
                match query {
                    PoiQuery::BoundingBox(bbox) => bbox.contains(lat, lon),
                    PoiQuery::Around { lat: qlat, lon: qlon, radius_m } => {
                        haversine_m(*qlat, *qlon, lat, lon) <= *radius_m
                    }
                }
            })
            .cloned()
            .collect();
        Ok(hits)
    }

    fn name(&self) -> &str {
        "catalogue"
    }
}

/// Labels sites by latitude band: everything below 51° is cluster 0
struct BandClusterer;

impl SiteClusterer for BandClusterer {
    fn cluster(&self, coordinates: &[(f64, f64)]) -> Result<Vec<ClusterLabel>> {
        Ok(coordinates
            .iter()
            .map(|(lat, _)| if *lat < 51.0 { ClusterLabel::Cluster(0) } else { ClusterLabel::Noise })
            .collect())
    }

    fn name(&self) -> &str {
        "band"
    }
}

/// Clusterer that always rejects its input
struct RejectingClusterer;

impl SiteClusterer for RejectingClusterer {
    fn cluster(&self, _coordinates: &[(f64, f64)]) -> Result<Vec<ClusterLabel>> {
        Err(SitePoiError::Clustering("degenerate input".to_string()))
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

fn config() -> PipelineConfig {
    let mut config = LayeredConfig::with_defaults().to_pipeline_config().unwrap();
    config.fetch.retry.max_attempts = 1;
    config
}

fn north_of(lat: f64, meters: f64) -> f64 {
    lat + (meters / EARTH_RADIUS_M).to_degrees()
}

fn node(id: i64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> RawPoi {
    RawPoi {
        element_type: "node".to_string(),
        id,
        lat: Some(lat),
        lon: Some(lon),
        center: None,
        tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
    }
}

fn write_sites(dir: &Path, rows: &[(&str, f64, f64)]) -> PathBuf {
    let mut contents = String::from("id,geoCoordinates,locality,postalCode,state,operatorId,operatorName\n");
    for (id, lat, lon) in rows {
        contents.push_str(&format!("{},\"[{}, {}]\",Town,12345,State,OP,Operator\n", id, lon, lat));
    }
    let path = dir.join("sites.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

struct Dirs {
    _root: TempDir,
    site_file: PathBuf,
    staging: PathBuf,
    output: PathBuf,
}

fn dirs(rows: &[(&str, f64, f64)]) -> Dirs {
    let root = TempDir::new().unwrap();
    let site_file = write_sites(root.path(), rows);
    let staging = root.path().join("staging");
    let output = root.path().join("output");
    Dirs { _root: root, site_file, staging, output }
}

#[tokio::test]
async fn test_noise_site_with_fast_food_nearby() {
    let dirs = dirs(&[("S1", 50.0, 10.0), ("S2", 60.0, 10.0), ("S3", 52.0, 13.0)]);
    let source = Arc::new(CatalogueSource::new(vec![
        node(100, north_of(50.0, 50.0), 10.0, &[("amenity", "fast_food"), ("brand", "Snack Inn")]),
        node(200, north_of(50.0, 500.0), 10.0, &[("amenity", "fuel")]),
    ]));

    let pipeline = EnrichmentPipeline::new(config(), source.clone());
    let summary = pipeline.run(&dirs.site_file, &dirs.staging, &dirs.output).await.unwrap();

    assert_eq!(summary.sites, 2);
    assert_eq!(summary.outliers, 1);
    assert_eq!(summary.clusters, 0);
    assert_eq!(summary.noise_sites, 2);
    assert_eq!(summary.queries, 2);
    assert_eq!(summary.failed_queries, 0);
    assert_eq!(summary.edges, 1);

    let rows = read_output(&summary.output_path).unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.site_id.as_str()).collect();
    assert_eq!(ids, vec!["S1", "S3"]);

    let s1 = &rows[0];
    assert_eq!(s1.total_num_pois, 1);
    assert_eq!(s1.num_fast_food, 1);
    assert_eq!(s1.num_fuel_stations, 0);
    assert_eq!(s1.num_supermarkets, 0);
    assert_eq!(s1.closest_category, Some(PoiCategory::FastFood));
    assert_eq!(s1.brand.as_deref(), Some("Snack Inn"));
    assert_eq!(s1.locality.as_deref(), Some("Town"));

    let s3 = &rows[1];
    assert_eq!(s3.total_num_pois, 0);
    assert_eq!(s3.num_fast_food, 0);
    assert_eq!(s3.closest_category, None);
    assert_eq!(s3.has_toilet, None);

    let staging = StagingLayout::new(&dirs.staging);
    assert!(staging.raw_path(&QueryTarget::Site("S1".to_string())).exists());
    assert!(staging.raw_path(&QueryTarget::Site("S3".to_string())).exists());
    assert!(!staging.raw_path(&QueryTarget::Site("S2".to_string())).exists());

    let staged_sites = staging.read_sites().unwrap();
    assert!(staged_sites.iter().all(|s| s.site_id != "S2"));
    assert!(staged_sites.iter().all(|s| s.is_noise()));

    let edges = staging.read_edges().unwrap();
    assert_eq!(edges.len(), 1);
    assert!((edges[0].distance_m - 50.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_staging_rerun_reproduces_output() {
    let dirs = dirs(&[("S1", 50.0, 10.0), ("S3", 52.0, 13.0)]);
    let source = Arc::new(CatalogueSource::new(vec![node(
        100,
        north_of(50.0, 30.0),
        10.0,
        &[("amenity", "fuel"), ("toilets", "yes")],
    )]));

    let pipeline = EnrichmentPipeline::new(config(), source);
    let summary = pipeline.run(&dirs.site_file, &dirs.staging, &dirs.output).await.unwrap();
    let first = read_output(&summary.output_path).unwrap();

    let rerun_dir = dirs.output.join("rerun");
    let rerun = enrich_from_staging(&dirs.staging, &rerun_dir).unwrap();
    let second = read_output(&rerun.output_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(rerun.sites, 2);
    assert_eq!(rerun.edges, 1);
    assert_eq!(second[0].has_toilet, Some(true));
}

#[tokio::test]
async fn test_failed_queries_degrade_to_empty() {
    let dirs = dirs(&[("S1", 50.0, 10.0), ("S3", 52.0, 13.0)]);
    let source = Arc::new(CatalogueSource::failing());

    let pipeline = EnrichmentPipeline::new(config(), source);
    let summary = pipeline.run(&dirs.site_file, &dirs.staging, &dirs.output).await.unwrap();

    assert_eq!(summary.failed_queries, 2);
    let rows = read_output(&summary.output_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.total_num_pois == 0 && r.closest_category.is_none()));
}

#[tokio::test]
async fn test_cluster_uses_single_bbox_query_and_dedupes() {
    let dirs = dirs(&[
        ("C1", 50.0, 10.0),
        ("C2", 50.001, 10.001),
        ("C3", 50.002, 10.0),
        ("N1", 52.0, 13.0),
    ]);
    let mut market = node(300, 0.0, 0.0, &[("shop", "supermarket"), ("brand", "Rewe")]);
    market.element_type = "way".to_string();
    market.lat = None;
    market.lon = None;
    market.center = Some(PoiCenter { lat: 50.0005, lon: 10.0005 });

    let source = Arc::new(CatalogueSource::new(vec![market]));
    let pipeline = EnrichmentPipeline::new(config(), source.clone()).with_clusterer(Box::new(BandClusterer));
    let summary = pipeline.run(&dirs.site_file, &dirs.staging, &dirs.output).await.unwrap();

    assert_eq!(summary.clusters, 1);
    assert_eq!(summary.noise_sites, 1);
    assert_eq!(summary.queries, 2);
    assert_eq!(summary.pois, 1);

    let issued = source.issued();
    assert_eq!(issued.iter().filter(|q| matches!(q, PoiQuery::BoundingBox(_))).count(), 1);
    assert_eq!(issued.iter().filter(|q| matches!(q, PoiQuery::Around { .. })).count(), 1);

    let rows = read_output(&summary.output_path).unwrap();
    let by_id: BTreeMap<&str, _> = rows.iter().map(|r| (r.site_id.as_str(), r)).collect();
    assert_eq!(by_id["C1"].num_supermarkets, 1);
    assert_eq!(by_id["C2"].num_supermarkets, 1);
    assert_eq!(by_id["C1"].brand.as_deref(), Some("Rewe"));
    // C3 sits roughly 170 m from the market centroid
    assert_eq!(by_id["C3"].total_num_pois, 0);
    assert_eq!(by_id["N1"].total_num_pois, 0);

    let staging = StagingLayout::new(&dirs.staging);
    assert!(staging.raw_path(&QueryTarget::Cluster(0)).exists());
}

#[tokio::test]
async fn test_plan_issues_no_queries() {
    let dirs = dirs(&[("S1", 50.0, 10.0), ("S2", 60.0, 10.0)]);
    let source = Arc::new(CatalogueSource::new(Vec::new()));

    let pipeline = EnrichmentPipeline::new(config(), source.clone());
    let plan = pipeline.plan(&dirs.site_file).unwrap();

    assert_eq!(plan.sites.len(), 1);
    assert_eq!(plan.outliers, 1);
    assert_eq!(plan.queries.len(), 1);
    assert!(source.issued().is_empty());
}

#[tokio::test]
async fn test_unparseable_coordinates_abort_run() {
    let root = TempDir::new().unwrap();
    let site_file = root.path().join("sites.csv");
    std::fs::write(&site_file, "id,geoCoordinates\nS1,\"not a pair\"\n").unwrap();

    let pipeline = EnrichmentPipeline::new(config(), Arc::new(CatalogueSource::new(Vec::new())));
    let result = pipeline.run(&site_file, &root.path().join("staging"), &root.path().join("out")).await;

    assert!(matches!(result, Err(SitePoiError::Parse { row: 1, .. })));
}

#[test]
fn test_planner_needs_no_source() {
    let dirs = dirs(&[("S1", 50.0, 10.0), ("S2", 50.0001, 10.0001), ("S3", 52.0, 13.0)]);

    let plan = RunPlanner::new(config()).with_clusterer(Box::new(BandClusterer)).plan(&dirs.site_file).unwrap();

    assert_eq!(plan.sites.len(), 3);
    assert_eq!(plan.boxes.len(), 1);
    assert_eq!(plan.noise_sites(), 1);
    let targets: Vec<&QueryTarget> = plan.queries.iter().map(|q| &q.target).collect();
    assert_eq!(targets, vec![&QueryTarget::Cluster(0), &QueryTarget::Site("S3".to_string())]);
}

#[tokio::test]
async fn test_clustering_failure_aborts_run() {
    let dirs = dirs(&[("S1", 50.0, 10.0), ("S2", 50.0001, 10.0001)]);
    let source = Arc::new(CatalogueSource::new(Vec::new()));

    let pipeline = EnrichmentPipeline::new(config(), source.clone()).with_clusterer(Box::new(RejectingClusterer));
    let result = pipeline.run(&dirs.site_file, &dirs.staging, &dirs.output).await;

    assert!(matches!(result, Err(SitePoiError::Clustering(_))));
    assert!(source.issued().is_empty());
    assert!(!dirs.output.join(OUTPUT_FILE_NAME).exists());
    assert!(!StagingLayout::new(&dirs.staging).sites_path().exists());
}
