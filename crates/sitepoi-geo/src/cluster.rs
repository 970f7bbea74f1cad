//! Density-based clustering of sites on the sphere
//!
//! Sites are clustered with HDBSCAN under the haversine metric. The linking
//! radius is configured in kilometres, converted to an angle on the unit
//! sphere and then to the metric's own unit (metres) before being handed to
//! the clusterer.

use hdbscan::{DistanceMetric, Hdbscan, HdbscanHyperParams};
use sitepoi_core::config::ClusteringParams;
use sitepoi_core::error::{Result, SitePoiError};
use sitepoi_core::models::{ClusterLabel, Site};
use sitepoi_core::validation::{validate_latitude, validate_longitude};
use tracing::{debug, info};

use crate::distance::EARTH_RADIUS_M;

/// Assigns a cluster label to every point of a coordinate set
pub trait SiteClusterer: Send + Sync {
    /// Label each `(lat, lon)` pair, preserving input order
    fn cluster(&self, coordinates: &[(f64, f64)]) -> Result<Vec<ClusterLabel>>;

    fn name(&self) -> &str;
}

/// HDBSCAN with the haversine metric
pub struct HdbscanClusterer {
    params: ClusteringParams,
}

impl HdbscanClusterer {
    pub fn new(params: ClusteringParams) -> Self {
        Self { params }
    }

    /// Cluster selection epsilon in metres
    fn epsilon_m(&self) -> f64 {
        self.params.eps_radians() * EARTH_RADIUS_M
    }
}

impl SiteClusterer for HdbscanClusterer {
    fn cluster(&self, coordinates: &[(f64, f64)]) -> Result<Vec<ClusterLabel>> {
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        let required = self.params.min_cluster_size.max(self.params.min_samples);
        if coordinates.len() < required {
            debug!(
                sites = coordinates.len(),
                required, "Too few sites to form a cluster; labelling all as noise"
            );
            return Ok(vec![ClusterLabel::Noise; coordinates.len()]);
        }

        for (lat, lon) in coordinates {
            validate_latitude(*lat)
                .and_then(|_| validate_longitude(*lon))
                .map_err(|e| SitePoiError::Clustering(e.to_string()))?;
        }

        let data: Vec<Vec<f64>> = coordinates.iter().map(|(lat, lon)| vec![*lat, *lon]).collect();

        let hyper_params = HdbscanHyperParams::builder()
            .min_cluster_size(self.params.min_cluster_size)
            .min_samples(self.params.min_samples)
            .epsilon(self.epsilon_m())
            .dist_metric(DistanceMetric::Haversine)
            .build();

        let clusterer = Hdbscan::new(&data, hyper_params);
        let labels = clusterer
            .cluster()
            .map_err(|e| SitePoiError::Clustering(format!("{:?}", e)))?;

        if labels.len() != coordinates.len() {
            return Err(SitePoiError::Clustering(format!(
                "expected {} labels, got {}",
                coordinates.len(),
                labels.len()
            )));
        }

        Ok(labels.into_iter().map(ClusterLabel::from).collect())
    }

    fn name(&self) -> &str {
        "hdbscan-haversine"
    }
}

/// Label every site and return them in input order
pub fn assign_clusters(sites: Vec<Site>, clusterer: &dyn SiteClusterer) -> Result<Vec<Site>> {
    let coordinates: Vec<(f64, f64)> = sites.iter().map(|s| (s.lat, s.lon)).collect();
    let labels = clusterer.cluster(&coordinates)?;

    let labelled: Vec<Site> =
        sites.into_iter().zip(labels).map(|(site, label)| site.with_cluster(label)).collect();

    let noise = labelled.iter().filter(|s| s.is_noise()).count();
    let clusters = labelled
        .iter()
        .filter_map(|s| s.cluster_id.and_then(|label| label.cluster_id()))
        .collect::<std::collections::BTreeSet<_>>()
        .len();

    info!(
        clusterer = clusterer.name(),
        sites = labelled.len(),
        clusters,
        noise,
        "Clustering complete"
    );

    Ok(labelled)
}
