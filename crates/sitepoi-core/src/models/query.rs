use serde::{Deserialize, Serialize};

use super::cluster::ClusterBoundingBox;

/// Spatial scope of one external POI query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoiQuery {
    /// Everything inside a padded cluster box
    BoundingBox(ClusterBoundingBox),
    /// Everything within `radius_m` of a single site
    Around { lat: f64, lon: f64, radius_m: f64 },
}

/// What a query result is keyed by once merged
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryTarget {
    Cluster(u32),
    Site(String),
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTarget::Cluster(id) => write!(f, "cluster {}", id),
            QueryTarget::Site(id) => write!(f, "site {}", id),
        }
    }
}
