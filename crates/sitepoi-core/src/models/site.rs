use serde::{Deserialize, Serialize};

use super::cluster::ClusterLabel;

/// One row of the input site file as it arrives on disk
///
/// `geo_coordinates` holds a two-element textual list `"[lon, lat]"`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSiteRow {
    pub id: String,

    #[serde(rename = "geoCoordinates")]
    pub geo_coordinates: String,

    #[serde(default)]
    pub locality: Option<String>,

    #[serde(default, rename = "postalCode")]
    pub postal_code: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default, rename = "operatorId")]
    pub operator_id: Option<String>,

    #[serde(default, rename = "operatorName")]
    pub operator_name: Option<String>,
}

/// Cleaned site with parsed coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: String,

    pub lat: f64,

    pub lon: f64,

    pub locality: Option<String>,

    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,

    pub state: Option<String>,

    #[serde(rename = "operatorId")]
    pub operator_id: Option<String>,

    #[serde(rename = "operatorName")]
    pub operator_name: Option<String>,

    /// Assigned by the clusterer; `None` until clustering has run
    pub cluster_id: Option<ClusterLabel>,
}

impl Site {
    /// Build an unclustered site from a raw row and its parsed coordinates
    pub fn from_raw(row: RawSiteRow, lat: f64, lon: f64) -> Self {
        Self {
            site_id: row.id,
            lat,
            lon,
            locality: row.locality,
            postal_code: row.postal_code,
            state: row.state,
            operator_id: row.operator_id,
            operator_name: row.operator_name,
            cluster_id: None,
        }
    }

    /// Return a copy of this site carrying the given cluster label
    pub fn with_cluster(mut self, label: ClusterLabel) -> Self {
        self.cluster_id = Some(label);
        self
    }

    pub fn is_noise(&self) -> bool {
        matches!(self.cluster_id, Some(ClusterLabel::Noise))
    }
}
