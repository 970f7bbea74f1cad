use serde::{Deserialize, Serialize};

/// Label assigned to a site by the spatial clusterer
///
/// Serialized as a plain integer where `-1` is noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ClusterLabel {
    /// Member of the dense cluster with the given id
    Cluster(u32),
    /// Not part of any sufficiently dense cluster
    Noise,
}

impl ClusterLabel {
    pub const NOISE_VALUE: i32 = -1;

    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }

    /// The cluster id, or `None` for noise
    pub fn cluster_id(&self) -> Option<u32> {
        match self {
            ClusterLabel::Cluster(id) => Some(*id),
            ClusterLabel::Noise => None,
        }
    }
}

impl From<i32> for ClusterLabel {
    fn from(value: i32) -> Self {
        if value < 0 {
            ClusterLabel::Noise
        } else {
            ClusterLabel::Cluster(value as u32)
        }
    }
}

impl From<ClusterLabel> for i32 {
    fn from(label: ClusterLabel) -> Self {
        match label {
            ClusterLabel::Cluster(id) => id as i32,
            ClusterLabel::Noise => ClusterLabel::NOISE_VALUE,
        }
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterLabel::Cluster(id) => write!(f, "{}", id),
            ClusterLabel::Noise => write!(f, "noise"),
        }
    }
}

/// Padded lat/lon rectangle covering every member site of one cluster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterBoundingBox {
    pub cluster_id: u32,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl ClusterBoundingBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Geographic rectangle that input sites must fall inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBounds {
    /// Approximate bounding rectangle of Germany
    pub fn germany() -> Self {
        Self { lat_min: 47.2, lat_max: 55.1, lon_min: 5.9, lon_max: 15.0 }
    }

    /// Inclusive containment check on both axes
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

impl Default for RegionBounds {
    fn default() -> Self {
        Self::germany()
    }
}
