use serde::{Deserialize, Serialize};

use super::poi::{GeometryType, PoiCategory, PoiKey};

/// A site/POI pair within the proximity cutoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityEdge {
    pub site_id: String,
    pub poi_id: i64,
    pub geometry_type: GeometryType,
    pub category: PoiCategory,
    pub distance_m: f64,
}

impl ProximityEdge {
    pub fn poi_key(&self) -> PoiKey {
        PoiKey { geometry_type: self.geometry_type, poi_id: self.poi_id }
    }
}
