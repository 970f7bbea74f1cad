use serde::{Deserialize, Serialize};

use super::poi::{PoiCategory, PoiKey};
use super::site::Site;

/// Amenity flags derived from a single POI's tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiFeatures {
    pub key: PoiKey,
    pub category: PoiCategory,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub has_seating: bool,
    pub open_24hr: bool,
    pub brand: Option<String>,
}

/// Final enriched output, one per cleaned site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteFeatureRow {
    pub site_id: String,

    pub locality: Option<String>,

    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,

    pub state: Option<String>,

    #[serde(rename = "operatorId")]
    pub operator_id: Option<String>,

    #[serde(rename = "operatorName")]
    pub operator_name: Option<String>,

    pub lon: f64,

    pub lat: f64,

    pub total_num_pois: usize,

    pub num_fast_food: usize,

    pub num_fuel_stations: usize,

    pub num_supermarkets: usize,

    pub closest_category: Option<PoiCategory>,

    /// `None` when no POI is in range
    pub has_toilet: Option<bool>,

    pub has_wifi: Option<bool>,

    pub has_seating: Option<bool>,

    pub open_24hr: Option<bool>,

    pub brand: Option<String>,
}

impl SiteFeatureRow {
    /// Row for a site with nothing in range
    pub fn empty(site: &Site) -> Self {
        Self {
            site_id: site.site_id.clone(),
            locality: site.locality.clone(),
            postal_code: site.postal_code.clone(),
            state: site.state.clone(),
            operator_id: site.operator_id.clone(),
            operator_name: site.operator_name.clone(),
            lon: site.lon,
            lat: site.lat,
            total_num_pois: 0,
            num_fast_food: 0,
            num_fuel_stations: 0,
            num_supermarkets: 0,
            closest_category: None,
            has_toilet: None,
            has_wifi: None,
            has_seating: None,
            open_24hr: None,
            brand: None,
        }
    }
}
