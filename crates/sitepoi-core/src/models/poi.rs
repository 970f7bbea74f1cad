use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// POI element exactly as returned by the external source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoi {
    #[serde(rename = "type")]
    pub element_type: String,

    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,

    /// Centroid reported for polygon geometries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<PoiCenter>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl RawPoi {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoiCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Geometry kind of a POI element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    Node,
    Way,
}

impl GeometryType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "node" => Some(GeometryType::Node),
            "way" => Some(GeometryType::Way),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Node => "node",
            GeometryType::Way => "way",
        }
    }
}

/// POI class the pipeline keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    FastFood,
    Fuel,
    Supermarket,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 3] =
        [PoiCategory::FastFood, PoiCategory::Fuel, PoiCategory::Supermarket];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoiCategory::FastFood => "fast_food",
            PoiCategory::Fuel => "fuel",
            PoiCategory::Supermarket => "supermarket",
        }
    }

    /// Classify a tag set; amenity takes precedence over shop
    pub fn classify(tags: &BTreeMap<String, String>) -> Option<Self> {
        match tags.get("amenity").map(String::as_str) {
            Some("fast_food") => return Some(PoiCategory::FastFood),
            Some("fuel") => return Some(PoiCategory::Fuel),
            _ => {}
        }
        match tags.get("shop").map(String::as_str) {
            Some("supermarket") => Some(PoiCategory::Supermarket),
            _ => None,
        }
    }
}

impl std::fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural key of a POI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoiKey {
    pub geometry_type: GeometryType,
    pub poi_id: i64,
}

/// Normalized, categorized POI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub poi_id: i64,
    pub geometry_type: GeometryType,
    /// Absent when missing upstream or outside [-90, 90]
    pub lat: Option<f64>,
    /// Absent when missing upstream or outside [-180, 180]
    pub lon: Option<f64>,
    pub category: PoiCategory,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl PoiRecord {
    pub fn key(&self) -> PoiKey {
        PoiKey { geometry_type: self.geometry_type, poi_id: self.poi_id }
    }

    /// Both coordinates, when both survived validation
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_classify_categories() {
        assert_eq!(
            PoiCategory::classify(&tags(&[("amenity", "fast_food")])),
            Some(PoiCategory::FastFood)
        );
        assert_eq!(PoiCategory::classify(&tags(&[("amenity", "fuel")])), Some(PoiCategory::Fuel));
        assert_eq!(
            PoiCategory::classify(&tags(&[("shop", "supermarket")])),
            Some(PoiCategory::Supermarket)
        );
    }

    #[test]
    fn test_classify_discards_other_tags() {
        assert_eq!(PoiCategory::classify(&tags(&[("shop", "convenience")])), None);
        assert_eq!(PoiCategory::classify(&tags(&[("amenity", "cafe")])), None);
        assert_eq!(PoiCategory::classify(&BTreeMap::new()), None);
    }

    #[test]
    fn test_fuel_station_with_shop_is_fuel() {
        let mixed = tags(&[("amenity", "fuel"), ("shop", "supermarket")]);
        assert_eq!(PoiCategory::classify(&mixed), Some(PoiCategory::Fuel));
    }

    #[test]
    fn test_raw_poi_decodes_way_center() {
        let json = r#"{"type":"way","id":42,"center":{"lat":50.1,"lon":10.2},"tags":{"amenity":"fuel"}}"#;
        let raw: RawPoi = serde_json::from_str(json).unwrap();
        assert_eq!(raw.element_type, "way");
        assert_eq!(raw.lat, None);
        assert_eq!(raw.center, Some(PoiCenter { lat: 50.1, lon: 10.2 }));
        assert_eq!(raw.tag("amenity"), Some("fuel"));
    }
}
