//! Wire types for Overpass JSON responses

use serde::Deserialize;
use sitepoi_core::models::RawPoi;

/// Top-level Overpass response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<RawPoi>,

    /// Set by the service when a query was cut short (e.g. runtime limits)
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nodes_and_ways() {
        let body = br#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 50.0, "lon": 10.0,
                 "tags": {"amenity": "fuel", "brand": "Aral"}},
                {"type": "way", "id": 2, "center": {"lat": 50.1, "lon": 10.1},
                 "nodes": [5, 6, 7],
                 "tags": {"shop": "supermarket"}}
            ]
        }"#;

        let response = OverpassResponse::parse(body).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert!(response.remark.is_none());

        let node = &response.elements[0];
        assert_eq!(node.element_type, "node");
        assert_eq!(node.lat, Some(50.0));
        assert_eq!(node.tag("brand"), Some("Aral"));

        let way = &response.elements[1];
        assert_eq!(way.element_type, "way");
        assert!(way.lat.is_none());
        assert_eq!(way.center.map(|c| c.lat), Some(50.1));
    }

    #[test]
    fn test_missing_elements_is_empty() {
        let response = OverpassResponse::parse(br#"{"remark": "runtime error: timeout"}"#).unwrap();
        assert!(response.elements.is_empty());
        assert_eq!(response.remark.as_deref(), Some("runtime error: timeout"));
    }

    #[test]
    fn test_element_without_tags() {
        let response =
            OverpassResponse::parse(br#"{"elements": [{"type": "node", "id": 9, "lat": 1.0, "lon": 2.0}]}"#)
                .unwrap();
        assert!(response.elements[0].tags.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(OverpassResponse::parse(b"<html>busy</html>").is_err());
    }
}
