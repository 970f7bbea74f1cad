//! Overpass QL generation

use sitepoi_core::models::{ClusterBoundingBox, PoiQuery};

/// Tag selectors for every POI family the pipeline cares about
///
/// Convenience stores are fetched alongside supermarkets and dropped later
/// during categorization.
const SELECTORS: [&str; 3] = [
    r#"["shop"~"supermarket|convenience"]"#,
    r#"["amenity"="fast_food"]"#,
    r#"["amenity"="fuel"]"#,
];

/// Build the Overpass QL text for one query
///
/// Nodes and ways are requested for every selector, and `out center` makes
/// the service report a centroid for ways.
pub fn build_query(query: &PoiQuery, timeout_secs: u64) -> String {
    let filter = spatial_filter(query);

    let mut lines = Vec::with_capacity(SELECTORS.len() * 2);
    for selector in SELECTORS {
        for element_type in ["node", "way"] {
            lines.push(format!("  {}{}{};", element_type, selector, filter));
        }
    }

    format!("[out:json][timeout:{}];\n(\n{}\n);\nout center;", timeout_secs.max(1), lines.join("\n"))
}

fn spatial_filter(query: &PoiQuery) -> String {
    match query {
        PoiQuery::BoundingBox(bbox) => bbox_filter(bbox),
        PoiQuery::Around { lat, lon, radius_m } => format!("(around:{},{},{})", radius_m, lat, lon),
    }
}

/// Overpass orders bbox filters south, west, north, east
fn bbox_filter(bbox: &ClusterBoundingBox) -> String {
    format!("({},{},{},{})", bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon)
}

/// Short human-readable description used in logs and errors
pub fn describe(query: &PoiQuery) -> String {
    match query {
        PoiQuery::BoundingBox(bbox) => format!("cluster {} bbox", bbox.cluster_id),
        PoiQuery::Around { lat, lon, radius_m } => format!("{} m around ({}, {})", radius_m, lat, lon),
    }
}
