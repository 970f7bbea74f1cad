//! Per-POI tag features and per-site aggregation

use regex::Regex;
use sitepoi_core::models::{PoiCategory, PoiFeatures, PoiKey, PoiRecord, ProximityEdge, Site, SiteFeatureRow};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::info;

/// `opening_hours` forms that mean "always open", matched on the lowercased value
static ALWAYS_OPEN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\bmo-su\b.*00:00[-–]24:00", r"\bmo-su\b.*24:00", r"\b00:00[-–]24:00\b"]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

static WIFI_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)yes|wlan").ok());

fn is_yes(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"))
}

fn is_open_24_7(opening_hours: Option<&str>) -> bool {
    let Some(value) = opening_hours else {
        return false;
    };
    let value = value.trim().to_lowercase();
    value.contains("24/7") || ALWAYS_OPEN_PATTERNS.iter().any(|re| re.is_match(&value))
}

fn has_wifi(internet_access: Option<&str>, wifi: Option<&str>) -> bool {
    let internet = match (internet_access, WIFI_PATTERN.as_ref()) {
        (Some(value), Some(re)) => re.is_match(value),
        _ => false,
    };
    internet || is_yes(wifi)
}

/// Derive amenity flags from a single POI's tags
pub fn extract_poi_features(record: &PoiRecord) -> PoiFeatures {
    PoiFeatures {
        key: record.key(),
        category: record.category,
        has_toilet: is_yes(record.tag("toilets")),
        has_wifi: has_wifi(record.tag("internet_access"), record.tag("wifi")),
        has_seating: is_yes(record.tag("indoor_seating")) || is_yes(record.tag("outdoor_seating")),
        open_24hr: is_open_24_7(record.tag("opening_hours")),
        brand: record.tag("brand").map(str::trim).filter(|b| !b.is_empty()).map(str::to_string),
    }
}

/// Build one feature row per site from the proximity edges
///
/// Counts are zero when nothing is in range. Amenity flags are `Some(true)`
/// when any in-range POI has the amenity, `Some(false)` when none does, and
/// `None` when no POI is in range. `brand` comes from the nearest POI that has
/// one, nearest meaning ordered by `(distance_m, poi_id)`.
pub fn aggregate_features(sites: &[Site], edges: &[ProximityEdge], pois: &[PoiRecord]) -> Vec<SiteFeatureRow> {
    let features: HashMap<PoiKey, PoiFeatures> =
        pois.iter().map(|poi| (poi.key(), extract_poi_features(poi))).collect();

    let mut by_site: BTreeMap<&str, Vec<&ProximityEdge>> = BTreeMap::new();
    for edge in edges {
        by_site.entry(edge.site_id.as_str()).or_default().push(edge);
    }
    for site_edges in by_site.values_mut() {
        site_edges.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m).then(a.poi_id.cmp(&b.poi_id)));
    }

    let rows: Vec<SiteFeatureRow> = sites
        .iter()
        .map(|site| {
            let site_edges = by_site.get(site.site_id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            build_row(site, site_edges, &features)
        })
        .collect();

    let with_pois = rows.iter().filter(|r| r.total_num_pois > 0).count();
    info!(sites = rows.len(), with_pois, "Aggregated site features");

    rows
}

fn build_row(site: &Site, edges: &[&ProximityEdge], features: &HashMap<PoiKey, PoiFeatures>) -> SiteFeatureRow {
    let mut row = SiteFeatureRow::empty(site);
    if edges.is_empty() {
        return row;
    }

    row.total_num_pois = edges.len();
    for edge in edges {
        match edge.category {
            PoiCategory::FastFood => row.num_fast_food += 1,
            PoiCategory::Fuel => row.num_fuel_stations += 1,
            PoiCategory::Supermarket => row.num_supermarkets += 1,
        }
    }
    row.closest_category = edges.first().map(|edge| edge.category);

    let in_range: Vec<&PoiFeatures> = edges.iter().filter_map(|edge| features.get(&edge.poi_key())).collect();
    row.has_toilet = Some(in_range.iter().any(|f| f.has_toilet));
    row.has_wifi = Some(in_range.iter().any(|f| f.has_wifi));
    row.has_seating = Some(in_range.iter().any(|f| f.has_seating));
    row.open_24hr = Some(in_range.iter().any(|f| f.open_24hr));
    row.brand = in_range.iter().find_map(|f| f.brand.clone());

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitepoi_core::models::GeometryType;

    fn record(id: i64, category: PoiCategory, tags: &[(&str, &str)]) -> PoiRecord {
        PoiRecord {
            poi_id: id,
            geometry_type: GeometryType::Node,
            lat: Some(50.0),
            lon: Some(10.0),
            category,
            tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    fn edge(site: &str, id: i64, category: PoiCategory, distance_m: f64) -> ProximityEdge {
        ProximityEdge {
            site_id: site.to_string(),
            poi_id: id,
            geometry_type: GeometryType::Node,
            category,
            distance_m,
        }
    }

    fn site(id: &str) -> Site {
        Site {
            site_id: id.to_string(),
            lat: 50.0,
            lon: 10.0,
            locality: None,
            postal_code: None,
            state: None,
            operator_id: None,
            operator_name: None,
            cluster_id: None,
        }
    }

    #[test]
    fn test_opening_hours_variants() {
        assert!(is_open_24_7(Some("24/7")));
        assert!(is_open_24_7(Some(" Mo-Su 00:00-24:00 ")));
        assert!(is_open_24_7(Some("Mo-Su 06:00-24:00")));
        assert!(is_open_24_7(Some("00:00–24:00")));
        assert!(!is_open_24_7(Some("Mo-Fr 06:00-22:00")));
        assert!(!is_open_24_7(Some("Mo-Sa 00:00-23:00")));
        assert!(!is_open_24_7(None));
    }

    #[test]
    fn test_wifi_variants() {
        assert!(has_wifi(Some("wlan"), None));
        assert!(has_wifi(Some("YES"), None));
        assert!(has_wifi(None, Some("Yes")));
        assert!(!has_wifi(Some("no"), Some("no")));
        assert!(!has_wifi(None, None));
    }

    #[test]
    fn test_extract_poi_features() {
        let poi = record(
            1,
            PoiCategory::FastFood,
            &[
                ("toilets", "yes"),
                ("outdoor_seating", "yes"),
                ("opening_hours", "24/7"),
                ("brand", "Burger King"),
            ],
        );

        let features = extract_poi_features(&poi);
        assert!(features.has_toilet);
        assert!(features.has_seating);
        assert!(features.open_24hr);
        assert!(!features.has_wifi);
        assert_eq!(features.brand.as_deref(), Some("Burger King"));
    }

    #[test]
    fn test_site_without_pois_gets_zero_row() {
        let rows = aggregate_features(&[site("A")], &[], &[]);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.total_num_pois, 0);
        assert_eq!(row.num_fast_food, 0);
        assert_eq!(row.closest_category, None);
        assert_eq!(row.has_toilet, None);
        assert_eq!(row.brand, None);
    }

    #[test]
    fn test_counts_closest_and_amenity_reduction() {
        let pois = vec![
            record(10, PoiCategory::Fuel, &[("toilets", "no")]),
            record(11, PoiCategory::FastFood, &[("wifi", "yes"), ("brand", "Subway")]),
            record(12, PoiCategory::Supermarket, &[("toilets", "yes"), ("brand", "Rewe")]),
        ];
        let edges = vec![
            edge("A", 12, PoiCategory::Supermarket, 80.0),
            edge("A", 10, PoiCategory::Fuel, 20.0),
            edge("A", 11, PoiCategory::FastFood, 40.0),
        ];

        let rows = aggregate_features(&[site("A")], &edges, &pois);
        let row = &rows[0];
        assert_eq!(row.total_num_pois, 3);
        assert_eq!(row.num_fuel_stations, 1);
        assert_eq!(row.num_fast_food, 1);
        assert_eq!(row.num_supermarkets, 1);
        assert_eq!(row.closest_category, Some(PoiCategory::Fuel));
        assert_eq!(row.has_toilet, Some(true));
        assert_eq!(row.has_wifi, Some(true));
        assert_eq!(row.has_seating, Some(false));
        assert_eq!(row.open_24hr, Some(false));
        // Fuel station is nearest but unbranded
        assert_eq!(row.brand.as_deref(), Some("Subway"));
    }

    #[test]
    fn test_distance_ties_break_on_poi_id() {
        let pois = vec![record(7, PoiCategory::Supermarket, &[]), record(3, PoiCategory::Fuel, &[])];
        let edges = vec![
            edge("A", 7, PoiCategory::Supermarket, 30.0),
            edge("A", 3, PoiCategory::Fuel, 30.0),
        ];

        let rows = aggregate_features(&[site("A")], &edges, &pois);
        assert_eq!(rows[0].closest_category, Some(PoiCategory::Fuel));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let pois = vec![record(1, PoiCategory::FastFood, &[("opening_hours", "24/7")])];
        let edges = vec![edge("A", 1, PoiCategory::FastFood, 10.0)];
        let sites = vec![site("A"), site("B")];

        let first = aggregate_features(&sites, &edges, &pois);
        let second = aggregate_features(&sites, &edges, &pois);
        assert_eq!(first, second);
        assert_eq!(first[0].open_24hr, Some(true));
        assert_eq!(first[1].total_num_pois, 0);
    }
}
