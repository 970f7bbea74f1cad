use proptest::prelude::*;
use sitepoi_core::models::{GeometryType, PoiCategory, PoiRecord, Site};
use sitepoi_geo::{compute_proximity_edges, haversine_m, validate_latitude, validate_longitude};
use std::collections::BTreeMap;

fn site(lat: f64, lon: f64) -> Site {
    Site {
        site_id: "P".to_string(),
        lat,
        lon,
        locality: None,
        postal_code: None,
        state: None,
        operator_id: None,
        operator_name: None,
        cluster_id: None,
    }
}

proptest! {
    #[test]
    fn haversine_is_symmetric(
        lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
        lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
    ) {
        let forward = haversine_m(lat1, lon1, lat2, lon2);
        let backward = haversine_m(lat2, lon2, lat1, lon1);
        prop_assert!((forward - backward).abs() < 1e-6);
    }

    #[test]
    fn haversine_is_non_negative_and_bounded(
        lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
        lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
    ) {
        let distance = haversine_m(lat1, lon1, lat2, lon2);
        prop_assert!(distance >= 0.0);
        prop_assert!(distance <= sitepoi_geo::EARTH_RADIUS_M * std::f64::consts::PI + 1e-6);
    }

    #[test]
    fn haversine_of_identical_points_is_zero(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
        prop_assert_eq!(haversine_m(lat, lon, lat, lon), 0.0);
    }

    #[test]
    fn validated_coordinates_are_in_range(value in -500.0f64..500.0) {
        if let Ok(lat) = validate_latitude(value) {
            prop_assert!((-90.0..=90.0).contains(&lat));
        }
        if let Ok(lon) = validate_longitude(value) {
            prop_assert!((-180.0..=180.0).contains(&lon));
        }
    }

    #[test]
    fn every_edge_respects_cutoff(
        offsets in prop::collection::vec((-0.002f64..0.002, -0.002f64..0.002), 1..20),
        cutoff in 10.0f64..200.0,
    ) {
        let pois: Vec<PoiRecord> = offsets
            .iter()
            .enumerate()
            .map(|(i, (dlat, dlon))| PoiRecord {
                poi_id: i as i64,
                geometry_type: GeometryType::Node,
                lat: Some(50.0 + dlat),
                lon: Some(10.0 + dlon),
                category: PoiCategory::Fuel,
                tags: BTreeMap::new(),
            })
            .collect();

        let edges = compute_proximity_edges(&[site(50.0, 10.0)], &pois, cutoff);
        for edge in &edges {
            prop_assert!(edge.distance_m <= cutoff);
        }
        for pair in edges.windows(2) {
            prop_assert!(pair[0].distance_m <= pair[1].distance_m);
        }
    }
}
