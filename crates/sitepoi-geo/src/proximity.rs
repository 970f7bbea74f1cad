use geo::Point;
use rayon::prelude::*;
use sitepoi_core::models::{PoiRecord, ProximityEdge, Site};
use tracing::debug;

use crate::distance::haversine_distance;

/// Whether a distance falls inside the inclusive cutoff
pub fn within_cutoff(distance_m: f64, cutoff_m: f64) -> bool {
    distance_m <= cutoff_m
}

/// Cross-join sites with POIs and keep pairs within `cutoff_m`
///
/// POIs without usable coordinates are skipped. The result is sorted by
/// site id, then distance, then POI id.
pub fn compute_proximity_edges(sites: &[Site], pois: &[PoiRecord], cutoff_m: f64) -> Vec<ProximityEdge> {
    let located: Vec<(&PoiRecord, Point)> = pois
        .iter()
        .filter_map(|poi| poi.coordinates().map(|(lat, lon)| (poi, Point::new(lon, lat))))
        .collect();

    if located.len() < pois.len() {
        debug!(skipped = pois.len() - located.len(), "Skipping POIs without coordinates");
    }

    let mut edges: Vec<ProximityEdge> = sites
        .par_iter()
        .flat_map_iter(|site| {
            let origin = Point::new(site.lon, site.lat);
            located.iter().filter_map(move |(poi, position)| {
                let distance_m = haversine_distance(origin, *position);
                within_cutoff(distance_m, cutoff_m).then(|| ProximityEdge {
                    site_id: site.site_id.clone(),
                    poi_id: poi.poi_id,
                    geometry_type: poi.geometry_type,
                    category: poi.category,
                    distance_m,
                })
            })
        })
        .collect();

    edges.sort_by(|a, b| {
        a.site_id
            .cmp(&b.site_id)
            .then(a.distance_m.total_cmp(&b.distance_m))
            .then(a.poi_id.cmp(&b.poi_id))
    });

    edges
}
