use sitepoi_core::models::{ClusterBoundingBox, ClusterLabel, Site};
use std::collections::BTreeMap;

/// Derive one padded bounding box per non-noise cluster
///
/// Noise sites and sites without a label are skipped. Boxes are returned in
/// ascending cluster id order.
pub fn extract_cluster_bounding_boxes(sites: &[Site], padding_deg: f64) -> Vec<ClusterBoundingBox> {
    let mut boxes: BTreeMap<u32, ClusterBoundingBox> = BTreeMap::new();

    for site in sites {
        let cluster_id = match site.cluster_id {
            Some(ClusterLabel::Cluster(id)) => id,
            _ => continue,
        };

        boxes
            .entry(cluster_id)
            .and_modify(|bbox| {
                bbox.min_lat = bbox.min_lat.min(site.lat);
                bbox.max_lat = bbox.max_lat.max(site.lat);
                bbox.min_lon = bbox.min_lon.min(site.lon);
                bbox.max_lon = bbox.max_lon.max(site.lon);
            })
            .or_insert(ClusterBoundingBox {
                cluster_id,
                min_lat: site.lat,
                max_lat: site.lat,
                min_lon: site.lon,
                max_lon: site.lon,
            });
    }

    boxes
        .into_values()
        .map(|bbox| ClusterBoundingBox {
            min_lat: bbox.min_lat - padding_deg,
            max_lat: bbox.max_lat + padding_deg,
            min_lon: bbox.min_lon - padding_deg,
            max_lon: bbox.max_lon + padding_deg,
            ..bbox
        })
        .collect()
}
