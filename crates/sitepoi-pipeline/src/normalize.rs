//! Raw POI normalization: categorize, deduplicate, resolve and validate

use sitepoi_core::models::{GeometryType, PoiCategory, PoiKey, PoiRecord, RawPoi};
use sitepoi_geo::{validate_latitude, validate_longitude};
use std::collections::{BTreeMap, HashSet};
use tracing::{error, info};

/// Output of the normalization stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPois {
    /// Unique records in first-seen order
    pub records: Vec<PoiRecord>,
    /// Elements dropped because their key was already seen
    pub duplicates: usize,
    /// Elements with no recognised category or geometry type
    pub discarded: usize,
    /// Coordinates set to `None` after failing range validation
    pub nulled_coordinates: usize,
}

impl NormalizedPois {
    /// Records split by category, every category present
    pub fn by_category(&self) -> BTreeMap<PoiCategory, Vec<PoiRecord>> {
        let mut grouped: BTreeMap<PoiCategory, Vec<PoiRecord>> =
            PoiCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for record in &self.records {
            grouped.entry(record.category).or_default().push(record.clone());
        }
        grouped
    }
}

/// Normalize raw elements from every query batch
///
/// Batches are consumed in the order given; when two elements share a
/// `(geometry_type, poi_id)` key the first one wins. Way coordinates fall back
/// to the reported centroid. Out-of-range coordinates are nulled, not dropped.
pub fn normalize_pois<'a, I>(batches: I) -> NormalizedPois
where
    I: IntoIterator<Item = &'a [RawPoi]>,
{
    let mut seen: HashSet<PoiKey> = HashSet::new();
    let mut outcome = NormalizedPois::default();

    for raw in batches.into_iter().flatten() {
        let (geometry_type, category) =
            match (GeometryType::parse(&raw.element_type), PoiCategory::classify(&raw.tags)) {
                (Some(geometry_type), Some(category)) => (geometry_type, category),
                _ => {
                    outcome.discarded += 1;
                    continue;
                }
            };

        let key = PoiKey { geometry_type, poi_id: raw.id };
        if !seen.insert(key) {
            outcome.duplicates += 1;
            continue;
        }

        let lat = raw.lat.or(raw.center.map(|c| c.lat));
        let lon = raw.lon.or(raw.center.map(|c| c.lon));

        let lat = lat.and_then(|value| match validate_latitude(value) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(poi_id = raw.id, geometry_type = geometry_type.as_str(), error = %e, "Nulling POI latitude");
                outcome.nulled_coordinates += 1;
                None
            }
        });
        let lon = lon.and_then(|value| match validate_longitude(value) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(poi_id = raw.id, geometry_type = geometry_type.as_str(), error = %e, "Nulling POI longitude");
                outcome.nulled_coordinates += 1;
                None
            }
        });

        outcome.records.push(PoiRecord {
            poi_id: raw.id,
            geometry_type,
            lat,
            lon,
            category,
            tags: raw.tags.clone(),
        });
    }

    info!(
        pois = outcome.records.len(),
        duplicates = outcome.duplicates,
        discarded = outcome.discarded,
        nulled = outcome.nulled_coordinates,
        "Normalized POIs"
    );

    outcome
}
