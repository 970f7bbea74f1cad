//! Site file loading and region filtering

use sitepoi_core::error::{Result, SitePoiError};
use sitepoi_core::models::{RawSiteRow, RegionBounds, Site};
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 2] = ["id", "geoCoordinates"];

/// Output of the cleaning stage
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSites {
    /// Sites inside the region, in input order
    pub sites: Vec<Site>,
    /// Rows dropped for falling outside the region
    pub outliers: usize,
}

/// Parse a `"[lon, lat]"` value into `(lat, lon)`
///
/// `row` is the 1-based data row, used only for error reporting.
pub fn parse_coordinates(raw: &str, row: usize) -> Result<(f64, f64)> {
    let [lon, lat]: [f64; 2] = serde_json::from_str(raw.trim()).map_err(|e| SitePoiError::Parse {
        row,
        reason: format!("cannot decode '{}' as [lon, lat]: {}", raw, e),
    })?;
    Ok((lat, lon))
}

/// Read raw rows from a site CSV file
pub fn read_site_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RawSiteRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SitePoiError::SiteFileNotFound { path: path.to_path_buf() });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| SitePoiError::Csv(e.to_string()))?;

    let headers = reader.headers().map_err(|e| SitePoiError::Csv(e.to_string()))?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(SitePoiError::MissingColumn { column: column.to_string() });
        }
    }

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<RawSiteRow>().enumerate() {
        let row = record.map_err(|e| SitePoiError::Parse { row: index + 1, reason: e.to_string() })?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "Read site file");
    Ok(rows)
}

/// Parse coordinates and keep sites inside the region
///
/// The first undecodable coordinate aborts the whole batch.
pub fn clean_sites(rows: Vec<RawSiteRow>, region: &RegionBounds) -> Result<CleanedSites> {
    let total = rows.len();
    let mut sites = Vec::with_capacity(total);
    let mut outliers = 0;

    for (index, row) in rows.into_iter().enumerate() {
        let (lat, lon) = parse_coordinates(&row.geo_coordinates, index + 1)?;

        if region.contains(lat, lon) {
            sites.push(Site::from_raw(row, lat, lon));
        } else {
            debug!(site_id = %row.id, lat, lon, "Site outside region");
            outliers += 1;
        }
    }

    info!(total, kept = sites.len(), outliers, "Removed sites outside the configured region");
    Ok(CleanedSites { sites, outliers })
}

/// Read and clean a site file in one step
pub fn load_sites<P: AsRef<Path>>(path: P, region: &RegionBounds) -> Result<CleanedSites> {
    clean_sites(read_site_rows(path)?, region)
}
