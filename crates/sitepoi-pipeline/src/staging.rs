//! Staging directory layout and file I/O
//!
//! ```text
//! staging_dir/
//!   raw/cluster_pois/cluster_{id}.json
//!   raw/site_pois/site_{id}.json
//!   fast_food_pois.json, fuel_pois.json, supermarket_pois.json
//!   site_data.csv
//!   site_pois_proximities.csv
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use sitepoi_core::error::{Result, SitePoiError};
use sitepoi_core::models::{PoiCategory, PoiRecord, ProximityEdge, QueryTarget, RawPoi, Site, SiteFeatureRow};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const OUTPUT_FILE_NAME: &str = "enriched_site_data.csv";

const SITES_FILE_NAME: &str = "site_data.csv";
const EDGES_FILE_NAME: &str = "site_pois_proximities.csv";

/// Paths inside one staging directory
#[derive(Debug, Clone)]
pub struct StagingLayout {
    root: PathBuf,
}

impl StagingLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Raw dump for one query target
    pub fn raw_path(&self, target: &QueryTarget) -> PathBuf {
        match target {
            QueryTarget::Cluster(id) => self.root.join("raw").join("cluster_pois").join(format!("cluster_{}.json", id)),
            QueryTarget::Site(id) => {
                self.root.join("raw").join("site_pois").join(format!("site_{}.json", file_safe(id)))
            }
        }
    }

    pub fn category_path(&self, category: PoiCategory) -> PathBuf {
        self.root.join(format!("{}_pois.json", category.as_str()))
    }

    pub fn sites_path(&self) -> PathBuf {
        self.root.join(SITES_FILE_NAME)
    }

    pub fn edges_path(&self) -> PathBuf {
        self.root.join(EDGES_FILE_NAME)
    }

    pub fn write_raw(&self, target: &QueryTarget, elements: &[RawPoi]) -> Result<PathBuf> {
        let path = self.raw_path(target);
        write_json(&path, &elements)?;
        Ok(path)
    }

    pub fn write_category_pois(&self, grouped: &BTreeMap<PoiCategory, Vec<PoiRecord>>) -> Result<()> {
        for category in PoiCategory::ALL {
            let records = grouped.get(&category).map(Vec::as_slice).unwrap_or(&[]);
            write_json(&self.category_path(category), &records)?;
        }
        Ok(())
    }

    /// Every category file concatenated in category order
    pub fn read_pois(&self) -> Result<Vec<PoiRecord>> {
        let mut records = Vec::new();
        for category in PoiCategory::ALL {
            let mut batch: Vec<PoiRecord> = read_json(&self.category_path(category))?;
            records.append(&mut batch);
        }
        Ok(records)
    }

    pub fn write_sites(&self, sites: &[Site]) -> Result<()> {
        write_csv(&self.sites_path(), sites)
    }

    pub fn read_sites(&self) -> Result<Vec<Site>> {
        read_csv(&self.sites_path())
    }

    pub fn write_edges(&self, edges: &[ProximityEdge]) -> Result<()> {
        write_csv(&self.edges_path(), edges)
    }

    pub fn read_edges(&self) -> Result<Vec<ProximityEdge>> {
        read_csv(&self.edges_path())
    }
}

/// Write the final enriched table and return its path
pub fn write_output(output_dir: &Path, rows: &[SiteFeatureRow]) -> Result<PathBuf> {
    let path = output_dir.join(OUTPUT_FILE_NAME);
    write_csv(&path, rows)?;
    Ok(path)
}

pub fn read_output(path: &Path) -> Result<Vec<SiteFeatureRow>> {
    read_csv(path)
}

/// Percent-encode every byte outside `[A-Za-z0-9._-]`
///
/// `%` is itself escaped, so distinct ids always map to distinct names.
fn file_safe(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "Wrote staging file");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(SitePoiError::StagingMissing { path: path.to_path_buf() });
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| SitePoiError::Csv(e.to_string()))?;
    for row in rows {
        writer.serialize(row).map_err(|e| SitePoiError::Csv(e.to_string()))?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote staging file");
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(SitePoiError::StagingMissing { path: path.to_path_buf() });
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| SitePoiError::Csv(e.to_string()))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| SitePoiError::Csv(e.to_string())))
        .collect()
}
