//! Sitepoi Geo - Great-circle math, clustering and proximity joins
//!
//! This crate holds the CPU-bound spatial stages of the pipeline: haversine
//! distance, coordinate validation, density-based clustering of sites,
//! cluster bounding boxes and the site/POI proximity join.

pub mod bbox;
pub mod cluster;
pub mod distance;
pub mod proximity;

pub use bbox::extract_cluster_bounding_boxes;
pub use cluster::{assign_clusters, HdbscanClusterer, SiteClusterer};
pub use distance::{haversine_distance, haversine_m, to_radians, EARTH_RADIUS_M};
pub use proximity::{compute_proximity_edges, within_cutoff};
pub use sitepoi_core::validation::{validate_latitude, validate_longitude};
