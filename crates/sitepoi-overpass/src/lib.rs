//! Sitepoi Overpass - HTTP adapter for the OpenStreetMap Overpass API
//!
//! Implements the `PoiSource` port: query text generation, request timeout,
//! HTTP status mapping and decoding of the `elements` array.

pub mod client;
pub mod dto;
pub mod query;

pub use client::OverpassClient;
pub use query::build_query;
