//! Sitepoi Core - Domain models, configuration and ports
//!
//! This crate contains the shared domain types for the site enrichment pipeline
//! together with the layered configuration and the port through which POIs are
//! fetched from an external source.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod validation;

pub use config::PipelineConfig;
pub use error::{QueryFailureKind, Result, SitePoiError};
