//! Error types for the enrichment pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SitePoiError {
    // Input errors
    #[error("Failed to parse site row {row}: {reason}")]
    Parse { row: usize, reason: String },

    #[error("Site file is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Site file not found at {path}")]
    SiteFileNotFound { path: PathBuf },

    // Clustering errors
    #[error("Clustering failed: {0}")]
    Clustering(String),

    // External POI query errors
    #[error("POI query for {target} failed ({kind}): {reason}")]
    QueryFailure {
        target: String,
        kind: QueryFailureKind,
        reason: String,
    },

    // Data-quality errors
    #[error("Invalid {axis} value {value}: outside [{min}, {max}]")]
    InvalidCoordinate {
        axis: CoordinateAxis,
        value: f64,
        min: f64,
        max: f64,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Staging errors
    #[error("Staging file missing: {path}")]
    StagingMissing { path: PathBuf },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SitePoiError {
    /// Build a query failure for the given cluster or site target
    pub fn query_failure(
        target: impl Into<String>,
        kind: QueryFailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::QueryFailure { target: target.into(), kind, reason: reason.into() }
    }

    /// Whether a failed query is worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::QueryFailure { kind, .. } => kind.is_retryable(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SitePoiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Classification of a failed external POI query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFailureKind {
    /// The request exceeded the per-query timeout
    Timeout,
    /// The service answered HTTP 429
    RateLimited,
    /// Any other non-success HTTP status
    Status(u16),
    /// Connection or protocol failure before a status was received
    Transport,
    /// The response body could not be decoded
    Decode,
}

impl QueryFailureKind {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::RateLimited | Self::Transport => true,
            Self::Status(code) => *code >= 500,
            Self::Decode => false,
        }
    }
}

impl std::fmt::Display for QueryFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Status(code) => write!(f, "status {}", code),
            Self::Transport => write!(f, "transport"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

/// Which half of a coordinate failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateAxis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for CoordinateAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
        }
    }
}

pub type Result<T> = std::result::Result<T, SitePoiError>;
