use crate::error::{Result, SitePoiError};
use crate::models::RegionBounds;
use crate::validation::{validate_latitude, validate_longitude};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Earth's mean radius in kilometres, used to turn `eps_km` into an angle
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0088;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(label)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the enrichment pipeline
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub region: ConfigValue<RegionBounds>,
    pub eps_km: ConfigValue<f64>,
    pub min_cluster_size: ConfigValue<usize>,
    pub min_samples: ConfigValue<usize>,
    pub bbox_padding_deg: ConfigValue<f64>,
    pub query_radius_m: ConfigValue<f64>,
    pub proximity_cutoff_m: ConfigValue<f64>,
    pub overpass_url: ConfigValue<String>,
    pub query_timeout_secs: ConfigValue<u64>,
    pub max_concurrent_queries: ConfigValue<usize>,
    pub max_attempts: ConfigValue<u32>,
    pub initial_backoff_ms: ConfigValue<u64>,
    pub max_backoff_ms: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            region: ConfigValue::new(RegionBounds::germany(), ConfigSource::Default),
            eps_km: ConfigValue::new(0.1, ConfigSource::Default),
            min_cluster_size: ConfigValue::new(5, ConfigSource::Default),
            min_samples: ConfigValue::new(4, ConfigSource::Default),
            bbox_padding_deg: ConfigValue::new(0.003, ConfigSource::Default),
            query_radius_m: ConfigValue::new(100.0, ConfigSource::Default),
            proximity_cutoff_m: ConfigValue::new(100.0, ConfigSource::Default),
            overpass_url: ConfigValue::new(
                "https://overpass-api.de/api/interpreter".to_string(),
                ConfigSource::Default,
            ),
            query_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            max_concurrent_queries: ConfigValue::new(4, ConfigSource::Default),
            max_attempts: ConfigValue::new(3, ConfigSource::Default),
            initial_backoff_ms: ConfigValue::new(500, ConfigSource::Default),
            max_backoff_ms: ConfigValue::new(5_000, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| SitePoiError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| SitePoiError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(region) = file_config.region {
            self.region.update(region, ConfigSource::File);
        }
        if let Some(eps_km) = file_config.eps_km {
            self.eps_km.update(eps_km, ConfigSource::File);
        }
        if let Some(min_cluster_size) = file_config.min_cluster_size {
            self.min_cluster_size.update(min_cluster_size, ConfigSource::File);
        }
        if let Some(min_samples) = file_config.min_samples {
            self.min_samples.update(min_samples, ConfigSource::File);
        }
        if let Some(padding) = file_config.bbox_padding_deg {
            self.bbox_padding_deg.update(padding, ConfigSource::File);
        }
        if let Some(radius) = file_config.query_radius_m {
            self.query_radius_m.update(radius, ConfigSource::File);
        }
        if let Some(cutoff) = file_config.proximity_cutoff_m {
            self.proximity_cutoff_m.update(cutoff, ConfigSource::File);
        }
        if let Some(url) = file_config.overpass_url {
            self.overpass_url.update(url, ConfigSource::File);
        }
        if let Some(timeout) = file_config.query_timeout_secs {
            self.query_timeout_secs.update(timeout, ConfigSource::File);
        }
        if let Some(concurrency) = file_config.max_concurrent_queries {
            self.max_concurrent_queries.update(concurrency, ConfigSource::File);
        }
        if let Some(attempts) = file_config.max_attempts {
            self.max_attempts.update(attempts, ConfigSource::File);
        }
        if let Some(backoff) = file_config.initial_backoff_ms {
            self.initial_backoff_ms.update(backoff, ConfigSource::File);
        }
        if let Some(backoff) = file_config.max_backoff_ms {
            self.max_backoff_ms.update(backoff, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from `SITEPOI_*` environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(eps_km) = env_value::<f64>("SITEPOI_EPS_KM") {
            self.eps_km.update(eps_km, ConfigSource::Environment);
        }
        if let Some(size) = env_value::<usize>("SITEPOI_MIN_CLUSTER_SIZE") {
            self.min_cluster_size.update(size, ConfigSource::Environment);
        }
        if let Some(samples) = env_value::<usize>("SITEPOI_MIN_SAMPLES") {
            self.min_samples.update(samples, ConfigSource::Environment);
        }
        if let Some(radius) = env_value::<f64>("SITEPOI_QUERY_RADIUS_M") {
            self.query_radius_m.update(radius, ConfigSource::Environment);
        }
        if let Ok(url) = env::var("SITEPOI_OVERPASS_URL") {
            self.overpass_url.update(url, ConfigSource::Environment);
        }
        if let Some(timeout) = env_value::<u64>("SITEPOI_QUERY_TIMEOUT_SECS") {
            self.query_timeout_secs.update(timeout, ConfigSource::Environment);
        }
        if let Some(concurrency) = env_value::<usize>("SITEPOI_MAX_CONCURRENT_QUERIES") {
            self.max_concurrent_queries.update(concurrency, ConfigSource::Environment);
        }
        if let Some(attempts) = env_value::<u32>("SITEPOI_MAX_ATTEMPTS") {
            self.max_attempts.update(attempts, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(eps_km) = overrides.eps_km {
            self.eps_km.update(eps_km, ConfigSource::Cli);
        }
        if let Some(size) = overrides.min_cluster_size {
            self.min_cluster_size.update(size, ConfigSource::Cli);
        }
        if let Some(samples) = overrides.min_samples {
            self.min_samples.update(samples, ConfigSource::Cli);
        }
        if let Some(url) = overrides.overpass_url {
            self.overpass_url.update(url, ConfigSource::Cli);
        }
        if let Some(concurrency) = overrides.max_concurrent_queries {
            self.max_concurrent_queries.update(concurrency, ConfigSource::Cli);
        }
    }

    /// Validate the layered values and freeze them into a `PipelineConfig`
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        let region = self.region.value;
        for lat in [region.lat_min, region.lat_max] {
            validate_latitude(lat).map_err(|e| invalid("region", &e.to_string()))?;
        }
        for lon in [region.lon_min, region.lon_max] {
            validate_longitude(lon).map_err(|e| invalid("region", &e.to_string()))?;
        }
        if !(region.lat_min < region.lat_max && region.lon_min < region.lon_max) {
            return Err(invalid("region", "min bounds must be below max bounds"));
        }
        if !(self.eps_km.value.is_finite() && self.eps_km.value > 0.0) {
            return Err(invalid("eps_km", "must be a positive number"));
        }
        if self.min_cluster_size.value < 2 {
            return Err(invalid("min_cluster_size", "must be at least 2"));
        }
        if self.min_samples.value < 1 {
            return Err(invalid("min_samples", "must be at least 1"));
        }
        if !(self.bbox_padding_deg.value >= 0.0) {
            return Err(invalid("bbox_padding_deg", "must not be negative"));
        }
        if !(self.query_radius_m.value > 0.0) {
            return Err(invalid("query_radius_m", "must be positive"));
        }
        if !(self.proximity_cutoff_m.value > 0.0) {
            return Err(invalid("proximity_cutoff_m", "must be positive"));
        }
        if self.overpass_url.value.trim().is_empty() {
            return Err(SitePoiError::ConfigMissing { key: "overpass_url".to_string() });
        }
        if self.max_concurrent_queries.value == 0 {
            return Err(invalid("max_concurrent_queries", "must be at least 1"));
        }
        if self.max_attempts.value == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }

        Ok(PipelineConfig {
            region,
            clustering: ClusteringParams {
                eps_km: self.eps_km.value,
                min_cluster_size: self.min_cluster_size.value,
                min_samples: self.min_samples.value,
            },
            bbox_padding_deg: self.bbox_padding_deg.value,
            query_radius_m: self.query_radius_m.value,
            proximity_cutoff_m: self.proximity_cutoff_m.value,
            source: SourceSettings {
                endpoint: self.overpass_url.value.clone(),
                timeout: Duration::from_secs(self.query_timeout_secs.value.max(1)),
            },
            fetch: FetchSettings {
                max_concurrent_queries: self.max_concurrent_queries.value,
                retry: RetryPolicy {
                    max_attempts: self.max_attempts.value,
                    initial_backoff: Duration::from_millis(self.initial_backoff_ms.value),
                    max_backoff: Duration::from_millis(self.max_backoff_ms.value),
                },
            },
        })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();
        let region = self.region.value;

        map.insert(
            "region".to_string(),
            (
                format!(
                    "lat [{}, {}], lon [{}, {}]",
                    region.lat_min, region.lat_max, region.lon_min, region.lon_max
                ),
                self.region.source,
            ),
        );
        map.insert("eps_km".to_string(), (self.eps_km.value.to_string(), self.eps_km.source));
        map.insert(
            "min_cluster_size".to_string(),
            (self.min_cluster_size.value.to_string(), self.min_cluster_size.source),
        );
        map.insert(
            "min_samples".to_string(),
            (self.min_samples.value.to_string(), self.min_samples.source),
        );
        map.insert(
            "bbox_padding_deg".to_string(),
            (self.bbox_padding_deg.value.to_string(), self.bbox_padding_deg.source),
        );
        map.insert(
            "query_radius_m".to_string(),
            (self.query_radius_m.value.to_string(), self.query_radius_m.source),
        );
        map.insert(
            "proximity_cutoff_m".to_string(),
            (self.proximity_cutoff_m.value.to_string(), self.proximity_cutoff_m.source),
        );
        map.insert(
            "overpass_url".to_string(),
            (self.overpass_url.value.clone(), self.overpass_url.source),
        );
        map.insert(
            "query_timeout_secs".to_string(),
            (self.query_timeout_secs.value.to_string(), self.query_timeout_secs.source),
        );
        map.insert(
            "max_concurrent_queries".to_string(),
            (self.max_concurrent_queries.value.to_string(), self.max_concurrent_queries.source),
        );
        map.insert(
            "max_attempts".to_string(),
            (self.max_attempts.value.to_string(), self.max_attempts.source),
        );
        map.insert(
            "initial_backoff_ms".to_string(),
            (self.initial_backoff_ms.value.to_string(), self.initial_backoff_ms.source),
        );
        map.insert(
            "max_backoff_ms".to_string(),
            (self.max_backoff_ms.value.to_string(), self.max_backoff_ms.source),
        );

        map
    }
}

fn invalid(key: &str, reason: &str) -> SitePoiError {
    SitePoiError::ConfigInvalid { key: key.to_string(), reason: reason.to_string() }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': ignoring", key, raw);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    region: Option<RegionBounds>,
    eps_km: Option<f64>,
    min_cluster_size: Option<usize>,
    min_samples: Option<usize>,
    bbox_padding_deg: Option<f64>,
    query_radius_m: Option<f64>,
    proximity_cutoff_m: Option<f64>,
    overpass_url: Option<String>,
    query_timeout_secs: Option<u64>,
    max_concurrent_queries: Option<usize>,
    max_attempts: Option<u32>,
    initial_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub eps_km: Option<f64>,
    pub min_cluster_size: Option<usize>,
    pub min_samples: Option<usize>,
    pub overpass_url: Option<String>,
    pub max_concurrent_queries: Option<usize>,
}

/// HDBSCAN parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringParams {
    /// Maximum linking radius between cluster members
    pub eps_km: f64,
    pub min_cluster_size: usize,
    /// Core-point density threshold
    pub min_samples: usize,
}

impl ClusteringParams {
    /// `eps_km` as an angle on the unit sphere
    pub fn eps_radians(&self) -> f64 {
        self.eps_km / EARTH_MEAN_RADIUS_KM
    }
}

/// Connection settings for the external POI source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub endpoint: String,
    /// Per-query timeout; a query that exceeds it yields an empty result
    pub timeout: Duration,
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before the attempt that follows `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.initial_backoff.saturating_mul(1u32 << exponent);
        delay.min(self.max_backoff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchSettings {
    pub max_concurrent_queries: usize,
    pub retry: RetryPolicy,
}

/// Frozen configuration threaded through every pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub region: RegionBounds,
    pub clustering: ClusteringParams,
    /// Degrees added on every side of a cluster box
    pub bbox_padding_deg: f64,
    /// Radius of the query issued for each noise site
    pub query_radius_m: f64,
    /// Inclusive distance cutoff for proximity edges
    pub proximity_cutoff_m: f64,
    pub source: SourceSettings,
    pub fetch: FetchSettings,
}
