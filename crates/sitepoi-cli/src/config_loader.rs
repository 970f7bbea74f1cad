//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use sitepoi_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Picked up from the working directory when no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "sitepoi.toml";

/// Resolve which config file to read, if any
///
/// An explicit path must exist; the default file is optional.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

/// Load defaults, then file, then environment
pub fn load_config(config_file: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = resolve_config_path(config_file) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(config_file)?;
    config.update_from_cli(overrides);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitepoi_core::config::ConfigSource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_file_is_used() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "min_samples = 7").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.min_samples.value, 7);
        assert_eq!(config.min_samples.source, ConfigSource::File);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        assert!(load_config(Some(Path::new("/nonexistent/sitepoi.toml"))).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "eps_km = 0.5").unwrap();

        let overrides = CliConfigOverrides { eps_km: Some(0.2), ..Default::default() };
        let config = load_config_with_overrides(Some(file.path()), overrides).unwrap();
        assert_eq!(config.eps_km.value, 0.2);
        assert_eq!(config.eps_km.source, ConfigSource::Cli);
    }
}
