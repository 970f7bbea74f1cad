use console::style;
use sitepoi_core::error::SitePoiError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing site file
pub fn site_file_not_found(path: &str) -> CliError {
    CliError::new("Site file not found")
        .with_context(format!("The specified site file does not exist.\n\nPath: {}", path))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Use absolute path or path relative to current directory")
        .with_help("Run: sitepoi run --help")
}

/// Create error for a site file without a required column
pub fn missing_column(column: &str) -> CliError {
    CliError::new(format!("Site file has no '{}' column", column))
        .with_context("Every site file needs an 'id' and a 'geoCoordinates' column.")
        .with_suggestion("Check the header row of the CSV file")
        .with_suggestion("geoCoordinates values look like \"[10.12, 50.34]\" (lon, lat)")
        .with_help("Run: sitepoi run --help")
}

/// Create error for an undecodable coordinate
pub fn coordinate_parse_failed(row: usize, reason: &str) -> CliError {
    CliError::new(format!("Cannot parse site row {}", row))
        .with_context(format!("The run was aborted before any query was issued.\n\nReason: {}", reason))
        .with_suggestion("Fix or remove the offending row")
        .with_suggestion("geoCoordinates must be a two-element list: \"[lon, lat]\"")
}

/// Create error for a clustering failure
pub fn clustering_failed(reason: &str) -> CliError {
    CliError::new("Clustering failed")
        .with_context(format!("The density clustering step could not label the sites.\n\nReason: {}", reason))
        .with_suggestion("Lower --min-samples or --min-cluster-size for small inputs")
        .with_suggestion("Check for many sites sharing identical coordinates")
        .with_help("Run: sitepoi plan --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check sitepoi.toml for syntax errors")
        .with_suggestion("Check SITEPOI_* environment variables")
        .with_help("Run: sitepoi config")
}

/// Create error for a staging directory without the expected files
pub fn staging_incomplete(path: &str) -> CliError {
    CliError::new("Staging directory is incomplete")
        .with_context(format!("A file written by 'sitepoi run' is missing.\n\nPath: {}", path))
        .with_suggestion("Run the full pipeline first: sitepoi run")
        .with_suggestion("Or point --staging-dir at the directory of an earlier run")
        .with_help("Run: sitepoi enrich --help")
}

/// Map a pipeline error onto a suggestion-bearing CLI error
pub fn from_pipeline_error(error: &SitePoiError) -> CliError {
    match error {
        SitePoiError::SiteFileNotFound { path } => site_file_not_found(&path.display().to_string()),
        SitePoiError::MissingColumn { column } => missing_column(column),
        SitePoiError::Parse { row, reason } => coordinate_parse_failed(*row, reason),
        SitePoiError::Clustering(reason) => clustering_failed(reason),
        SitePoiError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        SitePoiError::ConfigMissing { key } => invalid_config(key, "no value was provided"),
        SitePoiError::StagingMissing { path } => staging_incomplete(&path.display().to_string()),
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: &anyhow::Error) -> CliError {
    if let Some(pipeline_error) = error.downcast_ref::<SitePoiError>() {
        return from_pipeline_error(pipeline_error);
    }

    let message = error.to_string();
    if message.contains("permission denied") || message.contains("Permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
            .with_suggestion("Or run with appropriate privileges")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_pipeline_errors_get_suggestions() {
        let error = SitePoiError::MissingColumn { column: "geoCoordinates".to_string() };
        let cli_error = from_pipeline_error(&error);
        assert!(cli_error.message.contains("geoCoordinates"));
        assert!(!cli_error.suggestions.is_empty());
    }

    #[test]
    fn test_downcast_through_context() {
        let result: Result<(), SitePoiError> =
            Err(SitePoiError::StagingMissing { path: PathBuf::from("/stage/site_data.csv") });
        let error = result.context("Failed to rebuild features").unwrap_err();

        let cli_error = from_anyhow(&error);
        assert_eq!(cli_error.message, "Staging directory is incomplete");
        assert!(cli_error.context.unwrap().contains("/stage/site_data.csv"));
    }

    #[test]
    fn test_unknown_errors_keep_message() {
        let error = anyhow::anyhow!("something odd");
        assert_eq!(from_anyhow(&error).message, "something odd");
    }
}
