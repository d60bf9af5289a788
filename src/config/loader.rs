//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::FailoverSettings;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `candidates.base_urls` (comma-separated).
pub const BASE_URLS_ENV: &str = "BACKEND_BASE_URLS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// `BACKEND_BASE_URLS`, when set and non-empty, replaces the file's candidate list.
pub fn load_config(path: &Path) -> Result<FailoverSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: FailoverSettings = toml::from_str(&content)?;

    if let Ok(raw) = std::env::var(BASE_URLS_ENV) {
        apply_base_urls_override(&mut config, &raw);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Replace the static candidate list with a comma-separated override.
pub fn apply_base_urls_override(config: &mut FailoverSettings, raw: &str) {
    let base_urls = parse_base_urls(raw);
    if base_urls.is_empty() {
        return;
    }
    tracing::debug!(count = base_urls.len(), "Candidate list overridden from {}", BASE_URLS_ENV);
    config.candidates.base_urls = base_urls;
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_base_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_base_urls() {
        assert_eq!(
            parse_base_urls(" https://a.example, ,https://b.example,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_base_urls("").is_empty());
    }

    #[test]
    fn test_override_ignores_empty_value() {
        let mut config = FailoverSettings::default();
        config.candidates.base_urls = vec!["https://a.example".into()];
        apply_base_urls_override(&mut config, " , ");
        assert_eq!(config.candidates.base_urls, vec!["https://a.example".to_string()]);

        apply_base_urls_override(&mut config, "https://x.example,https://y.example");
        assert_eq!(config.candidates.base_urls.len(), 2);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[candidates]\nbase_urls = []").unwrap();

        // Only meaningful when the override is not set in the test environment.
        if std::env::var(BASE_URLS_ENV).is_err() {
            let err = load_config(file.path()).unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            assert!(err.to_string().contains("at least one base URL"));
        }
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[candidates\nbase_urls = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
