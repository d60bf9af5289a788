//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate candidate URLs (absolute, http or https)
//! - Validate value ranges (TTL > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverSettings → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::FailoverSettings;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("candidates.base_urls must contain at least one base URL")]
    NoCandidates,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("discovery is enabled but discovery.url is not a valid http(s) URL: '{0}'")]
    InvalidDiscoveryUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &FailoverSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.candidates.base_urls.is_empty() {
        errors.push(ValidationError::NoCandidates);
    }

    for base_url in &config.candidates.base_urls {
        if let Err(reason) = check_http_url(base_url) {
            errors.push(ValidationError::InvalidBaseUrl {
                url: base_url.clone(),
                reason,
            });
        }
    }

    if config.discovery.enabled {
        if check_http_url(&config.discovery.url).is_err() {
            errors.push(ValidationError::InvalidDiscoveryUrl(config.discovery.url.clone()));
        }
        if config.discovery.ttl_minutes == 0 {
            errors.push(ValidationError::ZeroValue("discovery.ttl_minutes"));
        }
        if config.discovery.timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue("discovery.timeout_secs"));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}
