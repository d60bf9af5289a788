//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the failover client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the failover client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverSettings {
    /// Build-time candidate base URLs.
    pub candidates: CandidatesConfig,

    /// Remote discovery document settings.
    pub discovery: DiscoveryConfig,

    /// Where failover state is persisted.
    pub storage: StorageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Static candidate list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CandidatesConfig {
    /// Ordered base URLs; the first one is the default primary.
    pub base_urls: Vec<String>,
}

/// Discovery document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Consult the discovery document once the static list is exhausted.
    pub enabled: bool,

    /// URL of the JSON discovery document.
    pub url: String,

    /// Minutes a fetched document is reused before it is fetched again.
    pub ttl_minutes: u64,

    /// Fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            ttl_minutes: 5,
            timeout_secs: 10,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON state file.
    pub path: String,

    /// Key the failover record is stored under.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "failover-state.json".to_string(),
            key: "api-base-url-config".to_string(),
        }
    }
}

/// Timeout configuration for outgoing requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    /// Replays are subject to the same deadline.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: FailoverSettings = toml::from_str(
            r#"
            [candidates]
            base_urls = ["https://a.example", "https://b.example"]
            "#,
        )
        .unwrap();

        assert_eq!(config.candidates.base_urls.len(), 2);
        assert!(!config.discovery.enabled);
        assert_eq!(config.discovery.ttl_minutes, 5);
        assert_eq!(config.storage.key, "api-base-url-config");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.observability.format, LogFormat::Pretty);
    }

    #[test]
    fn test_full_config() {
        let config: FailoverSettings = toml::from_str(
            r#"
            [candidates]
            base_urls = ["https://a.example"]

            [discovery]
            enabled = true
            url = "https://bucket.example/config.json"
            ttl_minutes = 15

            [storage]
            path = "/tmp/state.json"

            [observability]
            log_level = "debug"
            format = "compact"
            "#,
        )
        .unwrap();

        assert!(config.discovery.enabled);
        assert_eq!(config.discovery.ttl_minutes, 15);
        assert_eq!(config.discovery.timeout_secs, 10);
        assert_eq!(config.storage.path, "/tmp/state.json");
        assert_eq!(config.observability.format, LogFormat::Compact);
    }
}
