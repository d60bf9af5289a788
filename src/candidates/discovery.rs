//! Remote discovery document.
//!
//! # Responsibilities
//! - Define the document shape (domains, weighted proxies, bucket URL)
//! - Derive an ordered candidate list from it
//! - Fetch it over HTTP
//!
//! # Design Decisions
//! - Domains keep document order and come before proxies
//! - Proxies are ordered by descending weight; equal weights keep document order
//! - A document announcing a new bucket URL moves subsequent fetches there

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::candidates::normalize_base_url;
use crate::config::DiscoveryConfig;

/// Errors raised while obtaining the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("discovery document unavailable: {0}")]
    Unavailable(String),

    #[error("discovery is not configured")]
    Disabled,
}

/// One proxy entry of the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEntry {
    pub url: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Remotely hosted list of fallback domains and proxies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default)]
    pub proxies: Vec<ProxyEntry>,

    /// Where the document itself should be fetched from next time.
    #[serde(
        default,
        alias = "actualBucketUrl",
        alias = "actualBacketUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_bucket_url: Option<String>,
}

impl DiscoveryDocument {
    /// Ordered, de-duplicated candidate base URLs.
    pub fn candidate_urls(&self) -> Vec<String> {
        let mut proxies: Vec<&ProxyEntry> = self.proxies.iter().collect();
        proxies.sort_by(|a, b| b.weight.cmp(&a.weight));

        let raw = self
            .domains
            .iter()
            .map(String::as_str)
            .chain(proxies.into_iter().map(|p| p.url.as_str()));

        let mut candidates: Vec<String> = Vec::new();
        for entry in raw {
            match to_base_url(entry) {
                Some(base_url) if !candidates.contains(&base_url) => candidates.push(base_url),
                Some(_) => {}
                None => tracing::warn!(entry = %entry, "Ignoring invalid discovery candidate"),
            }
        }
        candidates
    }
}

/// Turn a bare domain or URL into a normalized http(s) base URL.
fn to_base_url(entry: &str) -> Option<String> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }
    let with_scheme = if entry.contains("://") {
        entry.to_string()
    } else {
        format!("https://{}", entry)
    };

    let url = Url::parse(&with_scheme).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(normalize_base_url(&with_scheme))
}

/// Discovery fetch collaborator.
#[async_trait]
pub trait DiscoveryFetcher: Send + Sync {
    async fn fetch(&self) -> Result<DiscoveryDocument, DiscoveryError>;
}

/// Fetches the discovery document as JSON over HTTP.
#[derive(Debug)]
pub struct HttpDiscoveryFetcher {
    client: reqwest::Client,
    url: ArcSwap<String>,
}

impl HttpDiscoveryFetcher {
    pub fn new(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: ArcSwap::from_pointee(config.url.clone()),
        })
    }

    /// URL the next fetch will use.
    pub fn url(&self) -> String {
        self.url.load().as_ref().clone()
    }
}

#[async_trait]
impl DiscoveryFetcher for HttpDiscoveryFetcher {
    async fn fetch(&self) -> Result<DiscoveryDocument, DiscoveryError> {
        let url = self.url();
        tracing::debug!(url = %url, "Fetching discovery document");

        let document: DiscoveryDocument = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        if let Some(bucket_url) = &document.primary_bucket_url {
            if *bucket_url != url && Url::parse(bucket_url).is_ok() {
                tracing::info!(from = %url, to = %bucket_url, "Discovery document moved");
                self.url.store(Arc::new(bucket_url.clone()));
            }
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "domains": ["c.example", "https://d.example/"],
            "proxies": [
                {"url": "https://p1.example", "weight": 1},
                {"url": "https://p2.example", "weight": 5},
                {"url": "https://p3.example"}
            ],
            "actualBacketUrl": "https://bucket2.example/config.json"
        }"#;
        let document: DiscoveryDocument = serde_json::from_str(json).unwrap();

        assert_eq!(document.proxies[2].weight, 1);
        assert_eq!(
            document.primary_bucket_url.as_deref(),
            Some("https://bucket2.example/config.json")
        );
        assert_eq!(
            document.candidate_urls(),
            vec![
                "https://c.example",
                "https://d.example",
                "https://p2.example",
                "https://p1.example",
                "https://p3.example",
            ]
        );
    }

    #[test]
    fn test_candidate_urls_skip_invalid_and_duplicates() {
        let document = DiscoveryDocument {
            domains: vec!["".into(), "ftp://x.example".into(), "c.example".into()],
            proxies: vec![ProxyEntry {
                url: "https://c.example/".into(),
                weight: 3,
            }],
            primary_bucket_url: None,
        };
        assert_eq!(document.candidate_urls(), vec!["https://c.example"]);
    }

    #[test]
    fn test_empty_document() {
        let document: DiscoveryDocument = serde_json::from_str("{}").unwrap();
        assert!(document.candidate_urls().is_empty());
    }
}
