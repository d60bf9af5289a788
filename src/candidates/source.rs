//! Candidate source.
//!
//! # Responsibilities
//! - Expose the static candidate list
//! - Serve the discovery document from cache while it is fresh
//! - Refetch it once expired, leaving the old cache untouched on failure
//!
//! # Design Decisions
//! - The cache lock is held across the fetch so concurrent callers share one request
//! - TTL bounds fetch frequency during a total outage without a circuit breaker

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::candidates::cache::DiscoveryCache;
use crate::candidates::discovery::{DiscoveryDocument, DiscoveryError, DiscoveryFetcher};
use crate::candidates::normalize_base_url;
use crate::clock::Clock;
use crate::observability::metrics;

/// Supplies base URLs from static configuration and the discovery document.
pub struct CandidateSource {
    static_candidates: Vec<String>,
    fetcher: Option<Arc<dyn DiscoveryFetcher>>,
    cache: Mutex<DiscoveryCache>,
    clock: Arc<dyn Clock>,
    ttl_minutes: u64,
}

impl CandidateSource {
    /// Create a source. Static entries are normalized and de-duplicated, order kept.
    pub fn new(
        static_candidates: &[String],
        fetcher: Option<Arc<dyn DiscoveryFetcher>>,
        clock: Arc<dyn Clock>,
        ttl_minutes: u64,
    ) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(static_candidates.len());
        for candidate in static_candidates {
            let candidate = normalize_base_url(candidate);
            if !candidate.is_empty() && !normalized.contains(&candidate) {
                normalized.push(candidate);
            }
        }

        Self {
            static_candidates: normalized,
            fetcher,
            cache: Mutex::new(DiscoveryCache::default()),
            clock,
            ttl_minutes,
        }
    }

    /// The configured list; the first entry is the default primary.
    pub fn list_static_candidates(&self) -> Vec<String> {
        self.static_candidates.clone()
    }

    /// The discovery document, fetched only if the cache is absent or expired.
    pub async fn fetch_discovery_document(&self) -> Result<DiscoveryDocument, DiscoveryError> {
        let fetcher = self.fetcher.as_ref().ok_or(DiscoveryError::Disabled)?;
        let mut cache = self.cache.lock().await;

        if let Some(document) = cache.fresh(self.clock.as_ref()) {
            tracing::debug!(expires_at = ?cache.expires_at(), "Reusing cached discovery document");
            metrics::record_discovery_fetch("cached");
            return Ok(document.clone());
        }

        match fetcher.fetch().await {
            Ok(document) => {
                let expires_at = self.clock.add_minutes(self.ttl_minutes);
                tracing::info!(
                    domains = document.domains.len(),
                    proxies = document.proxies.len(),
                    expires_at = %expires_at,
                    "Fetched discovery document"
                );
                metrics::record_discovery_fetch("fetched");
                cache.store(document.clone(), expires_at);
                Ok(document)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discovery document fetch failed");
                metrics::record_discovery_fetch("failed");
                Err(e)
            }
        }
    }

    /// Candidate base URLs from the discovery document.
    pub async fn discovery_candidates(&self) -> Result<Vec<String>, DiscoveryError> {
        Ok(self.fetch_discovery_document().await?.candidate_urls())
    }

    /// The last fetched document regardless of expiry.
    pub async fn cached_document(&self) -> Option<DiscoveryDocument> {
        self.cache.lock().await.document().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    #[async_trait]
    impl DiscoveryFetcher for CountingFetcher {
        async fn fetch(&self) -> Result<DiscoveryDocument, DiscoveryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err(DiscoveryError::Unavailable("bucket unreachable".into()));
            }
            Ok(DiscoveryDocument {
                domains: vec![format!("d{}.example", call)],
                ..Default::default()
            })
        }
    }

    fn source(fetcher: Arc<CountingFetcher>, clock: Arc<ManualClock>) -> CandidateSource {
        CandidateSource::new(
            &["https://a.example/".to_string(), " https://b.example".to_string(), "https://a.example".to_string()],
            Some(fetcher),
            clock,
            10,
        )
    }

    #[test]
    fn test_static_candidates_normalized() {
        let source = source(Arc::default(), Arc::default());
        assert_eq!(source.list_static_candidates(), vec!["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn test_document_cached_within_ttl() {
        let fetcher = Arc::new(CountingFetcher::default());
        let clock = Arc::new(ManualClock::default());
        let source = source(fetcher.clone(), clock.clone());

        assert_eq!(source.discovery_candidates().await.unwrap(), vec!["https://d1.example"]);
        clock.advance(Duration::minutes(9));
        assert_eq!(source.discovery_candidates().await.unwrap(), vec!["https://d1.example"]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(2));
        assert_eq!(source.discovery_candidates().await.unwrap(), vec!["https://d2.example"]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_cache() {
        let fetcher = Arc::new(CountingFetcher::default());
        let clock = Arc::new(ManualClock::default());
        let source = source(fetcher.clone(), clock.clone());

        source.fetch_discovery_document().await.unwrap();
        clock.advance(Duration::minutes(11));
        fetcher.failing.store(true, Ordering::SeqCst);

        let err = source.fetch_discovery_document().await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Unavailable(_)));

        let cached = source.cached_document().await.unwrap();
        assert_eq!(cached.domains, vec!["d1.example"]);

        // Still expired, so the next call retries the fetch
        source.fetch_discovery_document().await.unwrap_err();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_disabled_without_fetcher() {
        let source = CandidateSource::new(&["https://a.example".to_string()], None, Arc::new(ManualClock::default()), 5);
        assert_eq!(source.fetch_discovery_document().await.unwrap_err(), DiscoveryError::Disabled);
    }
}
