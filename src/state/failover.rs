//! Failover state machine.
//!
//! # Responsibilities
//! - Hold the active/previous base URL and the untried candidates
//! - Open (or join) a failover attempt
//! - Advance through candidates, switching phase when the static list runs out
//! - Adopt discovery candidates and commit back to `Stable` on success
//! - Persist after every mutation, publish the active base URL for lock-free readers
//!
//! # Design Decisions
//! - Callers serialize access (the engine keeps this behind a `tokio::sync::Mutex`)
//! - A failed store write is logged; the in-memory record stays authoritative
//! - Exhaustion is an error outcome, not a stored phase

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::observability::metrics;
use crate::state::model::{FailoverConfig, Phase};
use crate::state::store::Store;

/// Errors raised by state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("failover state is not initialized")]
    Uninitialized,

    #[error("no candidate base URLs are configured")]
    NoCandidates,

    #[error("all candidate base URLs have been tried")]
    CandidatesExhausted,
}

/// Lock-free, read-only view of the active base URL.
#[derive(Debug, Clone, Default)]
pub struct BaseUrlHandle(Arc<ArcSwapOption<String>>);

impl BaseUrlHandle {
    /// The active base URL, or `None` while uninitialized.
    pub fn get(&self) -> Option<String> {
        self.0.load_full().map(|url| url.as_ref().clone())
    }

    fn publish(&self, base_url: Option<&str>) {
        self.0.store(base_url.map(|url| Arc::new(url.to_string())));
    }
}

/// Owned failover record plus its persistence.
pub struct FailoverState {
    store: Arc<dyn Store>,
    key: String,
    static_candidates: Vec<String>,
    config: Option<FailoverConfig>,
    base_url: BaseUrlHandle,
}

impl FailoverState {
    /// Create an uninitialized state over `store`.
    ///
    /// `static_candidates` must already be normalized and de-duplicated.
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>, static_candidates: Vec<String>) -> Self {
        Self {
            store,
            key: key.into(),
            static_candidates,
            config: None,
            base_url: BaseUrlHandle::default(),
        }
    }

    /// Load the persisted record, or derive a fresh one from the static list.
    pub async fn initialize(&mut self) -> Result<&FailoverConfig, StateError> {
        let restored = match self.store.get(&self.key).await {
            Ok(Some(config)) if !config.active_base_url.is_empty() => Some(config),
            Ok(Some(_)) => {
                tracing::warn!(key = %self.key, "Persisted failover state has no active base URL, discarding");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to load failover state, starting fresh");
                None
            }
        };

        let config = match restored {
            Some(mut config) => {
                let active = config.active_base_url.clone();
                config.remaining_candidates.retain(|c| *c != active);
                tracing::info!(
                    active_base_url = %config.active_base_url,
                    phase = ?config.phase,
                    attempt_id = %config.attempt_id,
                    "Restored failover state"
                );
                config
            }
            None => {
                let config = FailoverConfig::from_candidates(&self.static_candidates)
                    .ok_or(StateError::NoCandidates)?;
                tracing::info!(
                    active_base_url = %config.active_base_url,
                    candidates = config.remaining_candidates.len(),
                    "Initialized failover state"
                );
                config
            }
        };

        self.config = Some(config);
        self.persist().await;
        self.snapshot().ok_or(StateError::Uninitialized)
    }

    /// Current record, if initialized.
    pub fn snapshot(&self) -> Option<&FailoverConfig> {
        self.config.as_ref()
    }

    /// The active base URL, or `None` while uninitialized.
    pub fn current_base_url(&self) -> Option<String> {
        self.base_url.get()
    }

    /// A handle that keeps observing the active base URL without locking.
    pub fn base_url_handle(&self) -> BaseUrlHandle {
        self.base_url.clone()
    }

    /// Open a failover attempt, or return the one already open.
    pub async fn begin_attempt(&mut self, failing_url: &str) -> Result<String, StateError> {
        let config = self.config.as_mut().ok_or(StateError::Uninitialized)?;

        if config.has_open_attempt() {
            tracing::debug!(attempt_id = %config.attempt_id, url = %failing_url, "Joining open failover attempt");
            return Ok(config.attempt_id.clone());
        }

        if config.phase != Phase::Stable {
            tracing::warn!(phase = ?config.phase, "Opening failover attempt outside the stable phase");
        }

        config.attempt_id = Uuid::new_v4().to_string();
        config.tried_base_urls = vec![config.active_base_url.clone()];
        let attempt_id = config.attempt_id.clone();

        tracing::info!(
            attempt_id = %attempt_id,
            url = %failing_url,
            active_base_url = %config.active_base_url,
            "Failover attempt opened"
        );

        self.persist().await;
        Ok(attempt_id)
    }

    /// True when the next candidate has to come from the discovery document.
    pub fn needs_discovery(&self) -> bool {
        self.config
            .as_ref()
            .map(|c| c.remaining_candidates.is_empty() && c.phase != Phase::DiscoveryFallback)
            .unwrap_or(false)
    }

    /// Switch to the next candidate and return it.
    pub async fn advance(&mut self) -> Result<String, StateError> {
        let config = self.config.as_mut().ok_or(StateError::Uninitialized)?;

        if config.remaining_candidates.is_empty() {
            return Err(StateError::CandidatesExhausted);
        }

        let next = config.remaining_candidates.remove(0);
        config.previous_base_url = std::mem::replace(&mut config.active_base_url, next.clone());
        if !config.tried_base_urls.contains(&next) {
            config.tried_base_urls.push(next.clone());
        }
        if config.remaining_candidates.is_empty() && config.phase != Phase::DiscoveryFallback {
            config.phase = Phase::PrimaryListExhausted;
        }

        tracing::info!(
            attempt_id = %config.attempt_id,
            previous_base_url = %config.previous_base_url,
            active_base_url = %config.active_base_url,
            phase = ?config.phase,
            remaining = config.remaining_candidates.len(),
            "Switched base URL"
        );
        metrics::record_remaining_candidates(config.remaining_candidates.len());

        self.persist().await;
        Ok(next)
    }

    /// Queue discovery candidates that were not tried yet. Returns how many were queued.
    pub async fn adopt_discovery_candidates(&mut self, urls: &[String]) -> Result<usize, StateError> {
        let config = self.config.as_mut().ok_or(StateError::Uninitialized)?;

        let mut adopted = 0;
        for url in urls {
            if *url == config.active_base_url
                || config.tried_base_urls.contains(url)
                || config.remaining_candidates.contains(url)
            {
                continue;
            }
            config.remaining_candidates.push(url.clone());
            adopted += 1;
        }
        config.phase = Phase::DiscoveryFallback;

        tracing::info!(
            attempt_id = %config.attempt_id,
            offered = urls.len(),
            adopted,
            "Adopted discovery candidates"
        );
        metrics::record_remaining_candidates(config.remaining_candidates.len());

        self.persist().await;
        Ok(adopted)
    }

    /// Close the open attempt and trust the active base URL.
    ///
    /// The next episode starts from the static list, beginning after the active base.
    pub async fn commit_stable(&mut self) {
        let Some(config) = self.config.as_mut() else {
            return;
        };

        let attempt_id = std::mem::take(&mut config.attempt_id);
        config.phase = Phase::Stable;
        config.tried_base_urls.clear();
        config.remaining_candidates = candidates_after(&self.static_candidates, &config.active_base_url);

        tracing::info!(
            attempt_id = %attempt_id,
            active_base_url = %config.active_base_url,
            "Failover attempt committed"
        );

        self.persist().await;
    }

    /// Close an attempt that never switched bases.
    ///
    /// The record returns to `Stable` with nothing tried; candidates are left as they are.
    pub async fn abandon_attempt(&mut self) {
        let Some(config) = self.config.as_mut() else {
            return;
        };
        if !config.has_open_attempt() {
            return;
        }

        let attempt_id = std::mem::take(&mut config.attempt_id);
        config.phase = Phase::Stable;
        config.tried_base_urls.clear();

        tracing::info!(
            attempt_id = %attempt_id,
            active_base_url = %config.active_base_url,
            "Failover attempt abandoned without a switch"
        );

        self.persist().await;
    }

    /// Write the record through to the store and publish the active base URL.
    pub async fn persist(&self) {
        let Some(config) = &self.config else {
            return;
        };

        self.base_url.publish(Some(&config.active_base_url));

        if let Err(e) = self.store.set(&self.key, config).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist failover state");
        }
    }

    /// Drop the record from memory and storage.
    pub async fn reset(&mut self) {
        self.config = None;
        self.base_url.publish(None);

        if let Err(e) = self.store.remove(&self.key).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to remove persisted failover state");
        }
        tracing::info!("Failover state reset");
    }
}

/// Static candidates excluding `active`, starting after it and wrapping around.
fn candidates_after(static_candidates: &[String], active: &str) -> Vec<String> {
    match static_candidates.iter().position(|c| c == active) {
        Some(i) => static_candidates[i + 1..]
            .iter()
            .chain(static_candidates[..i].iter())
            .cloned()
            .collect(),
        None => static_candidates.to_vec(),
    }
}
