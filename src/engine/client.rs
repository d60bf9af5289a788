//! Public failover client.
//!
//! # Responsibilities
//! - Assemble store, transport, candidate source and engine from settings
//! - `init()`: load or create the failover record
//! - `reset()`: clear it from memory and storage
//! - `current_base_url()`: lock-free read for building request URLs
//!
//! # Design Decisions
//! - Collaborators default to the production implementations and can be swapped in the builder
//! - The engine is wired at build time; `init()` only concerns state

use reqwest::Method;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::candidates::{CandidateSource, DiscoveryError, DiscoveryFetcher, HttpDiscoveryFetcher};
use crate::clock::{Clock, SystemClock};
use crate::config::FailoverSettings;
use crate::engine::interceptor::FailoverEngine;
use crate::engine::rewrite::join_url;
use crate::state::{BaseUrlHandle, FailoverConfig, FailoverState, JsonFileStore, StateError, Store};
use crate::transport::{HttpResponse, ReqwestTransport, RequestDescriptor, Transport, TransportError};

/// Errors raised while assembling a client.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("discovery setup failed: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// HTTP client that fails over between candidate base URLs.
pub struct FailoverClient {
    engine: FailoverEngine,
    state: Arc<Mutex<FailoverState>>,
    base_url: BaseUrlHandle,
}

impl FailoverClient {
    /// Start building a client from settings.
    pub fn builder(settings: FailoverSettings) -> FailoverClientBuilder {
        FailoverClientBuilder::new(settings)
    }

    /// Load the persisted record or create one from the static list.
    ///
    /// Returns the active base URL.
    pub async fn init(&self) -> Result<String, StateError> {
        let mut state = self.state.lock().await;
        let config = state.initialize().await?;
        Ok(config.active_base_url.clone())
    }

    /// Forget all failover state, persisted and in memory.
    pub async fn reset(&self) {
        self.state.lock().await.reset().await;
    }

    /// The base URL every outgoing request should target, `None` before `init()`.
    pub fn current_base_url(&self) -> Option<String> {
        self.base_url.get()
    }

    /// Absolute URL for `path` on the current base URL.
    pub fn url_for(&self, path: &str) -> Option<String> {
        self.current_base_url().map(|base| join_url(&base, path))
    }

    /// Build a request for `path` on the current base URL.
    pub fn request(&self, method: Method, path: &str) -> Option<RequestDescriptor> {
        self.url_for(path).map(|url| RequestDescriptor::new(method, url))
    }

    /// Send a request through the failover engine.
    pub async fn send(&self, request: RequestDescriptor) -> Result<HttpResponse, TransportError> {
        self.engine.send(request).await
    }

    /// Copy of the current failover record.
    pub async fn snapshot(&self) -> Option<FailoverConfig> {
        self.state.lock().await.snapshot().cloned()
    }
}

/// Builder for [`FailoverClient`].
pub struct FailoverClientBuilder {
    settings: FailoverSettings,
    store: Option<Arc<dyn Store>>,
    transport: Option<Arc<dyn Transport>>,
    fetcher: Option<Arc<dyn DiscoveryFetcher>>,
    clock: Option<Arc<dyn Clock>>,
}

impl FailoverClientBuilder {
    pub fn new(settings: FailoverSettings) -> Self {
        Self {
            settings,
            store: None,
            transport: None,
            fetcher: None,
            clock: None,
        }
    }

    /// Persist state somewhere other than `storage.path`.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use this fetcher for discovery, regardless of `discovery.enabled`.
    pub fn discovery_fetcher(mut self, fetcher: Arc<dyn DiscoveryFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<FailoverClient, BuildError> {
        let settings = self.settings;

        let store: Arc<dyn Store> = match self.store {
            Some(store) => store,
            None => Arc::new(JsonFileStore::new(PathBuf::from(&settings.storage.path))),
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&settings.timeouts)?),
        };
        let fetcher: Option<Arc<dyn DiscoveryFetcher>> = match self.fetcher {
            Some(fetcher) => Some(fetcher),
            None if settings.discovery.enabled => {
                Some(Arc::new(HttpDiscoveryFetcher::new(&settings.discovery)?))
            }
            None => None,
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        let candidates = Arc::new(CandidateSource::new(
            &settings.candidates.base_urls,
            fetcher,
            clock,
            settings.discovery.ttl_minutes,
        ));
        let state = FailoverState::new(store, settings.storage.key.clone(), candidates.list_static_candidates());
        let base_url = state.base_url_handle();
        let state = Arc::new(Mutex::new(state));
        let engine = FailoverEngine::new(state.clone(), candidates, transport);

        Ok(FailoverClient {
            engine,
            state,
            base_url,
        })
    }
}
