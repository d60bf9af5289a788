//! Decision engine wrapped around a transport.
//!
//! # Responsibilities
//! - Pass every request through to the transport
//! - Commit the open attempt when any request succeeds
//! - On an observable failure, pick the next base URL and replay the request once
//! - Hand the caller either the replay outcome or the original error
//!
//! # Design Decisions
//! - The whole decision (begin → discovery → advance) runs under one state lock,
//!   so concurrent failures share one attempt and advance candidates once
//! - A request already targeting the previous base was overtaken by a switch;
//!   it joins the attempt and replays without advancing again
//! - The replay goes straight to the transport and is never failed over itself

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::candidates::{CandidateSource, DiscoveryError};
use crate::engine::error::FailoverError;
use crate::engine::rewrite::{rewrite_url, targets_base};
use crate::observability::metrics;
use crate::state::{FailoverState, StateError};
use crate::transport::{HttpResponse, RequestDescriptor, Transport, TransportError};

/// Failover middleware over a [`Transport`].
pub struct FailoverEngine {
    state: Arc<Mutex<FailoverState>>,
    candidates: Arc<CandidateSource>,
    transport: Arc<dyn Transport>,
}

impl FailoverEngine {
    pub fn new(
        state: Arc<Mutex<FailoverState>>,
        candidates: Arc<CandidateSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            state,
            candidates,
            transport,
        }
    }

    /// Send `request`, failing over once if the target base URL is unreachable.
    pub async fn send(&self, request: RequestDescriptor) -> Result<HttpResponse, TransportError> {
        match self.transport.send(request.clone()).await {
            Ok(response) => {
                self.on_success(&response).await;
                Ok(response)
            }
            Err(error) => self.on_failure(request, error).await,
        }
    }

    /// Success hook: a confirmed response ends the open attempt.
    ///
    /// Error statuses reached the base URL but prove nothing about it, so state is left alone.
    pub async fn on_success(&self, response: &HttpResponse) {
        if response.is_error_status() {
            tracing::debug!(url = %response.url, status = response.status, "Error status, attempt left as is");
            return;
        }

        let mut state = self.state.lock().await;
        if state.snapshot().is_some_and(|c| c.has_open_attempt()) {
            tracing::debug!(url = %response.url, status = response.status, "Response confirms active base URL");
            state.commit_stable().await;
        }
    }

    /// Failure hook: replay on another base URL or return `error` unchanged.
    pub async fn on_failure(
        &self,
        request: RequestDescriptor,
        error: TransportError,
    ) -> Result<HttpResponse, TransportError> {
        let replay = match self.prepare_replay(&request, &error).await {
            Ok(replay) => replay,
            Err(reason) => {
                tracing::debug!(
                    url = %request.url,
                    code = %error.code,
                    reason = %reason,
                    "Returning original error"
                );
                return Err(error);
            }
        };

        tracing::info!(
            attempt_id = replay.attempt_id.as_deref().unwrap_or_default(),
            from = %request.url,
            to = %replay.url,
            code = %error.code,
            "Replaying request on next base URL"
        );

        match self.transport.send(replay).await {
            Ok(response) => {
                metrics::record_replay(true);
                self.on_success(&response).await;
                Ok(response)
            }
            Err(replay_error) => {
                metrics::record_replay(false);
                let reason = FailoverError::ReplayFailure(replay_error.clone());
                tracing::warn!(url = %request.url, error = %reason, "Failover replay failed");
                Err(replay_error)
            }
        }
    }

    /// Decide whether `request` can be replayed and build the replay.
    ///
    /// Every state change made here is persisted before this returns.
    pub async fn prepare_replay(
        &self,
        request: &RequestDescriptor,
        error: &TransportError,
    ) -> Result<RequestDescriptor, FailoverError> {
        if request.attempt_id.is_some() {
            return Err(FailoverError::ReplayFailure(error.clone()));
        }
        if request.url.trim().is_empty() {
            return Err(FailoverError::ContextMissing("request has no URL"));
        }
        if !error.code.is_observable() {
            return Err(FailoverError::NonObservableFailure(error.code.clone()));
        }

        let mut state = self.state.lock().await;

        let switch_needed = {
            let config = state
                .snapshot()
                .ok_or(FailoverError::ContextMissing("failover state is not initialized"))?;
            if targets_base(&request.url, &config.active_base_url) {
                true
            } else if targets_base(&request.url, &config.previous_base_url) {
                false
            } else {
                return Err(FailoverError::ContextMissing("request does not target a tracked base URL"));
            }
        };

        let joined = state.snapshot().is_some_and(|c| c.has_open_attempt());
        let attempt_id = state
            .begin_attempt(&request.url)
            .await
            .map_err(|_| FailoverError::ContextMissing("failover state is not initialized"))?;
        metrics::record_attempt();

        if switch_needed {
            if state.needs_discovery() {
                self.consult_discovery(&mut state).await;
            }

            match state.advance().await {
                Ok(_) => {}
                Err(StateError::CandidatesExhausted) => {
                    tracing::warn!(attempt_id = %attempt_id, url = %request.url, "No base URLs left to try");
                    metrics::record_candidates_exhausted();
                    if !joined {
                        state.abandon_attempt().await;
                    }
                    return Err(FailoverError::CandidatesExhausted);
                }
                Err(_) => return Err(FailoverError::ContextMissing("failover state is not initialized")),
            }
        } else {
            tracing::debug!(attempt_id = %attempt_id, url = %request.url, "Request overtaken by a base URL switch");
        }

        let config = state
            .snapshot()
            .ok_or(FailoverError::ContextMissing("failover state is not initialized"))?;
        let url = rewrite_url(&request.url, &config.previous_base_url, &config.active_base_url)
            .ok_or(FailoverError::ContextMissing("request does not target a tracked base URL"))?;

        let mut replay = request.clone();
        replay.url = url;
        replay.attempt_id = Some(attempt_id);
        Ok(replay)
    }

    async fn consult_discovery(&self, state: &mut FailoverState) {
        match self.candidates.discovery_candidates().await {
            Ok(urls) => {
                if let Err(e) = state.adopt_discovery_candidates(&urls).await {
                    tracing::warn!(error = %e, "Could not adopt discovery candidates");
                }
            }
            Err(DiscoveryError::Disabled) => {
                tracing::debug!("Discovery disabled, no further candidates");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Proceeding without discovery candidates");
            }
        }
    }
}
