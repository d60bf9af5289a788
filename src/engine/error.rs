//! Reasons a failure was not (or could not be) remedied by failover.
//!
//! None of these reach callers of [`FailoverEngine::send`](crate::engine::FailoverEngine::send):
//! they only explain, in logs and in `prepare_replay`, why the original error was returned.

use thiserror::Error;

use crate::transport::{ErrorCode, TransportError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailoverError {
    /// No URL, no failover state, or a URL outside the tracked base URLs.
    #[error("no failover context: {0}")]
    ContextMissing(&'static str),

    /// The failure is not transport-level unreachability.
    #[error("{0} does not warrant failover")]
    NonObservableFailure(ErrorCode),

    /// Every static and discovered base URL has been tried.
    #[error("all candidate base URLs have been tried")]
    CandidatesExhausted,

    /// The single replay failed too.
    #[error("replayed request failed: {0}")]
    ReplayFailure(TransportError),
}
