//! Failover decision engine.
//!
//! # Data Flow
//! ```text
//! FailoverClient::send(request)
//!     → interceptor.rs: transport.send(request)
//!         Ok  → on_success: commit open attempt → response to caller
//!         Err → on_failure:
//!               code not observable / no context → original error
//!               begin_attempt → [discovery] → advance
//!               rewrite.rs: previous base → active base
//!               transport.send(replay, attempt id attached) exactly once
//!               → replay outcome to caller
//! ```
//!
//! # Design Decisions
//! - Failover is a transport-layer remedy; HTTP status errors pass straight through
//! - One replay per originating failure, never recursive
//! - Callers only ever see the original error or a real response

pub mod client;
pub mod error;
pub mod interceptor;
pub mod rewrite;

pub use client::{BuildError, FailoverClient, FailoverClientBuilder};
pub use error::FailoverError;
pub use interceptor::FailoverEngine;
