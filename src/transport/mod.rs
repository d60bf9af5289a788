//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (method, absolute URL, headers, buffered body)
//!     → Transport::send (http.rs: reqwest client with timeouts)
//!     → Ok(HttpResponse)          any HTTP status, the host was reached
//!     → Err(TransportError{code}) network-level failure, classified by ErrorCode
//! ```
//!
//! # Design Decisions
//! - Bodies are buffered so a failed request can be replayed verbatim
//! - Failures carry a classified code; the failover engine never inspects messages
//! - The trait is object-safe so the engine can wrap any transport

pub mod http;
pub mod types;

pub use http::ReqwestTransport;
pub use types::{ErrorCode, HttpResponse, RequestDescriptor, TransportError, ATTEMPT_ID_HEADER};

use async_trait::async_trait;

/// Performs a single network exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once and return whatever the far end answered.
    async fn send(&self, request: RequestDescriptor) -> Result<HttpResponse, TransportError>;
}
