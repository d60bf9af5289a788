//! Candidate source subsystem.
//!
//! # Data Flow
//! ```text
//! Static list (config / BACKEND_BASE_URLS)
//!     → source.rs (normalized, ordered; first = default primary)
//!
//! Static list exhausted:
//!     → source.rs checks cache.rs (fresh? reuse)
//!     → otherwise discovery.rs fetches the remote document
//!     → cache.rs stores it with expiry = now + TTL
//!     → DiscoveryDocument::candidate_urls() (domains, then proxies by weight)
//! ```
//!
//! # Design Decisions
//! - Discovery failure is never fatal; the caller proceeds without new candidates
//! - Base URLs are compared as normalized strings (trimmed, no trailing slash)

pub mod cache;
pub mod discovery;
pub mod source;

pub use cache::DiscoveryCache;
pub use discovery::{DiscoveryDocument, DiscoveryError, DiscoveryFetcher, HttpDiscoveryFetcher, ProxyEntry};
pub use source::CandidateSource;

/// Trim whitespace and trailing slashes from a base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" https://a.example// "), "https://a.example");
        assert_eq!(normalize_base_url("http://b.example:8080"), "http://b.example:8080");
    }
}
