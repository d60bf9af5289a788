//! Persisted failover record.

use serde::{Deserialize, Serialize};

/// Phase of the failover protocol.
///
/// ```text
/// Stable → PrimaryListExhausted → DiscoveryFallback → Stable (on success)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No failover in progress; the active base URL is trusted.
    #[default]
    Stable,
    /// The static candidate list ran out; discovery must be consulted next.
    PrimaryListExhausted,
    /// Remaining candidates came from the discovery document.
    DiscoveryFallback,
}

/// The single source of truth for which base URL requests should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Open attempt correlation token; empty when no attempt is open.
    pub attempt_id: String,
    pub active_base_url: String,
    /// Base URL active before the last switch; empty until the first switch.
    pub previous_base_url: String,
    /// Untried candidates, next one first.
    pub remaining_candidates: Vec<String>,
    pub phase: Phase,
    /// Bases already tried during the open attempt.
    #[serde(default)]
    pub tried_base_urls: Vec<String>,
}

impl FailoverConfig {
    /// Fresh record from an ordered, de-duplicated candidate list.
    ///
    /// Returns `None` for an empty list.
    pub fn from_candidates(candidates: &[String]) -> Option<Self> {
        let (first, rest) = candidates.split_first()?;
        Some(Self {
            attempt_id: String::new(),
            active_base_url: first.clone(),
            previous_base_url: String::new(),
            remaining_candidates: rest.iter().filter(|c| *c != first).cloned().collect(),
            phase: Phase::Stable,
            tried_base_urls: Vec::new(),
        })
    }

    /// True while a failover attempt is open.
    pub fn has_open_attempt(&self) -> bool {
        !self.attempt_id.is_empty()
    }
}
