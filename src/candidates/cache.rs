//! Expiring cache for the discovery document.

use chrono::{DateTime, Utc};

use crate::candidates::discovery::DiscoveryDocument;
use crate::clock::Clock;

/// Last fetched discovery document and when it stops being reusable.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryCache {
    document: Option<DiscoveryDocument>,
    expires_at: Option<DateTime<Utc>>,
}

impl DiscoveryCache {
    /// The cached document, if it has not expired yet.
    pub fn fresh(&self, clock: &dyn Clock) -> Option<&DiscoveryDocument> {
        match (self.expires_at, &self.document) {
            (Some(expires_at), Some(document)) if !clock.is_past(expires_at) => Some(document),
            _ => None,
        }
    }

    /// Replace the cached document.
    pub fn store(&mut self, document: DiscoveryDocument, expires_at: DateTime<Utc>) {
        self.document = Some(document);
        self.expires_at = Some(expires_at);
    }

    pub fn document(&self) -> Option<&DiscoveryDocument> {
        self.document.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
