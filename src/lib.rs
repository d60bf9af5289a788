//! Endpoint failover for HTTP clients.
//!
//! Requests go to the active base URL. When one fails with a network-level
//! error, the engine switches to the next candidate base URL (from the
//! static list, then from a remotely hosted discovery document), replays the
//! request there once, and persists the switch so later requests go straight
//! to the new base.

// Core subsystems
pub mod candidates;
pub mod engine;
pub mod state;
pub mod transport;

// Cross-cutting concerns
pub mod clock;
pub mod config;
pub mod observability;

pub use config::schema::FailoverSettings;
pub use engine::{FailoverClient, FailoverEngine, FailoverError};
pub use state::{FailoverConfig, Phase};
