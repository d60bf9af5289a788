//! Failover state subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     store.rs (persisted record, if any)
//!     → failover.rs initialize() (restore, or derive from the static list)
//!     → BaseUrlHandle published for readers
//!
//! During an episode (driven only by the decision engine):
//!     begin_attempt → [adopt_discovery_candidates] → advance → commit_stable
//!     each step persists through store.rs before returning
//! ```
//!
//! # Design Decisions
//! - One record per process, addressed by a fixed key
//! - Exhaustion leaves the phase untouched so the next failure resumes, not restarts
//! - Readers never lock; they load the published base URL

pub mod failover;
pub mod model;
pub mod store;

pub use failover::{BaseUrlHandle, FailoverState, StateError};
pub use model::{FailoverConfig, Phase};
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
