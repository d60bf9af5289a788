//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply BACKEND_BASE_URLS override)
//!     → validation.rs (semantic checks)
//!     → FailoverSettings (validated, immutable)
//!     → handed to the failover client at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    CandidatesConfig, DiscoveryConfig, FailoverSettings, LogFormat, ObservabilityConfig,
    StorageConfig, TimeoutConfig,
};
