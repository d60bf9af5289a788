//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Decision engine, candidate source, failover state produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → whatever subscriber the embedding application installs
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the binary's job
//! - Attempt IDs are attached to every failover event for correlation
//! - Metric updates are no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
