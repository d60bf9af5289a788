//! Metrics collection.
//!
//! # Metrics
//! - `failover_attempts_total` (counter): failover decisions that opened or joined an attempt
//! - `failover_replays_total` (counter): replays by outcome (success, failure)
//! - `failover_discovery_fetches_total` (counter): discovery fetches by outcome (fetched, cached, failed)
//! - `failover_candidates_exhausted_total` (counter): failures with nothing left to try
//! - `failover_remaining_candidates` (gauge): candidates left in the current episode

use metrics::{counter, gauge};

pub fn record_attempt() {
    counter!("failover_attempts_total").increment(1);
}

pub fn record_replay(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("failover_replays_total", "outcome" => outcome).increment(1);
}

pub fn record_discovery_fetch(outcome: &'static str) {
    counter!("failover_discovery_fetches_total", "outcome" => outcome).increment(1);
}

pub fn record_candidates_exhausted() {
    counter!("failover_candidates_exhausted_total").increment(1);
}

pub fn record_remaining_candidates(count: usize) {
    gauge!("failover_remaining_candidates").set(count as f64);
}
