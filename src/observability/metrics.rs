//! Metrics collection.
//!
//! # Metrics
//! - `pos_dispatch_attempts_total` (counter): attempts by strategy, outcome
//! - `pos_token_exchanges_total` (counter): token exchanges by outcome
//!
//! # Design Decisions
//! - Uses the `metrics` facade; without an installed recorder these are no-ops
//! - Labels are static strings only

use crate::auth::strategy::StrategyKind;

/// Record one dispatch attempt.
pub fn record_attempt(strategy: StrategyKind, outcome: &'static str) {
    metrics::counter!(
        "pos_dispatch_attempts_total",
        "strategy" => strategy.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one token exchange.
pub fn record_token_exchange(outcome: &'static str) {
    metrics::counter!("pos_token_exchanges_total", "outcome" => outcome).increment(1);
}
