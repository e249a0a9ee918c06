//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mint_ops_outcomes_total` (counter): terminal outcomes by operation, status
//! - `mint_ops_gas_octas_total` (counter): gas spent by operation
//! - `mint_ops_confirmation_seconds` (histogram): submit-to-commit latency
//! - `mint_ops_node_failures_total` (counter): failed node requests by kind
//! - `mint_ops_batch_halts_total` (counter): batches stopped on a failed outcome
//!
//! Without an installed exporter the macros are no-ops.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::ledger::types::Outcome;

/// Install the Prometheus exporter with a scrape listener on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a terminal outcome and its gas cost.
pub fn record_outcome(operation: &str, outcome: &Outcome) {
    let status = if outcome.is_success() { "succeeded" } else { "failed" };
    ::metrics::counter!(
        "mint_ops_outcomes_total",
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);
    ::metrics::counter!("mint_ops_gas_octas_total", "operation" => operation.to_string())
        .increment(outcome.gas.octas());
}

/// Record time from build to committed.
pub fn record_confirmation_latency(elapsed: Duration) {
    ::metrics::histogram!("mint_ops_confirmation_seconds").record(elapsed.as_secs_f64());
}

/// Record a failed node request.
pub fn record_rpc_failure(kind: &'static str) {
    ::metrics::counter!("mint_ops_node_failures_total", "kind" => kind).increment(1);
}

/// Record a batch stopped by a failed outcome.
pub fn record_batch_halt(operation: &str) {
    ::metrics::counter!("mint_ops_batch_halts_total", "operation" => operation.to_string())
        .increment(1);
}
