//! Metrics collection and exposition.
//!
//! # Metrics
//! - `treasury_http_requests_total` (counter): requests by method, path, status
//! - `treasury_http_request_duration_seconds` (histogram): latency distribution
//! - `treasury_claim_attempts_total` (counter): fallback variants by outcome
//! - `treasury_claim_runs_total` (counter): completed earning events
//! - `treasury_earned_eth` (gauge): settlement ledger total
//! - `treasury_transfers_total` (counter): direct transfers by kind, outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let path = path.to_string();
    let status = status.to_string();
    counter!(
        "treasury_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "treasury_http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_claim_attempt(variant: &'static str, outcome: &'static str) {
    counter!("treasury_claim_attempts_total", "variant" => variant, "outcome" => outcome)
        .increment(1);
}

pub fn record_claim_run(contracts_succeeded: usize) {
    counter!("treasury_claim_runs_total").increment(1);
    counter!("treasury_claims_confirmed_total").increment(contracts_succeeded as u64);
}

pub fn set_ledger_total(eth: f64) {
    gauge!("treasury_earned_eth").set(eth);
}

pub fn record_transfer(kind: &'static str, outcome: &'static str) {
    counter!("treasury_transfers_total", "kind" => kind, "outcome" => outcome).increment(1);
}
