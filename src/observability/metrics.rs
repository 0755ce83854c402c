//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by function and outcome
//! - `dispatch_duration_seconds` (histogram): dispatch latency by function
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::DispatchOutcome;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished dispatch.
pub fn record_dispatch(function: &str, outcome: DispatchOutcome, start: Instant) {
    metrics::counter!(
        "dispatch_requests_total",
        "function" => function.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!(
        "dispatch_duration_seconds",
        "function" => function.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
