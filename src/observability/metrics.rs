//! Metrics collection and exposition.
//!
//! # Metrics
//! - `snap_requests_total` (counter): requests by method, status
//! - `snap_request_duration_seconds` (histogram): time to run the route table
//! - `snap_routes_matched_total` (counter): matches by dispatch kind (view, controller)
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so tests and
//!   embedders pay nothing
//! - The Prometheus exporter is opt-in through config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter, serving scrapes on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a handled request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    ::metrics::counter!("snap_requests_total", &labels).increment(1);
    ::metrics::histogram!("snap_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a route match.
pub fn record_route_matched(kind: &'static str) {
    ::metrics::counter!("snap_routes_matched_total", "kind" => kind).increment(1);
}
