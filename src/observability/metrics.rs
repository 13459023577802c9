//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_rewrites_total` (counter): backend paths restored by `revert`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Route label used when no route matched.
pub const NO_ROUTE: &str = "none";

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed proxied request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("proxy_requests_total", &labels).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a backend-authored header value rewritten for the client.
pub fn record_rewrite(route: &str, header: &'static str) {
    metrics::counter!(
        "proxy_rewrites_total",
        "route" => route.to_string(),
        "header" => header
    )
    .increment(1);
}
