//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): completed requests by endpoint, status
//! - `relay_request_duration_seconds` (histogram): latency by endpoint
//! - `relay_rejections_total` (counter): validation rejections by endpoint, reason
//! - `relay_upstream_failures_total` (counter): upstream failures by endpoint, kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    counter!("relay_requests_total", "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
    histogram!("relay_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(endpoint: &'static str, reason: &'static str) {
    counter!("relay_rejections_total", "endpoint" => endpoint, "reason" => reason).increment(1);
}

pub fn record_upstream_failure(endpoint: &'static str, kind: &'static str) {
    counter!("relay_upstream_failures_total", "endpoint" => endpoint, "kind" => kind).increment(1);
}
