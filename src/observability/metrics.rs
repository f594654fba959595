//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_served_total` (counter): feature results by feature, source
//! - `gateway_remote_calls_total` (counter): provider calls by feature, outcome
//! - `gateway_breaker_trips_total` (counter): circuit breaker trips
//! - `gateway_breaker_open` (gauge): 1=open, 0=closed, as last observed
//! - `gateway_cache_writes_total` (counter): cache writes by feature
//! - `stories_appended_total` (counter): stories persisted
//! - `stories_removed_total` (counter): stories dropped by reason (expired, evicted)
//! - `http_requests_total` (counter): API requests by route, status
//! - `http_request_duration_seconds` (histogram): API latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until
//!   `init_metrics` installs the Prometheus recorder
//! - Labels stay low-cardinality (feature, source, route, status)

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_served(feature: &'static str, source: &'static str) {
    ::metrics::counter!("gateway_served_total", "feature" => feature, "source" => source).increment(1);
}

pub fn record_remote_call(feature: &'static str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    ::metrics::counter!("gateway_remote_calls_total", "feature" => feature, "outcome" => outcome)
        .increment(1);
}

pub fn record_breaker_trip() {
    ::metrics::counter!("gateway_breaker_trips_total").increment(1);
    record_breaker_open(true);
}

pub fn record_breaker_open(open: bool) {
    ::metrics::gauge!("gateway_breaker_open").set(if open { 1.0 } else { 0.0 });
}

pub fn record_cache_write(feature: &'static str) {
    ::metrics::counter!("gateway_cache_writes_total", "feature" => feature).increment(1);
}

pub fn record_stories_appended(count: usize) {
    ::metrics::counter!("stories_appended_total").increment(count as u64);
}

pub fn record_stories_removed(reason: &'static str, count: usize) {
    ::metrics::counter!("stories_removed_total", "reason" => reason).increment(count as u64);
}

pub fn record_request(route: &str, status: u16, elapsed: Duration) {
    ::metrics::counter!(
        "http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_request_duration_seconds", "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}
