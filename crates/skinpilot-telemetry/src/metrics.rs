//! Prometheus metrics for SkinPilot.
//!
//! Covers:
//! - Marketplace lookup attempts and retries
//! - Per-variant quote outcomes
//! - Aggregation latency
//! - Live view sessions
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error; it only happens
//! during lazy static initialization.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

/// Total HTTP attempts against the marketplace.
/// Labels: outcome (ok/not_found/rate_limited/transport_error/decode_error)
pub static LOOKUP_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "skinpilot_lookup_attempts_total",
        "Total marketplace lookup attempts by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Total retries scheduled after a retryable failure.
/// Labels: cause (rate_limited/transport_error)
pub static LOOKUP_RETRIES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "skinpilot_lookup_retries_total",
        "Total marketplace lookup retries by cause",
        &["cause"]
    )
    .unwrap()
});

/// Backoff sleep duration in milliseconds.
pub static BACKOFF_DELAY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "skinpilot_backoff_delay_ms",
        "Backoff delay before a retry in milliseconds",
        &["cause"],
        vec![1.0, 10.0, 100.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0]
    )
    .unwrap()
});

/// Final per-variant quote status.
/// Labels: status (ok/not_found/failed)
pub static QUOTES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "skinpilot_quotes_total",
        "Total per-variant quotes by final status",
        &["status"]
    )
    .unwrap()
});

/// Wall-clock duration of one fan-out aggregation in milliseconds.
pub static AGGREGATION_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "skinpilot_aggregation_latency_ms",
        "Fan-out aggregation latency in milliseconds",
        &["result"],
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 15000.0, 30000.0, 60000.0]
    )
    .unwrap()
});

/// Number of live interactive view sessions.
pub static VIEW_SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "skinpilot_view_sessions_active",
        "Number of live interactive view sessions"
    )
    .unwrap()
});

/// Total toggle events applied to view sessions.
pub static TOGGLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "skinpilot_toggles_total",
        "Total facet toggle events",
        &["facet"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record one marketplace attempt.
    pub fn lookup_attempt(outcome: &str) {
        LOOKUP_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a scheduled retry and its backoff delay.
    pub fn lookup_retry(cause: &str, delay_ms: f64) {
        LOOKUP_RETRIES_TOTAL.with_label_values(&[cause]).inc();
        BACKOFF_DELAY_MS.with_label_values(&[cause]).observe(delay_ms);
    }

    /// Record a final per-variant quote status.
    pub fn quote(status: &str) {
        QUOTES_TOTAL.with_label_values(&[status]).inc();
    }

    /// Record aggregation latency.
    pub fn aggregation_latency(result: &str, latency_ms: f64) {
        AGGREGATION_LATENCY_MS
            .with_label_values(&[result])
            .observe(latency_ms);
    }

    /// Set the live session count.
    pub fn view_sessions_active(count: i64) {
        VIEW_SESSIONS_ACTIVE.set(count);
    }

    /// Record a toggle event.
    pub fn toggle(facet: &str) {
        TOGGLES_TOTAL.with_label_values(&[facet]).inc();
    }

    /// Encode all registered metrics in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buf = Vec::new();
        encoder
            .encode(&families, &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = QUOTES_TOTAL.with_label_values(&["ok"]).get();
        Metrics::quote("ok");
        Metrics::quote("ok");
        let after = QUOTES_TOTAL.with_label_values(&["ok"]).get();
        assert!(after - before >= 2.0);
    }

    #[test]
    fn test_render_contains_registered_metric() {
        Metrics::lookup_retry("rate_limited", 2000.0);
        let text = Metrics::render().unwrap();
        assert!(text.contains("skinpilot_lookup_retries_total"));
    }
}
