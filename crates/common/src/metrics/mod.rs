//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all BioLens metrics
pub const METRICS_PREFIX: &str = "biolens";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 5ms, P99 < 25ms (no I/O behind any route)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.0005, // 0.5ms
    0.001,  // 1ms
    0.0025, // 2.5ms
    0.005,  // 5ms - P50 target
    0.010,  // 10ms
    0.025,  // 25ms - P99 target
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    1.000,  // 1s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_ask_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Questions routed, labelled by the matched topic"
    );

    describe_counter!(
        format!("{}_citation_lookups_total", METRICS_PREFIX),
        Unit::Count,
        "Citation registry lookups, labelled hit or miss"
    );

    describe_gauge!(
        format!("{}_sessions_active", METRICS_PREFIX),
        Unit::Count,
        "Live ask transcripts held in memory"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Count one routed question
pub fn record_ask(topic: &str) {
    counter!(
        format!("{}_ask_queries_total", METRICS_PREFIX),
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// Count one citation lookup
pub fn record_citation_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };

    counter!(
        format!("{}_citation_lookups_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);
}

/// Publish the number of live transcripts
pub fn record_active_sessions(count: usize) {
    gauge!(format!("{}_sessions_active", METRICS_PREFIX)).set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(LATENCY_BUCKETS.contains(&0.005));
        assert!(LATENCY_BUCKETS.contains(&0.025));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every helper must be a silent no-op
        let metrics = RequestMetrics::start("POST", "/v1/ask");
        metrics.finish(200);
        record_ask("fallback");
        record_citation_lookup(false);
        record_active_sessions(3);
    }
}
