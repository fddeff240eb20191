//! Prometheus metrics for bot runs.
//!
//! The bot is a one-shot process, so nothing is scraped. The binary
//! gathers [`REGISTRY`] at the end of a run and can write the text
//! exposition to a node-exporter textfile.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Actions
// =============================================================================

/// Remote mutations by kind and result.
pub static ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tweeterbot_actions_total", "Remote actions attempted"),
        &["action", "result"], // result: "done", "failed", "quota_exceeded"
    )
    .unwrap()
});

/// Pacing delay applied before each action.
pub static PACING_DELAY: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tweeterbot_pacing_delay_seconds",
            "Randomized delay before each remote action",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Policy
// =============================================================================

/// Policy decisions by outcome.
pub static POLICY_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tweeterbot_policy_decisions_total",
            "Policy filter decisions",
        ),
        &["decision"],
    )
    .unwrap()
});

// =============================================================================
// Sync
// =============================================================================

/// Ids written by the last sync, by category.
pub static SYNCED_IDS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("tweeterbot_synced_ids", "Ids written by the last sync"),
        &["category"],
    )
    .unwrap()
});

/// API requests by HTTP method and outcome.
pub static API_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tweeterbot_api_requests_total", "Requests sent to the API"),
        &["method", "status"], // status: "success", "error", "rate_limited"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ACTIONS_TOTAL.clone()),
        Box::new(PACING_DELAY.clone()),
        Box::new(POLICY_DECISIONS.clone()),
        Box::new(SYNCED_IDS.clone()),
        Box::new(API_REQUESTS.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        ACTIONS_TOTAL.with_label_values(&["follow", "done"]).inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("tweeterbot_actions_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        ACTIONS_TOTAL.with_label_values(&["unfollow", "failed"]).inc();
        PACING_DELAY.with_label_values(&[]).observe(1.0);
        POLICY_DECISIONS.with_label_values(&["proceed"]).inc();
        SYNCED_IDS.with_label_values(&["followers"]).set(3);
        API_REQUESTS
            .with_label_values(&["GET", "success"])
            .inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("tweeterbot_actions_total"));
        assert!(output.contains("tweeterbot_pacing_delay_seconds"));
        assert!(output.contains("tweeterbot_policy_decisions_total"));
        assert!(output.contains("tweeterbot_synced_ids"));
        assert!(output.contains("tweeterbot_api_requests_total"));
    }
}
