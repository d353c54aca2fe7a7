// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, GaugeVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_gauge_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // FETCH METRICS
    // ============================================================================

    /// Fetch events handled by the worker
    pub static ref FETCH_EVENTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_fetch_events_total", "Fetch events handled by the worker"),
        &["classification", "strategy"],
        REGISTRY
    ).unwrap();

    /// Requests passed through without cache involvement
    pub static ref PASSTHROUGH_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_passthrough_requests_total", "Requests passed straight to the network"),
        &["method"],
        REGISTRY
    ).unwrap();

    /// Fallback responses served instead of a fresh one
    pub static ref FALLBACKS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_fallbacks_total", "Fallback responses by kind"),
        &["kind"], // kind: cache, offline, synthetic
        REGISTRY
    ).unwrap();

    // ============================================================================
    // NETWORK METRICS
    // ============================================================================

    /// Origin round-trips
    pub static ref NETWORK_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_network_requests_total", "Origin round-trips"),
        &["outcome"], // outcome: response, error
        REGISTRY
    ).unwrap();

    /// Origin round-trip duration
    pub static ref NETWORK_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("sw_network_duration_seconds", "Origin round-trip duration")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["outcome"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Partition operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_cache_operations_total", "Cache partition operations"),
        &["partition", "operation"], // operation: hit, miss, store, skip
        REGISTRY
    ).unwrap();

    /// Entries per partition
    pub static ref PARTITION_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("sw_partition_entries", "Entries stored per partition"),
        &["partition"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // LIFECYCLE METRICS
    // ============================================================================

    /// Worker state transitions
    pub static ref LIFECYCLE_TRANSITIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_lifecycle_transitions_total", "Worker lifecycle transitions"),
        &["state"],
        REGISTRY
    ).unwrap();

    /// Push and notification events
    pub static ref NOTIFICATION_EVENTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_notification_events_total", "Push and notification events"),
        &["event"], // event: shown, rejected, clicked, closed
        REGISTRY
    ).unwrap();

    /// Background sync sweeps
    pub static ref SYNC_SWEEPS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sw_sync_sweeps_total", "Background sync sweeps"),
        &["outcome"], // outcome: success, failure, ignored
        REGISTRY
    ).unwrap();
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
