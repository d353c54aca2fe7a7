// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    CACHE_OPERATIONS,
    FALLBACKS,
    FETCH_EVENTS,
    LIFECYCLE_TRANSITIONS,
    NETWORK_DURATION,
    NETWORK_REQUESTS,
    NOTIFICATION_EVENTS,
    PARTITION_ENTRIES,
    PASSTHROUGH_REQUESTS,
    SYNC_SWEEPS,
};

/// Helper to record a classified fetch event
pub fn record_fetch(classification: &str, strategy: &str) {
    FETCH_EVENTS
        .with_label_values(&[classification, strategy])
        .inc();
}

pub fn record_passthrough(method: &str) {
    PASSTHROUGH_REQUESTS.with_label_values(&[method]).inc();
}

/// Helper to record an origin round-trip
pub fn record_network(responded: bool, duration_secs: f64) {
    let outcome = if responded { "response" } else { "error" };
    NETWORK_REQUESTS.with_label_values(&[outcome]).inc();
    NETWORK_DURATION
        .with_label_values(&[outcome])
        .observe(duration_secs);
}

/// Helper to record cache operations
pub fn record_cache_hit(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "hit"]).inc();
}

pub fn record_cache_miss(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "miss"]).inc();
}

pub fn record_cache_store(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "store"]).inc();
}

/// A response that was returned but deliberately not stored (non-ok status)
pub fn record_cache_skip(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "skip"]).inc();
}

pub fn update_partition_entries(partition: &str, count: usize) {
    PARTITION_ENTRIES.with_label_values(&[partition]).set(count as f64);
}

pub fn record_fallback(kind: &str) {
    FALLBACKS.with_label_values(&[kind]).inc();
}

pub fn record_lifecycle(state: &str) {
    LIFECYCLE_TRANSITIONS.with_label_values(&[state]).inc();
}

pub fn record_notification(event: &str) {
    NOTIFICATION_EVENTS.with_label_values(&[event]).inc();
}

pub fn record_sync(outcome: &str) {
    SYNC_SWEEPS.with_label_values(&[outcome]).inc();
}
