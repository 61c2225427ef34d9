// Prometheus metrics definitions for the scouting backend.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Events fully loaded into the cache.
    pub static ref EVENTS_CACHED: IntGauge =
        IntGauge::new("scout_events_cached", "Events loaded into the cache").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Fetches issued against the data source, by resource kind.
    pub static ref SOURCE_FETCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_source_fetches_total", "Data source fetches issued"),
        &["resource"],
    )
    .unwrap();

    /// Failed data source fetches, by resource kind.
    pub static ref SOURCE_FETCH_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_source_fetch_errors_total", "Data source fetches that failed"),
        &["resource"],
    )
    .unwrap();

    pub static ref ROBOT_ENTRIES_LOADED_TOTAL: IntCounter = IntCounter::new(
        "scout_robot_entries_loaded_total",
        "Robot match entries hydrated from event data",
    )
    .unwrap();

    /// Entries run through the behavior classifier, by phase.
    pub static ref ENTRIES_CLASSIFIED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_entries_classified_total", "Entries classified"),
        &["phase"],
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("scout_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "scout_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_CACHED.clone()),
        Box::new(SOURCE_FETCHES_TOTAL.clone()),
        Box::new(SOURCE_FETCH_ERRORS_TOTAL.clone()),
        Box::new(ROBOT_ENTRIES_LOADED_TOTAL.clone()),
        Box::new(ENTRIES_CLASSIFIED_TOTAL.clone()),
        Box::new(API_REQUESTS_TOTAL.clone()),
        Box::new(API_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::warn!("Metric registration skipped: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Normalize a URL path for metric labels: event slugs and numeric segments
/// become placeholders to keep label cardinality bounded.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if i > 0 && segments[i - 1] == "events" && !segment.is_empty() {
                ":slug"
            } else if i > 0 && segments[i - 1] == "matches" && !segment.is_empty() {
                ":key"
            } else if segment.parse::<i64>().is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
