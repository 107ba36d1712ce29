// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec, Encoder, HistogramVec,
    Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // GEMINI API METRICS
    // ============================================================================

    /// Total Gemini API calls
    pub static ref GEMINI_API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gemini_api_calls_total", "Total Gemini API calls"),
        &["model", "status_code"], // status_code 0: no response
        REGISTRY
    ).unwrap();

    /// Gemini API call duration
    pub static ref GEMINI_API_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("gemini_api_duration_seconds", "Gemini API call duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["model"],
        REGISTRY
    ).unwrap();

    /// Total tokens reported by the service
    pub static ref TOKENS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("tokens_total", "Total tokens processed"),
        &["model", "type"], // type: input, output
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CLIENT CACHE METRICS
    // ============================================================================

    /// Client cache operations
    pub static ref CLIENT_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("client_cache_operations_total", "Total client cache operations"),
        &["operation"], // operation: hit, miss, create, probe_failure
        REGISTRY
    ).unwrap();

    /// Key validation outcomes
    pub static ref KEY_VALIDATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("key_validations_total", "Total API key validations"),
        &["result"], // result: valid, unauthorized, forbidden, other
        REGISTRY
    ).unwrap();

    // ============================================================================
    // RETRY METRICS
    // ============================================================================

    /// Attempt outcomes inside retry loops
    pub static ref RETRY_ATTEMPTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("retry_attempts_total", "Total attempt outcomes in retry loops"),
        &["operation", "outcome"], // outcome: success, retry, terminal, exhausted
        REGISTRY
    ).unwrap();

    // ============================================================================
    // IMAGE METRICS
    // ============================================================================

    /// Images that failed to decode
    pub static ref IMAGE_DECODE_FAILURES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("image_decode_failures_total", "Total image decode failures"),
        &["stage"], // stage: upload, response
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
