// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    CLIENT_CACHE_OPERATIONS,
    GEMINI_API_CALLS,
    GEMINI_API_DURATION,
    IMAGE_DECODE_FAILURES,
    KEY_VALIDATIONS,
    RETRY_ATTEMPTS,
    TOKENS_TOTAL,
};

/// Helper to record Gemini API call metrics. Use status 0 when no response
/// arrived.
pub fn record_gemini_call(model: &str, status_code: u16, duration_secs: f64) {
    GEMINI_API_CALLS
        .with_label_values(&[model, &status_code.to_string()])
        .inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}

/// Helper to record token usage
pub fn record_tokens(model: &str, input: u32, output: u32) {
    if input > 0 {
        TOKENS_TOTAL
            .with_label_values(&[model, "input"])
            .inc_by(input as f64);
    }
    if output > 0 {
        TOKENS_TOTAL
            .with_label_values(&[model, "output"])
            .inc_by(output as f64);
    }
}

/// Helper to record client cache operations
pub fn record_client_cache(operation: &str) {
    CLIENT_CACHE_OPERATIONS.with_label_values(&[operation]).inc();
}

pub fn record_key_validation(result: &str) {
    KEY_VALIDATIONS.with_label_values(&[result]).inc();
}

pub fn record_retry_attempt(operation: &str, outcome: &str) {
    RETRY_ATTEMPTS.with_label_values(&[operation, outcome]).inc();
}

pub fn record_image_decode_failure(stage: &str) {
    IMAGE_DECODE_FAILURES.with_label_values(&[stage]).inc();
}
