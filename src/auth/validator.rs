// API key validation via a single probe call
// Author: kelexine (https://github.com/kelexine)

use crate::auth::Credential;
use crate::cache::{Acquired, ClientCache};
use crate::error::StudioError;
use crate::gemini::ClientFactory;
use crate::utils::logging::sanitize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Fixed prompt sent by every probe call.
pub const PROBE_PROMPT: &str = "Test API Key";

/// Outcome of validating one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    /// Authentication rejected (HTTP 401 or equivalent).
    Unauthorized,
    /// Authorization denied (HTTP 403 or equivalent).
    Forbidden,
    /// Any other probe failure, with the sanitized message.
    OtherFailure(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ValidationResult::Valid => "valid",
            ValidationResult::Unauthorized => "unauthorized",
            ValidationResult::Forbidden => "forbidden",
            ValidationResult::OtherFailure(_) => "other",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "API key is valid"),
            ValidationResult::Unauthorized => write!(f, "Unauthorized: invalid API key (HTTP 401)"),
            ValidationResult::Forbidden => write!(f, "Forbidden: API key lacks permission (HTTP 403)"),
            ValidationResult::OtherFailure(message) => write!(f, "{}", message),
        }
    }
}

/// Map a failed probe to a [`ValidationResult`].
///
/// Heuristic. A structured 401/403 status wins; otherwise the message is
/// searched for the status code or the service's status name. Google also
/// reports malformed keys as 400 with "API key not valid", which counts as
/// unauthorized.
pub fn classify_failure(error: &StudioError) -> ValidationResult {
    match error.status_code() {
        Some(401) => return ValidationResult::Unauthorized,
        Some(403) => return ValidationResult::Forbidden,
        _ => {}
    }

    let message = sanitize(&error.root().to_string());
    if message.contains("401") || message.contains("UNAUTHENTICATED") || message.contains("API key not valid") {
        ValidationResult::Unauthorized
    } else if message.contains("403") || message.contains("PERMISSION_DENIED") {
        ValidationResult::Forbidden
    } else {
        ValidationResult::OtherFailure(message)
    }
}

/// Validates credentials with exactly one unretried probe, routed through
/// the client cache.
pub struct KeyValidator<F: ClientFactory> {
    cache: Arc<ClientCache<F>>,
}

impl<F: ClientFactory> KeyValidator<F> {
    pub fn new(cache: Arc<ClientCache<F>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ClientCache<F>> {
        &self.cache
    }

    /// Probe `credential` once and classify the outcome.
    ///
    /// When the cache has to build the handle, its construction probe is the
    /// probe. Otherwise one probe goes through the cached handle. A rejected
    /// credential is evicted so the next lookup re-validates it.
    pub async fn validate(&self, credential: &Credential) -> ValidationResult {
        let probe = match self.cache.acquire(credential).await {
            Ok(Acquired { probed: true, .. }) => Ok(()),
            Ok(Acquired { handle, probed: false }) => self.cache.probe(&handle).await,
            Err(e) => Err(e),
        };

        let result = match probe {
            Ok(()) => ValidationResult::Valid,
            Err(e) => classify_failure(&e),
        };

        match &result {
            ValidationResult::Valid => {
                info!("API key {} validated", credential.fingerprint());
            }
            ValidationResult::Unauthorized | ValidationResult::Forbidden => {
                self.cache.evict(credential).await;
                error!("API key {} rejected: {}", credential.fingerprint(), result);
            }
            ValidationResult::OtherFailure(message) => {
                error!("API key {} validation failed: {}", credential.fingerprint(), message);
            }
        }

        crate::metrics::record_key_validation(result.label());
        result
    }
}
