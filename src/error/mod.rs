// Error types for gemstudio
// Author: kelexine (https://github.com/kelexine)

use crate::auth::ValidationResult;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    /// Remote call failure. `status` carries the HTTP status when the service
    /// returned one.
    #[error("Gemini API error{}: {message}", status_suffix(.status))]
    Api { status: Option<u16>, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// The probe issued while constructing a client handle did not succeed.
    #[error("Credential validation failed: {0}")]
    ValidationFailed(#[source] Box<StudioError>),

    #[error("Credential rejected: {0}")]
    CredentialRejected(ValidationResult),

    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last_error: Box<StudioError>,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StudioError {
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        StudioError::Api {
            status,
            message: message.into(),
        }
    }

    /// Structured HTTP status of the underlying failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StudioError::Api { status, .. } => *status,
            StudioError::Http(e) => e.status().map(|s| s.as_u16()),
            StudioError::ValidationFailed(inner) => inner.status_code(),
            StudioError::RetryExhausted { last_error, .. } => last_error.status_code(),
            _ => None,
        }
    }

    /// Innermost error, looking through validation and retry wrappers.
    pub fn root(&self) -> &StudioError {
        match self {
            StudioError::ValidationFailed(inner) => inner.root(),
            StudioError::RetryExhausted { last_error, .. } => last_error.root(),
            other => other,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, StudioError>;
