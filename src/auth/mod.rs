// API key credential handling
// Author: kelexine (https://github.com/kelexine)

mod validator;

pub use validator::{classify_failure, KeyValidator, ValidationResult, PROBE_PROMPT};

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Opaque Gemini API key.
///
/// The key is the sole authentication token and the sole client cache key.
/// It is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize)]
#[zeroize(drop)]
pub struct Credential(String);

impl Credential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self(api_key.into())
    }

    /// Raw key, for the request header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Short SHA-256 fingerprint used to correlate log lines without the key.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..6])
    }
}

// Custom Debug impl that never logs the key
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential")
            .field(&format_args!("[REDACTED {}]", self.fingerprint()))
            .finish()
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
