// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::{GeminiClient, GeminiClientFactory};

use crate::auth::Credential;
use crate::error::Result;
use crate::models::{GenerateContentResponse, GenerationParameters, RequestPayload};
use async_trait::async_trait;

/// A handle able to issue generation calls for one credential.
///
/// `GeminiClient` is the production implementation; tests substitute
/// scripted fakes.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Single `generateContent` call. Failures carry the HTTP status when
    /// the service returned one.
    async fn generate_content(
        &self,
        model: &str,
        payload: &RequestPayload,
        params: &GenerationParameters,
    ) -> Result<GenerateContentResponse>;
}

/// Builds unvalidated client handles bound to a credential.
pub trait ClientFactory: Send + Sync {
    type Client: ContentGenerator + 'static;

    fn create(&self, credential: &Credential) -> Result<Self::Client>;
}

#[cfg(test)]
pub(crate) mod fake;
