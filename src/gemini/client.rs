// Gemini API client bound to one API key
// Author: kelexine (https://github.com/kelexine)

use super::{ClientFactory, ContentGenerator};
use crate::auth::Credential;
use crate::config::GeminiConfig;
use crate::error::{Result, StudioError};
use crate::models::gemini::ApiErrorResponse;
use crate::models::{GenerateContentResponse, GenerationParameters, RequestPayload};
use crate::translation::to_gemini_request;
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for the Google Gemini API.
///
/// Each instance is bound to exactly one credential and never changes after
/// construction. Whether the credential works is decided by the caller's
/// probe, not here.
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    credential: Credential,
}

impl GeminiClient {
    /// Create a client with an HTTP connection pool configured from `config`.
    pub fn new(config: &GeminiConfig, credential: Credential) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| StudioError::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created HTTP client for key {}", credential.fingerprint());

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(model)
        )
    }

    /// Extract error message from API response JSON
    fn extract_error_message(response_text: &str) -> Option<String> {
        let parsed: ApiErrorResponse = serde_json::from_str(response_text).ok()?;
        let error = parsed.error?;
        match (error.status, error.message) {
            (Some(status), Some(message)) => Some(format!("{}: {}", status, message)),
            (status, message) => message.or(status),
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        payload: &RequestPayload,
        params: &GenerationParameters,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);
        let request = to_gemini_request(payload, params);
        let request_id = uuid::Uuid::new_v4().simple().to_string();

        debug!(
            "Calling generateContent for model {} (request {}, {} parts)",
            model,
            request_id,
            payload.len()
        );

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", self.credential.expose())
            .header("x-request-id", &request_id)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                crate::metrics::record_gemini_call(model, 0, start.elapsed().as_secs_f64());
                StudioError::api(e.status().map(|s| s.as_u16()), format!("HTTP error: {}", e))
            })?;

        let status = response.status();
        crate::metrics::record_gemini_call(model, status.as_u16(), start.elapsed().as_secs_f64());

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&error_text)
            );
            let message = Self::extract_error_message(&error_text).unwrap_or(error_text);
            return Err(StudioError::api(Some(status.as_u16()), sanitize(&message)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| StudioError::api(None, format!("Failed to read response body: {}", e)))?;

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            response_text.chars().take(500).collect::<String>()
        );

        let gemini_response: GenerateContentResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            StudioError::Json(e)
        })?;

        if let Some(usage) = &gemini_response.usage_metadata {
            crate::metrics::record_tokens(
                model,
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0),
            );
        }

        debug!("Received Gemini response for request {}", request_id);
        Ok(gemini_response)
    }
}

/// Creates [`GeminiClient`]s sharing one endpoint configuration.
#[derive(Debug, Clone)]
pub struct GeminiClientFactory {
    config: GeminiConfig,
}

impl GeminiClientFactory {
    pub fn new(config: GeminiConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GeminiClientFactory {
    type Client = GeminiClient;

    fn create(&self, credential: &Credential) -> Result<GeminiClient> {
        GeminiClient::new(&self.config, credential.clone())
    }
}
