//! Generation session.
//!
//! [`Studio`] runs one user action end to end: credential validation,
//! payload assembly, the retried generation call, and response
//! classification. It owns the session's [`PromptHistory`]; the client cache
//! behind it may be shared with other sessions.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod artifact;
pub mod history;

pub use artifact::DownloadArtifact;
pub use history::{PromptHistory, HISTORY_CAPACITY};

use crate::auth::{Credential, KeyValidator, ValidationResult};
use crate::cache::ClientCache;
use crate::error::{Result, StudioError};
use crate::gemini::{ClientFactory, ContentGenerator};
use crate::models::GenerationParameters;
use crate::translation::{assemble, classify, AssembledPayload, ResponseOutcome, ResponsePart, Warning};
use crate::utils::retry::{with_retry, RetryPolicy};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a successful generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The service answered without candidates or parts. Upload warnings
    /// are still reported.
    Empty { warnings: Vec<Warning> },
    Content(GeneratedContent),
}

impl GenerationOutcome {
    pub fn warnings(&self) -> &[Warning] {
        match self {
            GenerationOutcome::Empty { warnings } => warnings,
            GenerationOutcome::Content(content) => &content.warnings,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedContent {
    /// Classified parts in response order, for display.
    pub parts: Vec<ResponsePart>,
    /// Text parts joined by newlines.
    pub text: String,
    /// Upload warnings followed by response warnings.
    pub warnings: Vec<Warning>,
    /// Last decoded image of the response, if any.
    pub artifact: Option<DownloadArtifact>,
}

pub struct Studio<F: ClientFactory> {
    cache: Arc<ClientCache<F>>,
    validator: KeyValidator<F>,
    params: GenerationParameters,
    retry_policy: RetryPolicy,
    history: PromptHistory,
}

impl<F: ClientFactory> Studio<F> {
    pub fn new(cache: Arc<ClientCache<F>>, params: GenerationParameters) -> Self {
        Self {
            validator: KeyValidator::new(cache.clone()),
            retry_policy: RetryPolicy::from_params(&params),
            cache,
            params,
            history: PromptHistory::new(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn history(&self) -> &PromptHistory {
        &self.history
    }

    pub fn cache(&self) -> &Arc<ClientCache<F>> {
        &self.cache
    }

    pub async fn validate_key(&self, credential: &Credential) -> ValidationResult {
        self.validator.validate(credential).await
    }

    /// Generate content for `prompt` and up to two raw images.
    ///
    /// The credential is validated with one probe first; a rejected key
    /// aborts with [`StudioError::CredentialRejected`] and is never retried.
    /// The generation call runs under the session's retry policy. When the
    /// response carries an image, the last one becomes the download artifact
    /// and the prompt is recorded in the history.
    pub async fn generate<I, B>(
        &mut self,
        credential: &Credential,
        model: &str,
        prompt: &str,
        images: I,
    ) -> Result<GenerationOutcome>
    where
        I: IntoIterator<Item = Option<B>>,
        B: Into<Bytes>,
    {
        if credential.is_empty() {
            return Err(StudioError::InvalidRequest("An API key is required".to_string()));
        }

        let validation = self.validator.validate(credential).await;
        if !validation.is_valid() {
            return Err(StudioError::CredentialRejected(validation));
        }

        let client = self.cache.get_or_create(credential).await?;
        let AssembledPayload { payload, mut warnings } = assemble(prompt, images)?;

        info!(
            "Generating with model {} ({} images, key {})",
            model,
            payload.images().count(),
            credential.fingerprint()
        );

        let client = &*client;
        let payload = &payload;
        let params = &self.params;
        let response = with_retry("Generate content", &self.retry_policy, move || {
            client.generate_content(model, payload, params)
        })
        .await?;

        let classified = match classify(&response) {
            ResponseOutcome::Empty => {
                match response.block_reason() {
                    Some(reason) => info!("Model {} returned no content (blocked: {})", model, reason),
                    None => info!("Model {} returned no content", model),
                }
                return Ok(GenerationOutcome::Empty { warnings });
            }
            ResponseOutcome::Content(classified) => classified,
        };

        let artifact = classified.last_image().map(DownloadArtifact::from_image);
        if artifact.is_some() && self.history.record(prompt) {
            debug!("Prompt added to history ({} entries)", self.history.len());
        }

        let text = classified.all_text();
        warnings.extend(classified.warnings);

        Ok(GenerationOutcome::Content(GeneratedContent {
            parts: classified.parts,
            text,
            warnings,
            artifact,
        }))
    }
}
