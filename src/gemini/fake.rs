// Scripted in-memory generator for unit tests
// Author: kelexine (https://github.com/kelexine)

use super::{ClientFactory, ContentGenerator};
use crate::auth::Credential;
use crate::error::{Result, StudioError};
use crate::models::gemini::{Candidate, Content, Part};
use crate::models::{GenerateContentResponse, GenerationParameters, RequestPayload};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Ok(GenerateContentResponse),
    Err(Option<u16>, String),
}

impl Outcome {
    pub(crate) fn text(text: &str) -> Self {
        Outcome::Ok(response(vec![Part::text(text)]))
    }

    pub(crate) fn status(status: u16, message: &str) -> Self {
        Outcome::Err(Some(status), message.to_string())
    }
}

pub(crate) fn response(parts: Vec<Part>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: "model".to_string(),
                parts,
            }),
            finish_reason: Some("STOP".to_string()),
        }],
        ..Default::default()
    }
}

/// Shared script and call log behind every fake client.
pub(crate) struct FakeBackend {
    calls: AtomicUsize,
    created: AtomicUsize,
    queue: Mutex<VecDeque<Outcome>>,
    default: Mutex<Outcome>,
    delay: Mutex<Option<Duration>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    pub(crate) fn new(default: Outcome) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            queue: Mutex::new(VecDeque::new()),
            default: Mutex::new(default),
            delay: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Queue an outcome served before the default.
    pub(crate) fn push(&self, outcome: Outcome) {
        self.queue.lock().push_back(outcome);
    }

    pub(crate) fn set_default(&self, outcome: Outcome) {
        *self.default.lock() = outcome;
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// `(model, prompt)` of every call, in order.
    pub(crate) fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().clone()
    }
}

pub(crate) struct FakeFactory(pub(crate) Arc<FakeBackend>);

impl ClientFactory for FakeFactory {
    type Client = FakeClient;

    fn create(&self, _credential: &Credential) -> Result<FakeClient> {
        self.0.created.fetch_add(1, Ordering::SeqCst);
        Ok(FakeClient {
            backend: self.0.clone(),
        })
    }
}

pub(crate) struct FakeClient {
    backend: Arc<FakeBackend>,
}

#[async_trait]
impl ContentGenerator for FakeClient {
    async fn generate_content(
        &self,
        model: &str,
        payload: &RequestPayload,
        _params: &GenerationParameters,
    ) -> Result<GenerateContentResponse> {
        self.backend.calls.fetch_add(1, Ordering::SeqCst);
        self.backend
            .prompts
            .lock()
            .push((model.to_string(), payload.prompt().to_string()));

        let delay = *self.backend.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .backend
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.backend.default.lock().clone());

        match outcome {
            Outcome::Ok(response) => Ok(response),
            Outcome::Err(status, message) => Err(StudioError::api(status, message)),
        }
    }
}
