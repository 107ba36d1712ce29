// Model and example prompt catalog (JSON files with fallback defaults)
// Author: kelexine (https://github.com/kelexine)

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const MODELS_FILE: &str = "models.json";
pub const PROMPTS_FILE: &str = "prompts.json";

/// Models offered when `models.json` is missing or malformed.
pub const FALLBACK_MODELS: [&str; 2] = ["gemini-2.0-flash-exp", "gemini-1.5-pro-001"];

/// Example prompts offered when `prompts.json` is missing or malformed.
pub const FALLBACK_PROMPTS: [&str; 4] = [
    "Combine both images into a futuristic cityscape.",
    "Create a painting in the style of Van Gogh, inspired by both images.",
    "Generate a logo that captures the essence of both images.",
    "Write a short story about the two images.",
];

#[derive(Debug, Deserialize)]
struct ModelsFile {
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PromptsFile {
    #[serde(default)]
    prompts: Vec<String>,
}

/// Selectable models and example prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub models: Vec<String>,
    pub prompts: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            prompts: FALLBACK_PROMPTS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Catalog {
    /// Load `models.json` and `prompts.json` from `dir`.
    ///
    /// Each file falls back to its built-in list independently. A file that
    /// parses but lacks its key yields an empty list.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let fallback = Self::default();

        let models = read_json::<ModelsFile>(&dir.join(MODELS_FILE))
            .map(|f| f.models)
            .unwrap_or(fallback.models);
        let prompts = read_json::<PromptsFile>(&dir.join(PROMPTS_FILE))
            .map(|f| f.prompts)
            .unwrap_or(fallback.prompts);

        debug!("Catalog loaded: {} models, {} prompts", models.len(), prompts.len());
        Self { models, prompts }
    }

    /// First configured model, if any.
    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Catalog file {} not readable ({}), using defaults", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Malformed JSON in {} ({}), using defaults", path.display(), e);
            None
        }
    }
}
