// Gemini Generative Language API type definitions
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response modalities requested for every call: the service may answer with
/// text, images, or both.
pub const RESPONSE_MODALITIES: [&str; 2] = ["TEXT", "IMAGE"];

/// Gemini generate content request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns. This client always sends a single user turn.
    pub contents: Vec<Content>,

    /// Generation parameters (temperature, max tokens, etc.).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content in a turn (user or model)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default = "default_role")]
    pub role: String, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<Part>,
}

fn default_role() -> String {
    "model".to_string()
}

/// One part of a turn.
///
/// The service may set several fields on the same part (for example an empty
/// `text` next to `inlineData`), so every field is optional. Fields this
/// client does not model (function calls, executable code) land in `other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Default::default()
        }
    }

    /// Text of the part, if present and not empty.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

/// Inline binary payload, base64 encoded on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

/// Gemini response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, or `None` when there is no candidate
    /// or the candidate carries no parts.
    pub fn first_candidate_parts(&self) -> Option<&[Part]> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            None
        } else {
            Some(&content.parts)
        }
    }

    /// Why the prompt was blocked, when the service says so.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Response candidate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

/// Error envelope returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_fields_deserialization() {
        let parts: Vec<Part> = serde_json::from_str(
            r#"[
                {"text": "hello"},
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                {"functionCall": {"name": "f", "args": {}}},
                {"text": "", "inlineData": {"mimeType": "image/jpeg", "data": "BBBB"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(parts[0].non_empty_text(), Some("hello"));
        assert_eq!(parts[1].inline_data.as_ref().unwrap().mime_type, "image/png");
        assert!(parts[2].text.is_none() && parts[2].inline_data.is_none());
        assert!(parts[2].other.contains_key("functionCall"));
        assert_eq!(parts[3].text.as_deref(), Some(""));
        assert_eq!(parts[3].non_empty_text(), None);
        assert_eq!(parts[3].inline_data.as_ref().unwrap().data, "BBBB");
    }

    #[test]
    fn test_part_serializes_only_set_fields() {
        let json = serde_json::to_value(Part::inline_data("image/png", "AAAA")).unwrap();
        assert_eq!(json, serde_json::json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}}));

        let json = serde_json::to_value(Part::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi"}));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::text("hi")],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(16),
                top_k: Some(40),
                response_modalities: Some(vec!["TEXT".to_string()]),
                ..Default::default()
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 16);
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_first_candidate_parts_empty_conditions() {
        let no_candidates: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(no_candidates.first_candidate_parts().is_none());

        let no_parts: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"role": "model"}}]}"#).unwrap();
        assert!(no_parts.first_candidate_parts().is_none());

        let no_content: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(no_content.first_candidate_parts().is_none());
        assert_eq!(no_content.block_reason(), None);

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(blocked.first_candidate_parts().is_none());
        assert_eq!(blocked.block_reason(), Some("SAFETY"));
    }
}
