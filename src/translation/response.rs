// Response classification (Gemini parts → text / image / unknown)
// Author: kelexine (https://github.com/kelexine)

use super::Warning;
use crate::models::gemini::{GenerateContentResponse, InlineData, Part as GeminiPart};
use crate::vision::{decode_image, DecodedImage};
use base64::Engine;
use tracing::{debug, warn};

/// One classified part of a generation response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    Text(String),
    InlineImage(DecodedImage),
    /// A part that is neither non-empty text nor a decodable image.
    Unknown,
}

/// Outcome of classifying a response. An empty response is a valid result,
/// not a failure of the remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// No candidates, or the first candidate has no parts.
    Empty,
    Content(ClassifiedResponse),
}

/// Parts of the first candidate, in response order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedResponse {
    pub parts: Vec<ResponsePart>,
    pub warnings: Vec<Warning>,
}

impl ClassifiedResponse {
    /// The retained image: the last successfully decoded image wins.
    pub fn last_image(&self) -> Option<&DecodedImage> {
        self.parts.iter().fold(None, |retained, part| match part {
            ResponsePart::InlineImage(image) => Some(image),
            _ => retained,
        })
    }

    /// All text parts joined by newlines.
    pub fn all_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn images(&self) -> impl Iterator<Item = &DecodedImage> {
        self.parts.iter().filter_map(|part| match part {
            ResponsePart::InlineImage(image) => Some(image),
            _ => None,
        })
    }
}

/// Classify the first candidate of a response.
pub fn classify(response: &GenerateContentResponse) -> ResponseOutcome {
    let Some(parts) = response.first_candidate_parts() else {
        debug!(
            "Empty response: {} candidates, finish_reason: {:?}",
            response.candidates.len(),
            response.candidates.first().and_then(|c| c.finish_reason.as_deref())
        );
        return ResponseOutcome::Empty;
    };

    let mut warnings = Vec::new();
    let parts = parts
        .iter()
        .enumerate()
        .map(|(index, part)| classify_part(index, part, &mut warnings))
        .collect();

    ResponseOutcome::Content(ClassifiedResponse { parts, warnings })
}

fn classify_part(index: usize, part: &GeminiPart, warnings: &mut Vec<Warning>) -> ResponsePart {
    let context = format!("Response part {}", index + 1);
    if let Some(text) = part.non_empty_text() {
        return ResponsePart::Text(text.to_string());
    }
    match &part.inline_data {
        Some(inline_data) => match decode_inline_image(inline_data) {
            Ok(image) => ResponsePart::InlineImage(image),
            Err(message) => {
                warn!("{}: malformed image data: {}", context, message);
                crate::metrics::record_image_decode_failure("response");
                warnings.push(Warning::new(context, format!("Malformed image data: {}", message)));
                ResponsePart::Unknown
            }
        },
        None => {
            warn!("{}: unknown content type", context);
            warnings.push(Warning::new(context, "Unknown content type in response"));
            ResponsePart::Unknown
        }
    }
}

fn decode_inline_image(inline_data: &InlineData) -> Result<DecodedImage, String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&inline_data.data)
        .map_err(|e| format!("invalid base64: {}", e))?;
    decode_image(bytes).map_err(|e| e.to_string())
}
