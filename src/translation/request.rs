// Request assembly (prompt + uploaded images → Gemini request)
// Author: kelexine (https://github.com/kelexine)

use super::Warning;
use crate::error::{Result, StudioError};
use crate::models::gemini::{Content, GenerateContentRequest, Part as GeminiPart};
use crate::models::params::GenerationParameters;
use crate::models::payload::{PayloadPart, RequestPayload};
use crate::vision::decode_image;
use base64::Engine;
use bytes::Bytes;
use tracing::{debug, warn};

/// Upload slots available next to the text prompt.
pub const MAX_INPUT_IMAGES: usize = 2;

/// Result of assembling a payload: the payload plus one warning per image
/// that was skipped.
#[derive(Debug, Clone)]
pub struct AssembledPayload {
    pub payload: RequestPayload,
    pub warnings: Vec<Warning>,
}

/// Build the ordered request payload from a prompt and up to two uploads.
///
/// The prompt is always the first part, even when empty. Each present
/// buffer is decoded; a buffer that fails to decode is skipped with a
/// warning and leaves no placeholder. `None` entries are empty upload slots.
pub fn assemble<I, B>(text: &str, raw_images: I) -> Result<AssembledPayload>
where
    I: IntoIterator<Item = Option<B>>,
    B: Into<Bytes>,
{
    let slots: Vec<Option<Bytes>> = raw_images.into_iter().map(|slot| slot.map(Into::into)).collect();
    if slots.len() > MAX_INPUT_IMAGES {
        return Err(StudioError::InvalidRequest(format!(
            "At most {} images can be attached, got {}",
            MAX_INPUT_IMAGES,
            slots.len()
        )));
    }

    let mut payload = RequestPayload::new(text);
    let mut warnings = Vec::new();

    for (slot, raw) in slots.into_iter().enumerate() {
        let Some(raw) = raw else {
            continue;
        };
        match decode_image(raw) {
            Ok(image) => payload.push_image(image),
            Err(e) => {
                warn!("Skipping image {}: {}", slot + 1, e);
                crate::metrics::record_image_decode_failure("upload");
                warnings.push(Warning::new(format!("Image {}", slot + 1), e.to_string()));
            }
        }
    }

    debug!(
        "Assembled payload: {} parts, {} images skipped",
        payload.len(),
        warnings.len()
    );

    Ok(AssembledPayload { payload, warnings })
}

/// Translate a payload into the wire request for a single user turn.
pub fn to_gemini_request(payload: &RequestPayload, params: &GenerationParameters) -> GenerateContentRequest {
    let parts = payload
        .parts()
        .iter()
        .map(|part| match part {
            PayloadPart::Text(text) => GeminiPart::text(text.clone()),
            PayloadPart::Image(image) => GeminiPart::inline_data(
                image.mime_type(),
                base64::engine::general_purpose::STANDARD.encode(&image.data),
            ),
        })
        .collect();

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config: Some(params.to_generation_config()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::decode::tests::{encoded, png_bytes};
    use crate::vision::ImageFormat;

    #[test]
    fn test_corrupt_image_dropped_with_warning() {
        let assembled = assemble("hello", [Some(png_bytes()), Some(b"corrupt".to_vec())]).unwrap();

        let parts = assembled.payload.parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], PayloadPart::Text("hello".to_string()));
        assert!(matches!(&parts[1], PayloadPart::Image(img) if img.format == ImageFormat::Png));

        assert_eq!(assembled.warnings.len(), 1);
        assert_eq!(assembled.warnings[0].context, "Image 2");
    }

    #[test]
    fn test_empty_prompt_still_first() {
        let assembled = assemble("", Vec::<Option<Vec<u8>>>::new()).unwrap();
        assert_eq!(assembled.payload.parts(), &[PayloadPart::Text(String::new())]);
        assert!(assembled.warnings.is_empty());
    }

    #[test]
    fn test_upload_order_preserved_and_absent_slots_skipped() {
        let jpeg = encoded(2, 2, image::ImageFormat::Jpeg);
        let png = png_bytes();

        let assembled = assemble("p", [Some(jpeg), Some(png)]).unwrap();
        let formats: Vec<_> = assembled.payload.images().map(|i| i.format).collect();
        assert_eq!(formats, vec![ImageFormat::Jpeg, ImageFormat::Png]);

        let assembled = assemble("p", [None, Some(png_bytes())]).unwrap();
        assert_eq!(assembled.payload.len(), 2);
        assert!(assembled.warnings.is_empty());
    }

    #[test]
    fn test_failed_first_image_leaves_no_placeholder() {
        let assembled = assemble("p", [Some(vec![0u8; 16]), Some(png_bytes())]).unwrap();
        assert_eq!(assembled.payload.len(), 2);
        assert!(matches!(assembled.payload.parts()[1], PayloadPart::Image(_)));
        assert_eq!(assembled.warnings[0].context, "Image 1");
    }

    #[test]
    fn test_more_than_two_images_rejected() {
        let result = assemble("p", [Some(png_bytes()), Some(png_bytes()), Some(png_bytes())]);
        assert!(matches!(result, Err(StudioError::InvalidRequest(_))));
    }

    #[test]
    fn test_wire_request_inlines_base64_images() {
        let assembled = assemble("describe", [Some(png_bytes())]).unwrap();
        let request = to_gemini_request(&assembled.payload, &GenerationParameters::default());

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");

        let data = parts[1]["inlineData"]["data"].as_str().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD.decode(data).unwrap();
        assert_eq!(decoded, png_bytes());
        assert_eq!(json["generationConfig"]["responseModalities"][1], "IMAGE");
    }
}
