// Request payload assembled from a prompt and uploaded images
// Author: kelexine (https://github.com/kelexine)

use crate::vision::DecodedImage;

/// One element of a request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadPart {
    Text(String),
    Image(DecodedImage),
}

/// Ordered request parts. The first part is always the text prompt, even
/// when it is empty; decoded images follow in upload order.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPayload {
    parts: Vec<PayloadPart>,
}

impl RequestPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            parts: vec![PayloadPart::Text(text.into())],
        }
    }

    pub fn push_image(&mut self, image: DecodedImage) {
        self.parts.push(PayloadPart::Image(image));
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn prompt(&self) -> &str {
        match self.parts.first() {
            Some(PayloadPart::Text(text)) => text,
            _ => "",
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &DecodedImage> {
        self.parts.iter().filter_map(|part| match part {
            PayloadPart::Image(image) => Some(image),
            PayloadPart::Text(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
