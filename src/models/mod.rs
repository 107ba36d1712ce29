//! Data models for the Gemini API and the generation flow.
//!
//! - `gemini`: Wire types for the Generative Language `generateContent` call.
//! - `payload`: The ordered prompt-plus-images request payload.
//! - `params`: Per-request generation and retry parameters.

// Author: kelexine (https://github.com/kelexine)

pub mod gemini;
pub mod params;
pub mod payload;

pub use gemini::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
pub use params::GenerationParameters;
pub use payload::{PayloadPart, RequestPayload};
