// gemstudio - Gemini text and image generation with validated, cached clients
// Author: kelexine (https://github.com/kelexine)

pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;
pub mod session;
pub mod translation;
pub mod utils;
pub mod vision;
