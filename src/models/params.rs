//! Per-request generation parameters.
//!
//! Values arrive already loaded by the configuration layer; `validate` is the
//! single place the documented ranges are enforced.

// Author: kelexine (https://github.com/kelexine)

use crate::error::{Result, StudioError};
use crate::models::gemini::{GenerationConfig, RESPONSE_MODALITIES};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling and retry settings for one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Sampling temperature in `[0, 1]`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling mass in `[0, 1]`.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k cutoff in `[1, 40]`.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Output token cap in `[1, 2048]`.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Total attempts for the generation call, at least 1.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base in seconds, strictly positive.
    #[serde(default = "default_base_wait_time")]
    pub base_wait_time: f64,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            max_retries: default_max_retries(),
            base_wait_time: default_base_wait_time(),
        }
    }
}

impl GenerationParameters {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(StudioError::Config(format!(
                "temperature {} outside [0, 1]",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(StudioError::Config(format!("top_p {} outside [0, 1]", self.top_p)));
        }
        if !(1..=40).contains(&self.top_k) {
            return Err(StudioError::Config(format!("top_k {} outside [1, 40]", self.top_k)));
        }
        if !(1..=2048).contains(&self.max_output_tokens) {
            return Err(StudioError::Config(format!(
                "max_output_tokens {} outside [1, 2048]",
                self.max_output_tokens
            )));
        }
        if self.max_retries < 1 {
            return Err(StudioError::Config("max_retries must be at least 1".to_string()));
        }
        if !(self.base_wait_time.is_finite() && self.base_wait_time > 0.0) {
            return Err(StudioError::Config(format!(
                "base_wait_time {} must be positive",
                self.base_wait_time
            )));
        }
        Ok(())
    }

    /// Backoff base as a `Duration`. Out-of-range values fall back to the
    /// default of one second; `validate` reports them.
    pub fn base_wait(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_wait_time)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_base_wait_time()))
    }

    /// Wire-level generation config, always asking for text and image output.
    pub fn to_generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            max_output_tokens: Some(self.max_output_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            top_k: Some(self.top_k),
            response_modalities: Some(RESPONSE_MODALITIES.iter().map(|m| m.to_string()).collect()),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_wait_time() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = GenerationParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_retries, 3);
        assert_eq!(params.base_wait(), Duration::from_secs(1));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let cases = [
            GenerationParameters { temperature: 1.5, ..Default::default() },
            GenerationParameters { top_p: -0.1, ..Default::default() },
            GenerationParameters { top_k: 0, ..Default::default() },
            GenerationParameters { top_k: 41, ..Default::default() },
            GenerationParameters { max_output_tokens: 4096, ..Default::default() },
            GenerationParameters { max_retries: 0, ..Default::default() },
            GenerationParameters { base_wait_time: 0.0, ..Default::default() },
            GenerationParameters { base_wait_time: f64::NAN, ..Default::default() },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "{:?} should be rejected", params);
        }
    }

    #[test]
    fn test_generation_config_requests_both_modalities() {
        let config = GenerationParameters::default().to_generation_config();
        assert_eq!(
            config.response_modalities.unwrap(),
            vec!["TEXT".to_string(), "IMAGE".to_string()]
        );
        assert_eq!(config.max_output_tokens, Some(1024));
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let params: GenerationParameters =
            serde_json::from_str(r#"{"temperature": 0.2, "max_retries": 5}"#).unwrap();
        assert_eq!(params.temperature, 0.2);
        assert_eq!(params.max_retries, 5);
        assert_eq!(params.top_k, 40);
    }
}
