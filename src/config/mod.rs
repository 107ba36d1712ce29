// Configuration module
// Author: kelexine (https://github.com/kelexine)

pub mod catalog;
mod models;

pub use catalog::Catalog;
pub use models::*;

use crate::error::{Result, StudioError};
use config::{Config, Environment, File};
use std::path::PathBuf;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest, prefix `GEMSTUDIO__`)
    /// 2. Config file (`~/.gemstudio/config.toml`)
    /// 3. Defaults (lowest)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Same as [`AppConfig::load`] with an explicit config file path.
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::with_name(path).required(false))
            // Override with environment variables, e.g. GEMSTUDIO__CACHE__TTL_SECONDS
            .add_source(
                Environment::with_prefix("GEMSTUDIO")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| StudioError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| StudioError::Config(e.to_string()))?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Enforce parameter ranges the core relies on.
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        if self.cache.ttl_seconds == 0 {
            return Err(StudioError::Config("cache.ttl_seconds must be positive".to_string()));
        }
        if self.gemini.api_base_url.trim().is_empty() {
            return Err(StudioError::Config("gemini.api_base_url must not be empty".to_string()));
        }
        Ok(())
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemstudio")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.generation.top_k, 40);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[generation]\ntemperature = 0.3\nmax_retries = 5\n\n[cache]\nttl_seconds = 60\n",
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.generation.temperature, 0.3);
        assert_eq!(config.generation.max_retries, 5);
        assert_eq!(config.generation.top_p, 0.95);
        assert_eq!(config.cache.ttl_seconds, 60);
    }

    #[test]
    fn test_out_of_range_file_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[generation]\ntop_k = 100\n").unwrap();

        let result = AppConfig::load_from(path.to_str().unwrap());
        assert!(matches!(result, Err(StudioError::Config(_))));
    }
}
