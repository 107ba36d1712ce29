// CLI module for gemstudio
// Author: kelexine (https://github.com/kelexine)

use crate::config::Catalog;
use crate::error::{Result, StudioError};
use crate::translation::MAX_INPUT_IMAGES;
use clap::Parser;
use std::path::PathBuf;

/// gemstudio - generate text and images with Gemini from a prompt and up to two images
#[derive(Parser, Debug)]
#[command(name = "gemstudio", version, about, long_about = None)]
pub struct Args {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Text prompt
    #[arg(short, long, conflicts_with = "example")]
    pub prompt: Option<String>,

    /// Use example prompt N from the catalog (1-based)
    #[arg(short, long)]
    pub example: Option<usize>,

    /// Input image, at most two
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Model name (defaults to the first catalog model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory for generated_image.png
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Read prompts from stdin, one per line
    #[arg(short, long)]
    pub interactive: bool,

    /// Only validate the API key
    #[arg(long)]
    pub validate_only: bool,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    pub metrics: bool,

    /// Config file (defaults to ~/.gemstudio/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Check constraints clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.images.len() > MAX_INPUT_IMAGES {
            return Err(StudioError::InvalidRequest(format!(
                "At most {} images can be attached, got {}",
                MAX_INPUT_IMAGES,
                self.images.len()
            )));
        }
        Ok(())
    }

    /// Prompt from `--prompt` or `--example`, if either was given.
    pub fn resolve_prompt(&self, catalog: &Catalog) -> Result<Option<String>> {
        if let Some(prompt) = &self.prompt {
            return Ok(Some(prompt.clone()));
        }
        match self.example {
            None => Ok(None),
            Some(n) => n
                .checked_sub(1)
                .and_then(|index| catalog.prompts.get(index))
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    StudioError::InvalidRequest(format!(
                        "Example {} does not exist ({} available)",
                        n,
                        catalog.prompts.len()
                    ))
                }),
        }
    }

    /// Model from `--model`, else the first catalog model, else `fallback`.
    pub fn resolve_model(&self, catalog: &Catalog, fallback: &str) -> String {
        self.model
            .clone()
            .or_else(|| catalog.default_model().map(str::to_string))
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// A line read in interactive mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prompt(String),
    /// `:history`
    ShowHistory,
    /// `:N`, 1-based
    Reselect(usize),
    /// `:quit` or `:q`
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Command::Empty,
            ":history" | ":h" => Command::ShowHistory,
            ":quit" | ":q" => Command::Quit,
            _ => match line.strip_prefix(':').and_then(|n| n.parse::<usize>().ok()) {
                Some(n) => Command::Reselect(n),
                None => Command::Prompt(line.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_example_conflict() {
        assert!(Args::try_parse_from(["gemstudio", "--prompt", "x", "--example", "1"]).is_err());
    }

    #[test]
    fn test_more_than_two_images_rejected() {
        let args = Args::try_parse_from(["gemstudio", "-p", "x", "--image", "a.png", "--image", "b.png", "--image", "c.png"])
            .unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["gemstudio", "-p", "x", "--image", "a.png", "--image", "b.png"]).unwrap();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_resolve_example_is_one_based() {
        let catalog = Catalog {
            models: vec!["m1".to_string()],
            prompts: vec!["first".to_string(), "second".to_string()],
        };
        let args = Args::try_parse_from(["gemstudio", "--example", "2"]).unwrap();
        assert_eq!(args.resolve_prompt(&catalog).unwrap(), Some("second".to_string()));
        assert_eq!(args.resolve_model(&catalog, "fallback"), "m1");

        let args = Args::try_parse_from(["gemstudio", "--example", "0"]).unwrap();
        assert!(args.resolve_prompt(&catalog).is_err());
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("  a red fox  "), Command::Prompt("a red fox".to_string()));
        assert_eq!(Command::parse(":history"), Command::ShowHistory);
        assert_eq!(Command::parse(":3"), Command::Reselect(3));
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse(":what"), Command::Prompt(":what".to_string()));
    }
}
