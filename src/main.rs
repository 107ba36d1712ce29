// gemstudio - Gemini text and image generation with validated, cached clients
// Author: kelexine (https://github.com/kelexine)

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::Parser;
use gemstudio::auth::Credential;
use gemstudio::cache::{CacheConfig, ClientCache};
use gemstudio::cli::{Args, Command};
use gemstudio::config::{AppConfig, Catalog};
use gemstudio::gemini::{ClientFactory, GeminiClientFactory};
use gemstudio::metrics::gather_metrics;
use gemstudio::session::{GenerationOutcome, Studio};
use gemstudio::translation::ResponsePart;
use gemstudio::utils::logging::{self, sanitize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();
    args.validate()?;

    // Phase 1: Load configuration
    let config = match &args.config {
        Some(path) => AppConfig::load_from(&path.to_string_lossy())?,
        None => AppConfig::load()?,
    };

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting gemstudio v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Catalog and credential
    let catalog = Catalog::load(&config.catalog.dir);
    let credential = Credential::new(args.api_key.clone().unwrap_or_default());
    if credential.is_empty() {
        bail!("An API key is required: pass --api-key or set GEMINI_API_KEY");
    }

    // Phase 4: Build the client cache and session
    let cache = Arc::new(ClientCache::new(
        GeminiClientFactory::new(config.gemini.clone()),
        CacheConfig::new(config.cache.ttl_seconds, config.gemini.probe_model.clone()),
    ));
    let mut studio = Studio::new(cache, config.generation.clone());
    let model = args.resolve_model(&catalog, &config.gemini.default_model);

    // Phase 5: Run
    if args.validate_only {
        let result = studio.validate_key(&credential).await;
        println!("{}", result);
        print_metrics(&args);
        if !result.is_valid() {
            bail!("API key validation failed");
        }
        return Ok(());
    }

    let images = read_images(&args.images).await?;

    if args.interactive {
        run_interactive(&mut studio, &credential, &model, &images, &args.output_dir).await?;
    } else {
        let Some(prompt) = args.resolve_prompt(&catalog)? else {
            bail!("Provide --prompt, --example or --interactive");
        };
        generate_and_render(&mut studio, &credential, &model, &prompt, &images, &args.output_dir).await?;
    }

    print_metrics(&args);
    Ok(())
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<Option<Bytes>>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        images.push(Some(Bytes::from(data)));
    }
    Ok(images)
}

async fn generate_and_render<F: ClientFactory>(
    studio: &mut Studio<F>,
    credential: &Credential,
    model: &str,
    prompt: &str,
    images: &[Option<Bytes>],
    output_dir: &Path,
) -> Result<()> {
    let outcome = studio
        .generate(credential, model, prompt, images.iter().cloned())
        .await?;

    for warning in outcome.warnings() {
        eprintln!("Warning: {}", warning);
    }

    match outcome {
        GenerationOutcome::Empty { .. } => {
            println!("No content was returned by the model.");
        }
        GenerationOutcome::Content(content) => {
            for part in &content.parts {
                match part {
                    ResponsePart::Text(text) => println!("{}", text),
                    ResponsePart::InlineImage(image) => println!(
                        "[image {}x{} {}, {} bytes]",
                        image.width,
                        image.height,
                        image.mime_type(),
                        image.len()
                    ),
                    ResponsePart::Unknown => println!("[unsupported part]"),
                }
            }
            if let Some(artifact) = content.artifact {
                let path = artifact.write_to(output_dir).await?;
                println!("Saved {}", path.display());
            }
        }
    }
    Ok(())
}

async fn run_interactive<F: ClientFactory>(
    studio: &mut Studio<F>,
    credential: &Credential,
    model: &str,
    images: &[Option<Bytes>],
    output_dir: &Path,
) -> Result<()> {
    println!("Enter a prompt per line. :history lists recent prompts, :N reuses one, :q quits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let prompt = match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::ShowHistory => {
                if studio.history().is_empty() {
                    println!("(no history yet)");
                }
                for (i, entry) in studio.history().entries().enumerate() {
                    println!("{:>2}: {}", i + 1, entry);
                }
                continue;
            }
            Command::Reselect(n) => match n.checked_sub(1).and_then(|i| studio.history().get(i)) {
                Some(prompt) => prompt.to_string(),
                None => {
                    eprintln!("No history entry {}", n);
                    continue;
                }
            },
            Command::Prompt(prompt) => prompt,
        };

        // Failures end this request only.
        if let Err(e) = generate_and_render(studio, credential, model, &prompt, images, output_dir).await {
            let message = sanitize(&format!("{:#}", e));
            error!("Generation failed: {}", message);
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

fn print_metrics(args: &Args) {
    if args.metrics {
        print!("{}", gather_metrics());
    }
}
