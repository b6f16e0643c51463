//! Command-line interface for bookatlas.
//!
//! Provides commands for running the extraction pipeline over a book,
//! inspecting previous results, and printing the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{GoogleGeocoder, OpenAiExtractor, OpenAiJudge};
use crate::config::load_config;
use crate::core::GeoPipeline;
use crate::ingest::load_text;
use crate::lang::resolve_language;
use crate::output::write_outputs;

/// bookatlas - extract and geocode places from books
#[derive(Parser, Debug)]
#[command(name = "bookatlas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the extraction pipeline over a book
    Run {
        /// Path to a UTF-8 .txt book
        path: PathBuf,

        /// Directory to store outputs
        #[arg(short, long, default_value = "outputs")]
        output_dir: PathBuf,

        /// Language code (en|es). Auto-detected if omitted
        #[arg(short, long)]
        lang: Option<String>,

        /// Limit characters for quick runs
        #[arg(long)]
        limit_chars: Option<usize>,

        /// Skip the outlier review pass
        #[arg(long)]
        no_review: bool,

        /// Skip map generation
        #[arg(long)]
        no_map: bool,
    },

    /// Summarize a real_places.json produced by a previous run
    Inspect {
        /// Path to real_places.json
        path: PathBuf,

        /// Maximum number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                path,
                output_dir,
                lang,
                limit_chars,
                no_review,
                no_map,
            } => run_book(&path, &output_dir, lang.as_deref(), limit_chars, no_review, no_map).await,
            Commands::Inspect { path, limit } => inspect(&path, limit),
            Commands::Config => show_config(),
        }
    }
}

async fn run_book(
    path: &Path,
    output_dir: &Path,
    lang: Option<&str>,
    limit_chars: Option<usize>,
    no_review: bool,
    no_map: bool,
) -> Result<()> {
    let config = load_config()?;

    let text = load_text(path, limit_chars)?;
    let language = resolve_language(&text, lang)?;

    // Credentials are checked before any oracle call is attempted
    let geocode_key = config.ensure_geocode_key()?.to_string();
    let openai_key = config.ensure_openai_key()?.to_string();

    let max_items = config.engine.max_mentions.clamp(5, 30);
    let extractor =
        OpenAiExtractor::with_model(openai_key.clone(), config.extraction_model.clone(), max_items);
    let geocoder = GoogleGeocoder::new(geocode_key);
    let judge = (config.review_enabled && !no_review)
        .then(|| OpenAiJudge::with_model(openai_key, config.review_model.clone()));

    let mut pipeline = GeoPipeline::new(&extractor, &geocoder);
    if let Some(ref judge) = judge {
        pipeline = pipeline.with_judge(judge);
    }

    let outcome = pipeline.run(&text, &language, &config.engine).await?;
    write_outputs(&outcome, output_dir, config.generate_map && !no_map)?;

    println!(
        "Processed {} real places and {} fictional entries ({} flagged for review).",
        outcome.real_places.len(),
        outcome.fictional_places.len(),
        outcome.outliers.len(),
    );
    println!("Outputs written to {}", output_dir.display());

    Ok(())
}

fn inspect(path: &Path, limit: usize) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(&content).context("Expected a JSON array of places")?;

    println!("Found {} real places:", entries.len());
    for entry in entries.iter().take(limit) {
        println!(
            "- {} -> {} ({})",
            entry["original_name"].as_str().unwrap_or("?"),
            entry["normalized_name"].as_str().unwrap_or("?"),
            entry["confidence"].as_str().unwrap_or("?"),
        );
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let config = load_config()?;

    println!("Resolved configuration:");
    match &config.config_file {
        Some(path) => println!("  config file:     {}", path.display()),
        None => println!("  config file:     (none found)"),
    }
    println!("  window_chars:    {}", config.engine.window_chars);
    println!("  overlap_chars:   {}", config.engine.overlap_chars);
    println!("  max_mentions:    {}", config.engine.max_mentions);
    println!("  extraction:      {}", config.extraction_model);
    println!("  review:          {} ({})", config.review_enabled, config.review_model);
    println!("  generate_map:    {}", config.generate_map);
    println!("  geocode key:     {}", key_status(config.ensure_geocode_key().is_ok()));
    println!("  openai key:      {}", key_status(config.ensure_openai_key().is_ok()));

    Ok(())
}

fn key_status(present: bool) -> &'static str {
    if present {
        "set"
    } else {
        "not set"
    }
}
