//! Configuration for bookatlas runs.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GOOGLE_MAPS_API_KEY, OPENAI_API_KEY, BOOKATLAS_*)
//! 2. Config file (.bookatlas/config.yaml)
//! 3. Defaults
//!
//! Config file discovery searches the current directory and parents for
//! .bookatlas/config.yaml. The resolved value is loaded once by the CLI and
//! threaded explicitly through every component call; there is no hidden
//! process-global settings object.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub extraction: Option<ExtractionConfig>,
    #[serde(default)]
    pub review: Option<ReviewConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    pub window_chars: Option<usize>,
    pub overlap_chars: Option<usize>,
    pub max_mentions: Option<usize>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    pub enabled: Option<bool>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub generate_map: Option<bool>,
}

/// Engine tunables threaded through every pipeline call.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Window size for segmentation, in bytes
    pub window_chars: usize,

    /// Overlap between consecutive windows
    pub overlap_chars: usize,

    /// Global cap on collected mentions and emitted places
    pub max_mentions: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window_chars: 5000,
            overlap_chars: 400,
            max_mentions: 500,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub google_maps_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub engine: EngineSettings,
    pub extraction_model: String,
    pub review_enabled: bool,
    pub review_model: String,
    pub generate_map: bool,
    /// Path to the config file, if one was found
    pub config_file: Option<PathBuf>,
}

/// Configuration errors: fatal, raised before any oracle call is attempted.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("GOOGLE_MAPS_API_KEY is required for geocoding. Set it in your environment.")]
    MissingGeocodeKey,

    #[error("OPENAI_API_KEY is required for LLM extraction and review. Set it in your environment.")]
    MissingOpenAiKey,
}

impl ResolvedConfig {
    pub fn ensure_geocode_key(&self) -> Result<&str, ConfigError> {
        self.google_maps_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingGeocodeKey)
    }

    pub fn ensure_openai_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingOpenAiKey)
    }
}

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".bookatlas").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| v.to_lowercase() == "true")
}

/// Load configuration from all sources
pub fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let file = match config_file.as_deref() {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    Ok(resolve_config(file, config_file))
}

/// Apply precedence: environment > config file > defaults.
fn resolve_config(file: Option<ConfigFile>, config_path: Option<PathBuf>) -> ResolvedConfig {
    let extraction = file.as_ref().and_then(|f| f.extraction.clone()).unwrap_or_default();
    let review = file.as_ref().and_then(|f| f.review.clone()).unwrap_or_default();
    let output = file.as_ref().and_then(|f| f.output.clone()).unwrap_or_default();

    let defaults = EngineSettings::default();
    let engine = EngineSettings {
        window_chars: env_usize("BOOKATLAS_WINDOW_CHARS")
            .or(extraction.window_chars)
            .unwrap_or(defaults.window_chars),
        overlap_chars: env_usize("BOOKATLAS_OVERLAP_CHARS")
            .or(extraction.overlap_chars)
            .unwrap_or(defaults.overlap_chars),
        max_mentions: env_usize("BOOKATLAS_MAX_MENTIONS")
            .or(extraction.max_mentions)
            .unwrap_or(defaults.max_mentions),
    };

    ResolvedConfig {
        google_maps_api_key: std::env::var("GOOGLE_MAPS_API_KEY").ok(),
        openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
        engine,
        extraction_model: extraction.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        review_enabled: env_bool("BOOKATLAS_REVIEW")
            .or(review.enabled)
            .unwrap_or(true),
        review_model: review.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        generate_map: env_bool("BOOKATLAS_GENERATE_MAP")
            .or(output.generate_map)
            .unwrap_or(true),
        config_file: config_path,
    }
}
