//! # Configuration
//!
//! Layered configuration: defaults, then an optional TOML file, then
//! environment variables.
//!
//! ```toml
//! [models]
//! emotion_model = "j-hartmann/emotion-english-distilroberta-base"
//! zero_shot_model = "facebook/bart-large-mnli"
//! inference_url = "https://api-inference.huggingface.co"
//! timeout_secs = 30
//!
//! [thresholds]
//! emotion_confidence = 0.45
//! multi_label = 0.20
//! ```
//!
//! ## Environment Variables
//!
//! - `EMOTION_MODEL`: emotion classifier model id
//! - `LUMI_ZERO_SHOT_MODEL`: zero-shot classifier model id
//! - `LUMI_INFERENCE_URL`: base URL of the inference endpoint
//! - `LUMI_HF_TOKEN` (or `HF_TOKEN`): bearer token for the inference endpoint
//! - `LUMI_TIMEOUT_SECS`: per-request classifier timeout

use lumi_core::primitives::{DEFAULT_EMOTION_MODEL, DEFAULT_ZERO_SHOT_MODEL};
use lumi_core::{LumiError, ModelVersions, Thresholds};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default inference endpoint.
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Default classifier request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum configuration file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// CONFIG STRUCTURES
// =============================================================================

/// Where the classifier pipelines live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelsConfig {
    pub emotion_model: String,
    pub zero_shot_model: String,
    pub inference_url: String,
    /// Never written back out.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            emotion_model: DEFAULT_EMOTION_MODEL.to_string(),
            zero_shot_model: DEFAULT_ZERO_SHOT_MODEL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ModelsConfig {
    /// Model identifiers reported in predictions.
    #[must_use]
    pub fn versions(&self) -> ModelVersions {
        ModelVersions {
            emotion_model: self.emotion_model.clone(),
            zero_shot: self.zero_shot_model.clone(),
        }
    }

    /// Classifier request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Full Lumi configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LumiConfig {
    pub models: ModelsConfig,
    pub thresholds: Thresholds,
}

// =============================================================================
// LOADING
// =============================================================================

impl LumiConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, LumiError> {
        toml::from_str(s).map_err(|e| LumiError::ConfigError(e.to_string()))
    }

    /// Load configuration: defaults, then `path` (if given), then the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, LumiError> {
        let mut config = match path {
            Some(p) => {
                let metadata = std::fs::metadata(p).map_err(|e| {
                    LumiError::IoError(format!("Cannot read config '{}': {}", p.display(), e))
                })?;
                if metadata.len() > MAX_CONFIG_FILE_SIZE {
                    return Err(LumiError::ConfigError(format!(
                        "Config file size {} bytes exceeds maximum {} bytes",
                        metadata.len(),
                        MAX_CONFIG_FILE_SIZE
                    )));
                }
                let contents = std::fs::read_to_string(p).map_err(|e| {
                    LumiError::IoError(format!("Cannot read config '{}': {}", p.display(), e))
                })?;
                tracing::info!("Loaded configuration from {}", p.display());
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` returns the value of a variable; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = get("EMOTION_MODEL") {
            self.models.emotion_model = model;
        }
        if let Some(model) = get("LUMI_ZERO_SHOT_MODEL") {
            self.models.zero_shot_model = model;
        }
        if let Some(url) = get("LUMI_INFERENCE_URL") {
            self.models.inference_url = url;
        }
        if let Some(token) = get("LUMI_HF_TOKEN").or_else(|| get("HF_TOKEN")) {
            self.models.api_token = Some(token);
        }
        if let Some(secs) = get("LUMI_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.models.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid LUMI_TIMEOUT_SECS '{}'", secs),
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
