//! # Core Type Definitions
//!
//! This module contains the data that crosses the core boundary:
//! - Classifier outputs (`LabelScore`, `ZeroShotOutput`)
//! - The prediction returned to clients (`Prediction`, `Candidate`, `Method`)
//! - Model identifiers (`ModelVersions`)
//! - Error types (`LumiError`)
//!
//! Classifier output types deserialize directly from the JSON the hosted
//! pipelines return, so the binary can hand them to the cascade untouched.

use crate::score::Score;
use crate::taxonomy::{EmotionKey, hue_for_label};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CLASSIFIER OUTPUTS
// =============================================================================

/// One label/score pair from the emotion classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: Score,
}

impl LabelScore {
    /// Create a new label score.
    #[must_use]
    pub fn new(label: impl Into<String>, score: Score) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Output of the zero-shot classifier.
///
/// `labels[i]` pairs with `scores[i]`; labels are sorted by score, highest
/// first. Extra fields in the pipeline response (`sequence`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZeroShotOutput {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub scores: Vec<Score>,
}

impl ZeroShotOutput {
    /// An output with no labels (classifier unavailable or failed).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The top label and its score, if any.
    #[must_use]
    pub fn top(&self) -> Option<(&str, Score)> {
        let label = self.labels.first()?;
        let score = self.scores.first().copied().unwrap_or_default();
        Some((label.as_str(), score))
    }

    /// Up to `n` leading label/score pairs.
    pub fn leading(&self, n: usize) -> impl Iterator<Item = (&str, Score)> {
        self.labels
            .iter()
            .zip(self.scores.iter().copied())
            .take(n)
            .map(|(l, s)| (l.as_str(), s))
    }
}

// =============================================================================
// PREDICTION
// =============================================================================

/// Which branch of the cascade produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Empty input; nothing was classified.
    None,
    /// Several emotion-model labels cleared the multi-label threshold.
    EmotionModelMulti,
    /// The emotion model's top label decided.
    EmotionModel,
    /// The zero-shot classifier decided.
    ZeroShot,
    /// Neither classifier was confident; reported as neutral.
    FallbackNeutral,
}

impl Method {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::EmotionModelMulti => "emotion-model-multi",
            Self::EmotionModel => "emotion-model",
            Self::ZeroShot => "zero-shot",
            Self::FallbackNeutral => "fallback-neutral",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which classifier a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    EmotionModel,
    ZeroShot,
}

impl CandidateSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmotionModel => "emotion-model",
            Self::ZeroShot => "zero-shot",
        }
    }
}

/// A runner-up shown next to the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub source: CandidateSource,
    pub label: String,
    pub hue: Option<u16>,
    pub score: Score,
}

impl Candidate {
    /// Candidate for a category (emotion-model side).
    #[must_use]
    pub fn from_key(source: CandidateSource, key: EmotionKey, score: Score) -> Self {
        Self {
            source,
            label: key.key().to_string(),
            hue: key.hue(),
            score,
        }
    }

    /// Candidate for a free-text label (zero-shot side).
    #[must_use]
    pub fn from_label(source: CandidateSource, label: &str, score: Score) -> Self {
        Self {
            source,
            label: label.to_string(),
            hue: hue_for_label(label),
            score,
        }
    }
}

/// Identifiers of the models behind a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersions {
    pub emotion_model: String,
    pub zero_shot: String,
}

impl Default for ModelVersions {
    fn default() -> Self {
        Self {
            emotion_model: crate::primitives::DEFAULT_EMOTION_MODEL.to_string(),
            zero_shot: crate::primitives::DEFAULT_ZERO_SHOT_MODEL.to_string(),
        }
    }
}

/// The structured prediction returned for a journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Display label of the chosen category.
    pub emotion: String,
    /// Display hue; `None` renders as a neutral grey.
    pub hue: Option<u16>,
    /// Confidence as a one-decimal percentage string.
    pub confidence: String,
    /// Canonical key of the chosen category. Absent for empty input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_emotion: Option<EmotionKey>,
    pub method: Method,
    pub candidates: Vec<Candidate>,
    /// Short second-person summary.
    pub summary: String,
    pub version: ModelVersions,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Lumi core.
///
/// The cascade itself is infallible. Errors come from configuration and
/// calibration input.
#[derive(Debug, Error)]
pub enum LumiError {
    /// A threshold is outside `[0, 1]`.
    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: String },

    /// Calibration was asked to score zero samples.
    #[error("Calibration sample set is empty")]
    EmptySampleSet,

    /// Request input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
