//! # Thresholds
//!
//! Tunable parameters of the decision cascade.
//!
//! Thresholds are plain values handed to the cascade. The calibration grid
//! search builds one per configuration instead of mutating shared state.

use crate::primitives::{
    EMOTION_CONFIDENCE_THRESHOLD_PPM, MULTI_LABEL_ACCEPT_FACTOR_PPM, MULTI_LABEL_THRESHOLD_PPM,
    NEUTRAL_FALLBACK_THRESHOLD_PPM, PROMOTE_LABEL_BOOST_PPM,
};
use crate::score::Score;
use crate::types::LumiError;
use serde::{Deserialize, Serialize};

/// Cascade parameters.
///
/// Serialized as probabilities, e.g. `emotion_confidence = 0.45`. Missing
/// fields take their defaults; values outside `[0, 1]` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct Thresholds {
    /// Minimum top-label score for the emotion model to decide alone.
    pub emotion_confidence: Score,
    /// Below this (on both classifiers) the entry is reported as neutral.
    pub neutral_fallback: Score,
    /// Minimum score for a label to enter multi-label aggregation.
    pub multi_label: Score,
    /// Added to promotable labels during aggregation.
    pub promote_boost: Score,
    /// Aggregated labels must reach `emotion_confidence * multi_label_accept_factor`.
    pub multi_label_accept_factor: Score,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            emotion_confidence: Score::from_ppm(EMOTION_CONFIDENCE_THRESHOLD_PPM),
            neutral_fallback: Score::from_ppm(NEUTRAL_FALLBACK_THRESHOLD_PPM),
            multi_label: Score::from_ppm(MULTI_LABEL_THRESHOLD_PPM),
            promote_boost: Score::from_ppm(PROMOTE_LABEL_BOOST_PPM),
            multi_label_accept_factor: Score::from_ppm(MULTI_LABEL_ACCEPT_FACTOR_PPM),
        }
    }
}

impl Thresholds {
    /// Score an aggregated multi-label decision must reach.
    #[must_use]
    pub fn multi_label_accept(&self) -> Score {
        self.emotion_confidence
            .scaled(self.multi_label_accept_factor)
    }

    /// Reject a zero multi-label accept factor.
    ///
    /// The `[0, 1]` range of each parameter is enforced when thresholds are
    /// deserialized; `from_ppm` values are clamped on construction.
    pub fn validate(&self) -> Result<(), LumiError> {
        if self.multi_label_accept_factor == Score::ZERO {
            return Err(LumiError::InvalidThreshold {
                name: "multi_label_accept_factor",
                value: self.multi_label_accept_factor.percent_string(),
            });
        }
        Ok(())
    }

    /// Copy with a different confidence threshold.
    #[must_use]
    pub fn with_emotion_confidence(mut self, value: Score) -> Self {
        self.emotion_confidence = value;
        self
    }

    /// Copy with a different multi-label threshold.
    #[must_use]
    pub fn with_multi_label(mut self, value: Score) -> Self {
        self.multi_label = value;
        self
    }

    /// Copy with a different promotion boost.
    #[must_use]
    pub fn with_promote_boost(mut self, value: Score) -> Self {
        self.promote_boost = value;
        self
    }
}

// =============================================================================
// DESERIALIZATION
// =============================================================================

/// Thresholds as written in configuration: optional probabilities.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawThresholds {
    emotion_confidence: Option<f64>,
    neutral_fallback: Option<f64>,
    multi_label: Option<f64>,
    promote_boost: Option<f64>,
    multi_label_accept_factor: Option<f64>,
}

/// Convert a configured probability, rejecting values outside `[0, 1]`.
fn probability(name: &'static str, value: Option<f64>, default: Score) -> Result<Score, LumiError> {
    match value {
        None => Ok(default),
        Some(p) if (0.0..=1.0).contains(&p) => Ok(Score::from_probability(p)),
        Some(p) => Err(LumiError::InvalidThreshold {
            name,
            value: p.to_string(),
        }),
    }
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = LumiError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        let d = Self::default();
        let thresholds = Self {
            emotion_confidence: probability(
                "emotion_confidence",
                raw.emotion_confidence,
                d.emotion_confidence,
            )?,
            neutral_fallback: probability("neutral_fallback", raw.neutral_fallback, d.neutral_fallback)?,
            multi_label: probability("multi_label", raw.multi_label, d.multi_label)?,
            promote_boost: probability("promote_boost", raw.promote_boost, d.promote_boost)?,
            multi_label_accept_factor: probability(
                "multi_label_accept_factor",
                raw.multi_label_accept_factor,
                d.multi_label_accept_factor,
            )?,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }
}

// =============================================================================
// TESTS
// =============================================================================
