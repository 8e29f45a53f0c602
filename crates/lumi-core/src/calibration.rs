//! # Calibration
//!
//! Built-in demonstration texts and a threshold grid search over labeled
//! samples.
//!
//! Classifier outputs do not depend on the cascade thresholds, so each
//! sample is classified once (an [`Observation`]) and the recorded outputs
//! are replayed through the cascade for every grid configuration.

use crate::cascade::Cascade;
use crate::primitives::MAX_CALIBRATION_SAMPLES;
use crate::score::{PPM, Score};
use crate::thresholds::Thresholds;
use crate::types::{LabelScore, LumiError, ModelVersions, ZeroShotOutput};
use serde::{Deserialize, Serialize};

/// Texts analyzed by the `calibrate_sample` endpoint and `samples` command.
pub const SAMPLE_TEXTS: [&str; 6] = [
    "My dog died",
    "I got a promotion",
    "I'm anxious about exams",
    "This is disgusting",
    "Wow, that's amazing!",
    "I'm looking forward to tomorrow",
];

// =============================================================================
// SAMPLES
// =============================================================================

/// A labeled text. `label` is a category key such as `"Sad/Depressed"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub text: String,
    pub label: String,
}

/// Parse a JSON array of labeled samples.
pub fn load_samples(bytes: &[u8]) -> Result<Vec<CalibrationSample>, LumiError> {
    let samples: Vec<CalibrationSample> = serde_json::from_slice(bytes)
        .map_err(|e| LumiError::SerializationError(format!("Calibration samples: {}", e)))?;

    if samples.is_empty() {
        return Err(LumiError::EmptySampleSet);
    }
    if samples.len() > MAX_CALIBRATION_SAMPLES {
        return Err(LumiError::InvalidInput(format!(
            "Sample count {} exceeds maximum {}",
            samples.len(),
            MAX_CALIBRATION_SAMPLES
        )));
    }
    Ok(samples)
}

/// A sample together with the classifier outputs recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub text: String,
    pub label: String,
    pub emotion_scores: Vec<LabelScore>,
    pub zero_shot: ZeroShotOutput,
}

// =============================================================================
// GRID
// =============================================================================

/// Values to sweep. Parameters not listed come from the base thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    pub emotion_confidence: Vec<Score>,
    pub multi_label: Vec<Score>,
    pub promote_boost: Vec<Score>,
}

impl Default for ThresholdGrid {
    fn default() -> Self {
        let ppm = |values: &[u32]| -> Vec<Score> { values.iter().map(|v| Score::from_ppm(*v)).collect() };
        Self {
            emotion_confidence: ppm(&[300_000, 350_000, 400_000, 450_000, 500_000]),
            multi_label: ppm(&[150_000, 200_000, 250_000]),
            promote_boost: ppm(&[0, 20_000, 40_000]),
        }
    }
}

impl ThresholdGrid {
    /// Every configuration, confidence outermost and boost innermost.
    #[must_use]
    pub fn configurations(&self, base: Thresholds) -> Vec<Thresholds> {
        let mut out = Vec::with_capacity(
            self.emotion_confidence.len() * self.multi_label.len() * self.promote_boost.len(),
        );
        for &confidence in &self.emotion_confidence {
            for &multi in &self.multi_label {
                for &boost in &self.promote_boost {
                    out.push(
                        base.with_emotion_confidence(confidence)
                            .with_multi_label(multi)
                            .with_promote_boost(boost),
                    );
                }
            }
        }
        out
    }
}

/// Accuracy of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridResult {
    pub thresholds: Thresholds,
    pub correct: usize,
    pub total: usize,
}

impl GridResult {
    /// `correct / total` as a score.
    #[must_use]
    pub fn accuracy(&self) -> Score {
        if self.total == 0 {
            return Score::ZERO;
        }
        let ppm = (self.correct as u64) * u64::from(PPM) / (self.total as u64);
        Score::from_ppm(ppm as u32)
    }
}

/// All configurations in sweep order, plus the winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridReport {
    pub results: Vec<GridResult>,
    pub best: GridResult,
}

/// Score every grid configuration against the observations.
///
/// A prediction is correct when its `raw_emotion` key equals the sample
/// label. The best configuration is the first one with strictly higher
/// accuracy than every earlier one.
pub fn grid_search(
    observations: &[Observation],
    grid: &ThresholdGrid,
    base: Thresholds,
    versions: &ModelVersions,
) -> Result<GridReport, LumiError> {
    if observations.is_empty() {
        return Err(LumiError::EmptySampleSet);
    }

    let mut results = Vec::new();
    let mut best: Option<GridResult> = None;

    for thresholds in grid.configurations(base) {
        let result = score_configuration(observations, thresholds, versions);
        if best.is_none_or(|b| result.correct > b.correct) {
            best = Some(result);
        }
        results.push(result);
    }

    let best = best.ok_or_else(|| LumiError::InvalidInput("Threshold grid is empty".to_string()))?;
    Ok(GridReport { results, best })
}

/// Replay the observations through one configuration.
#[must_use]
pub fn score_configuration(
    observations: &[Observation],
    thresholds: Thresholds,
    versions: &ModelVersions,
) -> GridResult {
    let cascade = Cascade::new(thresholds, versions.clone());
    let correct = observations
        .iter()
        .filter(|obs| {
            let prediction =
                cascade.decide(&obs.text, &obs.emotion_scores, |_| obs.zero_shot.clone());
            prediction
                .raw_emotion
                .is_some_and(|key| key.key() == obs.label)
        })
        .count();

    GridResult {
        thresholds,
        correct,
        total: observations.len(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
