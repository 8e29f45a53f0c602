//! # Analyzer
//!
//! Drives the two-phase cascade against the live classifier pipelines.

use crate::config::LumiConfig;
use crate::inference::Pipelines;
use lumi_core::{
    CalibrationSample, Cascade, EmotionKey, Observation, Prediction, Step, entry_text,
};

/// Classifier pipelines plus the decision policy.
pub struct Analyzer {
    pipelines: Pipelines,
    cascade: Cascade,
    candidate_labels: Vec<String>,
}

impl Analyzer {
    /// Create an analyzer.
    #[must_use]
    pub fn new(pipelines: Pipelines, cascade: Cascade) -> Self {
        Self {
            pipelines,
            cascade,
            candidate_labels: EmotionKey::candidate_labels(),
        }
    }

    /// Analyzer backed by lazily built inference clients.
    #[must_use]
    pub fn from_config(config: &LumiConfig) -> Self {
        Self::new(
            Pipelines::from_config(&config.models),
            Cascade::new(config.thresholds, config.models.versions()),
        )
    }

    /// The decision policy in use.
    #[must_use]
    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    /// The classifier pipelines.
    #[must_use]
    pub fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }

    /// Analyze one text.
    ///
    /// Empty text is answered without touching either classifier. The
    /// zero-shot classifier is only called when the emotion model is unsure.
    /// `version` names the models the pipelines actually run.
    pub async fn analyze_text(&self, text: &str) -> Prediction {
        let text = text.trim();
        if text.is_empty() {
            let mut prediction = self.cascade.empty_prediction();
            prediction.version = self.pipelines.versions();
            return prediction;
        }

        let scores = self.pipelines.emotion_scores(text).await;
        let mut prediction = match self.cascade.begin(text, &scores) {
            Step::Done(prediction) => prediction,
            Step::NeedsZeroShot(pending) => {
                tracing::debug!("Emotion model unsure, consulting zero-shot classifier");
                let output = self
                    .pipelines
                    .zero_shot(pending.text(), &self.candidate_labels)
                    .await;
                pending.resolve(&output)
            }
        };
        prediction.version = self.pipelines.versions();

        tracing::debug!(
            event = "analysis",
            method = %prediction.method,
            raw_emotion = ?prediction.raw_emotion.map(|k| k.key()),
            confidence = %prediction.confidence,
            "Analysis complete"
        );
        prediction
    }

    /// Analyze a journal entry given as lines; blank lines are skipped.
    pub async fn analyze_lines<S: AsRef<str>>(&self, lines: &[S]) -> Prediction {
        self.analyze_text(&entry_text(lines)).await
    }

    /// Record both classifiers' outputs for a labeled sample.
    pub async fn observe(&self, sample: &CalibrationSample) -> Observation {
        let text = sample.text.trim();
        let emotion_scores = self.pipelines.emotion_scores(text).await;
        let zero_shot = self.pipelines.zero_shot(text, &self.candidate_labels).await;
        Observation {
            text: sample.text.clone(),
            label: sample.label.clone(),
            emotion_scores,
            zero_shot,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ClassifierError, EmotionClassifier, ZeroShotClassifier};
    use async_trait::async_trait;
    use lumi_core::{LabelScore, ModelVersions, Score, Thresholds, ZeroShotOutput};
    use std::sync::Arc;

    struct Sad;

    #[async_trait]
    impl EmotionClassifier for Sad {
        fn model_id(&self) -> &str {
            "local/sad"
        }

        async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
            Ok(vec![LabelScore::new("sadness", Score::from_ppm(900_000))])
        }
    }

    struct Silent;

    #[async_trait]
    impl ZeroShotClassifier for Silent {
        fn model_id(&self) -> &str {
            "local/nli"
        }

        async fn classify(
            &self,
            _text: &str,
            _candidate_labels: &[String],
        ) -> Result<ZeroShotOutput, ClassifierError> {
            Ok(ZeroShotOutput::empty())
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(
            Pipelines::with_classifiers(Arc::new(Sad), Arc::new(Silent)),
            Cascade::new(Thresholds::default(), ModelVersions::default()),
        )
    }

    #[tokio::test]
    async fn version_names_the_running_models() {
        let prediction = analyzer().analyze_text("My dog died").await;
        assert_eq!(prediction.version.emotion_model, "local/sad");
        assert_eq!(prediction.version.zero_shot, "local/nli");
    }

    #[tokio::test]
    async fn empty_text_reports_running_models() {
        let prediction = analyzer().analyze_text("   ").await;
        assert_eq!(prediction.version.emotion_model, "local/sad");
        assert_eq!(prediction.version.zero_shot, "local/nli");
    }
}
