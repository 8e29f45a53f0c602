//! # Inference Module
//!
//! The seam between Lumi and the two classifier pipelines.
//!
//! - [`EmotionClassifier`]: fine-tuned text classifier, all label scores
//! - [`ZeroShotClassifier`]: NLI zero-shot classifier over candidate labels
//!
//! Both are black boxes behind async traits. The default implementation is
//! [`InferenceClient`], which calls a hosted inference endpoint. Tests plug in
//! stubs.
//!
//! [`Pipelines`] builds each classifier lazily on first use. A classifier
//! that cannot be built or fails a call is logged and treated as having
//! returned nothing, so the cascade falls through to its next branch.

mod client;

pub use client::InferenceClient;

use crate::config::ModelsConfig;
use async_trait::async_trait;
use lumi_core::{LabelScore, ModelVersions, ZeroShotOutput};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from a classifier call.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Cannot reach the inference endpoint.
    #[error("Cannot connect to inference endpoint at {0}")]
    ConnectionFailed(String),

    /// 401/403 - invalid or missing token.
    #[error("Unauthorized: invalid or missing inference token")]
    Unauthorized,

    /// 429 Too Many Requests.
    #[error("Rate limited by inference endpoint")]
    RateLimited,

    /// The call did not finish in time.
    #[error("Inference request timed out")]
    Timeout,

    /// The endpoint returned a non-success status.
    #[error("Inference error ({0}): {1}")]
    ServerError(u16, String),

    /// The response body did not match the pipeline contract.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The classifier could not be constructed.
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// CLASSIFIER TRAITS
// =============================================================================

/// Text classifier returning a score for every label it knows.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Model identifier.
    fn model_id(&self) -> &str;

    /// Classify `text`, returning all label scores.
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// Zero-shot classifier choosing among caller-supplied labels.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Model identifier.
    fn model_id(&self) -> &str;

    /// Classify `text` against `candidate_labels` (single-label mode).
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, ClassifierError>;
}

// =============================================================================
// LAZY PIPELINES
// =============================================================================

/// Builds a classifier.
pub type Factory<T> = Box<dyn Fn() -> Result<Arc<T>, ClassifierError> + Send + Sync>;

/// A classifier built on first use.
struct Lazy<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
    factory: Factory<T>,
}

impl<T: ?Sized + Send + Sync + 'static> Lazy<T> {
    fn new(factory: Factory<T>) -> Self {
        Self {
            cell: OnceCell::new(),
            factory,
        }
    }

    fn ready(value: Arc<T>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::clone(&value))),
            factory: Box::new(move || Ok(Arc::clone(&value))),
        }
    }

    /// Build on first call. A failed build is retried on the next call.
    async fn get(&self) -> Result<&Arc<T>, ClassifierError> {
        self.cell
            .get_or_try_init(|| async { (self.factory)() })
            .await
    }

    fn loaded(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }
}

/// The two classifier pipelines.
pub struct Pipelines {
    emotion: Lazy<dyn EmotionClassifier>,
    zero_shot: Lazy<dyn ZeroShotClassifier>,
    /// Model ids reported while a classifier is not built yet.
    configured: ModelVersions,
}

impl Pipelines {
    /// Lazily built [`InferenceClient`]s for both models.
    #[must_use]
    pub fn from_config(config: &ModelsConfig) -> Self {
        let configured = config.versions();
        let emotion_cfg = config.clone();
        let zero_shot_cfg = config.clone();
        Self {
            emotion: Lazy::new(Box::new(move || {
                tracing::info!("Initializing emotion classifier: {}", emotion_cfg.emotion_model);
                let client = InferenceClient::new(
                    &emotion_cfg.inference_url,
                    &emotion_cfg.emotion_model,
                    emotion_cfg.api_token.clone(),
                    emotion_cfg.timeout(),
                )?;
                Ok(Arc::new(client) as Arc<dyn EmotionClassifier>)
            })),
            zero_shot: Lazy::new(Box::new(move || {
                tracing::info!(
                    "Initializing zero-shot classifier: {}",
                    zero_shot_cfg.zero_shot_model
                );
                let client = InferenceClient::new(
                    &zero_shot_cfg.inference_url,
                    &zero_shot_cfg.zero_shot_model,
                    zero_shot_cfg.api_token.clone(),
                    zero_shot_cfg.timeout(),
                )?;
                Ok(Arc::new(client) as Arc<dyn ZeroShotClassifier>)
            })),
            configured,
        }
    }

    /// Pipelines from already-built classifiers.
    #[must_use]
    pub fn with_classifiers(
        emotion: Arc<dyn EmotionClassifier>,
        zero_shot: Arc<dyn ZeroShotClassifier>,
    ) -> Self {
        let configured = ModelVersions {
            emotion_model: emotion.model_id().to_string(),
            zero_shot: zero_shot.model_id().to_string(),
        };
        Self {
            emotion: Lazy::ready(emotion),
            zero_shot: Lazy::ready(zero_shot),
            configured,
        }
    }

    /// Pipelines from custom factories, each run at most once successfully.
    ///
    /// `configured` names the models until each factory has run.
    #[must_use]
    pub fn with_factories(
        emotion: Factory<dyn EmotionClassifier>,
        zero_shot: Factory<dyn ZeroShotClassifier>,
        configured: ModelVersions,
    ) -> Self {
        Self {
            emotion: Lazy::new(emotion),
            zero_shot: Lazy::new(zero_shot),
            configured,
        }
    }

    /// Whether the (emotion, zero-shot) classifiers have been built.
    #[must_use]
    pub fn loaded(&self) -> (bool, bool) {
        (
            self.emotion.loaded().is_some(),
            self.zero_shot.loaded().is_some(),
        )
    }

    /// Model ids for the prediction `version` block.
    ///
    /// A built classifier reports its own `model_id()`; one not built yet is
    /// reported by its configured id.
    #[must_use]
    pub fn versions(&self) -> ModelVersions {
        ModelVersions {
            emotion_model: self.emotion.loaded().map_or_else(
                || self.configured.emotion_model.clone(),
                |c| c.model_id().to_string(),
            ),
            zero_shot: self.zero_shot.loaded().map_or_else(
                || self.configured.zero_shot.clone(),
                |c| c.model_id().to_string(),
            ),
        }
    }

    /// Emotion scores for `text`; empty if the classifier is unavailable.
    pub async fn emotion_scores(&self, text: &str) -> Vec<LabelScore> {
        let result = match self.emotion.get().await {
            Ok(classifier) => classifier.classify(text).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(
                event = "classifier_failure",
                pipeline = "emotion",
                "Emotion classifier failed: {}",
                e
            );
            Vec::new()
        })
    }

    /// Zero-shot output for `text`; empty if the classifier is unavailable.
    pub async fn zero_shot(&self, text: &str, candidate_labels: &[String]) -> ZeroShotOutput {
        let result = match self.zero_shot.get().await {
            Ok(classifier) => classifier.classify(text, candidate_labels).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(
                event = "classifier_failure",
                pipeline = "zero_shot",
                "Zero-shot classifier failed: {}",
                e
            );
            ZeroShotOutput::empty()
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
