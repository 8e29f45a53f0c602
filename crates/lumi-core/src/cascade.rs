//! # Decision Cascade
//!
//! Turns classifier outputs into one emotion decision.
//!
//! The cascade runs in two phases so the caller only pays for the zero-shot
//! classifier when the emotion model is not confident enough:
//!
//! ```text
//! begin(text, emotion scores)
//!   ├─ empty text ────────────────────────────────► Done(method = none)
//!   ├─ multi-label aggregate ≥ accept ────────────► Done(emotion-model-multi)
//!   ├─ top label ≥ confidence ────────────────────► Done(emotion-model)
//!   └─ otherwise ─────────────────────────────────► NeedsZeroShot(Pending)
//!
//! Pending::resolve(zero-shot output)
//!   ├─ max(zero-shot, model) < neutral fallback ──► fallback-neutral
//!   ├─ model score > zero-shot score ─────────────► emotion-model
//!   └─ otherwise ─────────────────────────────────► zero-shot
//! ```
//!
//! The cascade never fails: a classifier that errored is passed in as an
//! empty output and the cascade falls through to the next branch.

use crate::primitives::CANDIDATES_PER_SOURCE;
use crate::score::Score;
use crate::summary::summarize;
use crate::taxonomy::{EmotionKey, is_promotable};
use crate::thresholds::Thresholds;
use crate::types::{
    Candidate, CandidateSource, LabelScore, Method, ModelVersions, Prediction, ZeroShotOutput,
};

// =============================================================================
// CASCADE
// =============================================================================

/// The decision policy: thresholds plus the model identifiers it reports.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    thresholds: Thresholds,
    versions: ModelVersions,
}

/// Outcome of the first phase.
#[derive(Debug, Clone)]
pub enum Step {
    /// The emotion model (or empty input) decided.
    Done(Prediction),
    /// The zero-shot classifier must be consulted.
    NeedsZeroShot(Pending),
}

impl Cascade {
    /// Create a cascade.
    #[must_use]
    pub fn new(thresholds: Thresholds, versions: ModelVersions) -> Self {
        Self {
            thresholds,
            versions,
        }
    }

    /// The thresholds in use.
    #[must_use]
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The model identifiers reported in predictions.
    #[must_use]
    pub fn versions(&self) -> &ModelVersions {
        &self.versions
    }

    /// First phase: decide from the emotion classifier alone if possible.
    ///
    /// `emotion_scores` is the full label distribution; pass an empty slice
    /// when the classifier is unavailable.
    #[must_use]
    pub fn begin(&self, text: &str, emotion_scores: &[LabelScore]) -> Step {
        let text = text.trim();
        if text.is_empty() {
            return Step::Done(self.empty_prediction());
        }

        let scores = normalize(emotion_scores);
        let t = &self.thresholds;

        // Multi-label aggregation
        let mut mapped: Vec<(EmotionKey, Score)> = Vec::new();
        for (label, score) in scores.iter().filter(|(_, s)| *s >= t.multi_label) {
            let adjusted = if is_promotable(label) {
                score.saturating_add(t.promote_boost)
            } else {
                *score
            };
            let key = EmotionKey::from_model_label(label);
            match mapped.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = entry.1.max(adjusted),
                None => mapped.push((key, adjusted)),
            }
        }
        if let Some((key, best)) = first_max(&mapped)
            && best >= t.multi_label_accept()
        {
            let mut ranked = mapped.clone();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            let candidates = ranked
                .into_iter()
                .map(|(k, s)| Candidate::from_key(CandidateSource::EmotionModel, k, s))
                .collect();
            return Step::Done(self.prediction(
                key,
                best,
                Method::EmotionModelMulti,
                candidates,
            ));
        }

        // Single top label
        let top = first_max(&scores);
        let emotion_candidates = top_candidates(&scores);
        if let Some((label, score)) = &top
            && *score >= t.emotion_confidence
            && !label.is_empty()
        {
            let key = EmotionKey::from_model_label(label);
            return Step::Done(self.prediction(
                key,
                *score,
                Method::EmotionModel,
                emotion_candidates,
            ));
        }

        Step::NeedsZeroShot(Pending {
            cascade: self.clone(),
            text: text.to_string(),
            model_top: top,
            emotion_candidates,
        })
    }

    /// Run both phases with a synchronous zero-shot call.
    ///
    /// `zero_shot` is invoked at most once, with the trimmed text.
    pub fn decide<F>(&self, text: &str, emotion_scores: &[LabelScore], zero_shot: F) -> Prediction
    where
        F: FnOnce(&str) -> ZeroShotOutput,
    {
        match self.begin(text, emotion_scores) {
            Step::Done(prediction) => prediction,
            Step::NeedsZeroShot(pending) => {
                let output = zero_shot(pending.text());
                pending.resolve(&output)
            }
        }
    }

    /// Prediction for an entry with no text.
    #[must_use]
    pub fn empty_prediction(&self) -> Prediction {
        Prediction {
            emotion: EmotionKey::Neutral.label().to_string(),
            hue: None,
            confidence: "0%".to_string(),
            raw_emotion: None,
            method: Method::None,
            candidates: Vec::new(),
            summary: summarize(None, Score::ZERO, &[]),
            version: self.versions.clone(),
        }
    }

    fn prediction(
        &self,
        key: EmotionKey,
        score: Score,
        method: Method,
        candidates: Vec<Candidate>,
    ) -> Prediction {
        Prediction {
            emotion: key.label().to_string(),
            hue: key.hue(),
            confidence: score.percent_string(),
            raw_emotion: Some(key),
            method,
            summary: summarize(Some(key), score, &candidates),
            candidates,
            version: self.versions.clone(),
        }
    }
}

// =============================================================================
// PENDING (SECOND PHASE)
// =============================================================================

/// A decision waiting on the zero-shot classifier.
#[derive(Debug, Clone)]
pub struct Pending {
    cascade: Cascade,
    text: String,
    model_top: Option<(String, Score)>,
    emotion_candidates: Vec<Candidate>,
}

impl Pending {
    /// The trimmed text to send to the zero-shot classifier.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The emotion model's top label and score, if it produced any.
    #[must_use]
    pub fn model_top(&self) -> Option<(&str, Score)> {
        self.model_top.as_ref().map(|(l, s)| (l.as_str(), *s))
    }

    /// Second phase: combine with the zero-shot output.
    ///
    /// Pass [`ZeroShotOutput::empty`] if the zero-shot call failed.
    #[must_use]
    pub fn resolve(self, output: &ZeroShotOutput) -> Prediction {
        let thresholds = &self.cascade.thresholds;

        let (zs_label, zs_score) = output
            .top()
            .unwrap_or((EmotionKey::Neutral.key(), Score::ZERO));
        let model_score = self.model_top.as_ref().map_or(Score::ZERO, |(_, s)| *s);
        let best = zs_score.max(model_score);

        let zs_candidates: Vec<Candidate> = output
            .leading(CANDIDATES_PER_SOURCE)
            .map(|(l, s)| Candidate::from_label(CandidateSource::ZeroShot, l, s))
            .collect();

        if best < thresholds.neutral_fallback {
            return self.cascade.prediction(
                EmotionKey::Neutral,
                best,
                Method::FallbackNeutral,
                zs_candidates,
            );
        }

        let (key, score, method) = match &self.model_top {
            Some((label, score)) if *score > zs_score && !label.is_empty() => {
                (EmotionKey::from_model_label(label), *score, Method::EmotionModel)
            }
            _ => (
                EmotionKey::from_key(zs_label).unwrap_or(EmotionKey::Neutral),
                zs_score,
                Method::ZeroShot,
            ),
        };

        let mut candidates = self.emotion_candidates.clone();
        candidates.extend(zs_candidates);
        self.cascade.prediction(key, score, method, candidates)
    }
}

// =============================================================================
// ENTRY TEXT
// =============================================================================

/// Join the non-blank lines of a journal entry with single spaces.
///
/// Lines are kept as written; only the joined text is trimmed later.
#[must_use]
pub fn entry_text<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// HELPERS
// =============================================================================

/// Lower-case labels; a repeated label overwrites the earlier score in place.
fn normalize(scores: &[LabelScore]) -> Vec<(String, Score)> {
    let mut out: Vec<(String, Score)> = Vec::with_capacity(scores.len());
    for entry in scores {
        let label = entry.label.to_lowercase();
        match out.iter_mut().find(|(l, _)| *l == label) {
            Some(existing) => existing.1 = entry.score,
            None => out.push((label, entry.score)),
        }
    }
    out
}

/// Highest-scoring entry; ties go to the earliest.
fn first_max<K: Clone>(entries: &[(K, Score)]) -> Option<(K, Score)> {
    let mut best: Option<&(K, Score)> = None;
    for entry in entries {
        if best.is_none_or(|b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.cloned()
}

/// Top emotion-model labels, mapped to categories, with their raw scores.
fn top_candidates(scores: &[(String, Score)]) -> Vec<Candidate> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(CANDIDATES_PER_SOURCE)
        .map(|(label, score)| {
            Candidate::from_key(
                CandidateSource::EmotionModel,
                EmotionKey::from_model_label(&label),
                score,
            )
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
