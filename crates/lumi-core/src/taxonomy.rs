//! # Emotion Taxonomy
//!
//! The nine journal emotion categories, their display labels and hues, and
//! the mapping from emotion-model labels onto them.
//!
//! Each category has a canonical key (`"Joy/Happy"`). The key is what the
//! zero-shot classifier sees as a candidate label, what calibration samples
//! are labeled with, and what a prediction reports as `raw_emotion`.

use serde::{Deserialize, Serialize};

/// An emotion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EmotionKey {
    Joy,
    Calm,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Anticipation,
    Neutral,
}

impl EmotionKey {
    /// All categories, in candidate-label order.
    pub const ALL: [Self; 9] = [
        Self::Joy,
        Self::Calm,
        Self::Sad,
        Self::Angry,
        Self::Fearful,
        Self::Disgusted,
        Self::Surprised,
        Self::Anticipation,
        Self::Neutral,
    ];

    /// Canonical key string.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Joy => "Joy/Happy",
            Self::Calm => "Calm/Relaxed",
            Self::Sad => "Sad/Depressed",
            Self::Angry => "Angry/Irritated",
            Self::Fearful => "Fearful/Anxious",
            Self::Disgusted => "Disgusted/Envious",
            Self::Surprised => "Surprised/Inspired",
            Self::Anticipation => "Anticipation/Optimistic",
            Self::Neutral => "Neutral/Mixed",
        }
    }

    /// Display label shown to the user.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Joy => "Joyful",
            Self::Calm => "Calm",
            Self::Sad => "Sad",
            Self::Angry => "Angry",
            Self::Fearful => "Anxious",
            Self::Disgusted => "Disgusted",
            Self::Surprised => "Inspired",
            Self::Anticipation => "Optimistic",
            Self::Neutral => "Neutral",
        }
    }

    /// Display hue in degrees. `Neutral` has no hue.
    #[must_use]
    pub const fn hue(self) -> Option<u16> {
        match self {
            Self::Joy => Some(60),
            Self::Calm => Some(120),
            Self::Sad => Some(240),
            Self::Angry => Some(0),
            Self::Fearful => Some(180),
            Self::Disgusted => Some(300),
            Self::Surprised => Some(30),
            Self::Anticipation => Some(90),
            Self::Neutral => None,
        }
    }

    /// Look up a category by its canonical key (exact match).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Map an emotion-model label onto a category.
    ///
    /// Matching is case-insensitive. Labels the model may emit that have no
    /// dedicated category (and any unknown label) land on `Neutral`.
    #[must_use]
    pub fn from_model_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "joy" | "love" => Self::Joy,
            "sadness" => Self::Sad,
            "anger" => Self::Angry,
            "fear" => Self::Fearful,
            "disgust" => Self::Disgusted,
            "surprise" => Self::Surprised,
            _ => Self::Neutral,
        }
    }

    /// Candidate labels for the zero-shot classifier.
    #[must_use]
    pub fn candidate_labels() -> Vec<String> {
        Self::ALL.iter().map(|k| k.key().to_string()).collect()
    }
}

impl std::fmt::Display for EmotionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl From<EmotionKey> for String {
    fn from(key: EmotionKey) -> Self {
        key.key().to_string()
    }
}

impl TryFrom<String> for EmotionKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_key(&value).ok_or_else(|| format!("unknown emotion key: {value}"))
    }
}

/// Hue for an arbitrary label string (zero-shot labels are free text).
#[must_use]
pub fn hue_for_label(label: &str) -> Option<u16> {
    EmotionKey::from_key(label).and_then(EmotionKey::hue)
}

/// Whether an emotion-model label receives the multi-label boost.
///
/// `joy`, `sadness` and `neutral` never do.
#[must_use]
pub fn is_promotable(model_label: &str) -> bool {
    !matches!(
        model_label.to_ascii_lowercase().as_str(),
        "joy" | "sadness" | "neutral"
    )
}

// =============================================================================
// TESTS
// =============================================================================
