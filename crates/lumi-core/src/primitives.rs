//! # Primitives
//!
//! Compiled-in constants for the Lumi core: default cascade parameters,
//! default model identifiers and request limits.
//!
//! Probabilities are in parts-per-million (see [`crate::score`]).

/// Minimum top-label score for the emotion model to decide alone (0.45).
pub const EMOTION_CONFIDENCE_THRESHOLD_PPM: u32 = 450_000;

/// Below this, neither classifier is trusted and the entry is neutral (0.22).
pub const NEUTRAL_FALLBACK_THRESHOLD_PPM: u32 = 220_000;

/// Minimum score for a label to take part in multi-label aggregation (0.20).
pub const MULTI_LABEL_THRESHOLD_PPM: u32 = 200_000;

/// Boost added to promotable labels during aggregation (0.04).
pub const PROMOTE_LABEL_BOOST_PPM: u32 = 40_000;

/// Fraction of the confidence threshold an aggregated label must reach (0.75).
pub const MULTI_LABEL_ACCEPT_FACTOR_PPM: u32 = 750_000;

/// Number of runner-up labels reported per classifier.
pub const CANDIDATES_PER_SOURCE: usize = 3;

/// Default fine-tuned emotion classifier.
pub const DEFAULT_EMOTION_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";

/// Default zero-shot classifier.
pub const DEFAULT_ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";

/// Maximum number of lines in one journal entry.
pub const MAX_LINES: usize = 64;

/// Maximum text length, in bytes, of one journal entry.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Maximum number of texts in one calibration batch.
pub const MAX_BATCH_TEXTS: usize = 256;

/// Maximum number of labeled samples accepted by a grid search.
pub const MAX_CALIBRATION_SAMPLES: usize = 10_000;
