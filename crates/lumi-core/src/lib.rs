//! # lumi-core
//!
//! The deterministic decision engine for Lumi - THE LOGIC.
//!
//! This crate turns the outputs of two external classifiers (a fine-tuned
//! emotion model and a zero-shot model) into one colored emotion prediction
//! for a journal entry.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Never talks to a classifier; it receives their outputs as data
//! - Holds every probability as integer ppm, so decisions are exact
//! - Is synchronous and has NO network dependencies (pure Rust)
//! - Is stateless: thresholds are passed in, never mutated globally

// =============================================================================
// MODULES
// =============================================================================

pub mod calibration;
pub mod cascade;
pub mod primitives;
pub mod score;
pub mod summary;
pub mod taxonomy;
pub mod thresholds;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use score::Score;
pub use taxonomy::EmotionKey;
pub use thresholds::Thresholds;
pub use types::{
    Candidate, CandidateSource, LabelScore, LumiError, Method, ModelVersions, Prediction,
    ZeroShotOutput,
};

// =============================================================================
// RE-EXPORTS: Decision Engine
// =============================================================================

pub use calibration::{
    CalibrationSample, GridReport, GridResult, Observation, SAMPLE_TEXTS, ThresholdGrid,
    grid_search, load_samples,
};
pub use cascade::{Cascade, Pending, Step, entry_text};
pub use summary::summarize;
