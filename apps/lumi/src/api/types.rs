//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Predictions are
//! returned as [`lumi_core::Prediction`] directly.

use lumi_core::{
    LumiError, Prediction,
    primitives::{MAX_BATCH_TEXTS, MAX_LINES, MAX_TEXT_LENGTH},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of a 4xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Reject text longer than `MAX_TEXT_LENGTH` bytes.
fn validate_text(text: &str) -> Result<(), LumiError> {
    if text.len() > MAX_TEXT_LENGTH {
        return Err(LumiError::InvalidInput(format!(
            "Text length {} exceeds maximum {} bytes",
            text.len(),
            MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

// =============================================================================
// PREDICT REQUESTS
// =============================================================================

/// `POST /predict` body: a journal entry as lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub lines: Vec<String>,
}

impl PredictRequest {
    /// Check line count and total size.
    pub fn validate(&self) -> Result<(), LumiError> {
        if self.lines.len() > MAX_LINES {
            return Err(LumiError::InvalidInput(format!(
                "Line count {} exceeds maximum {}",
                self.lines.len(),
                MAX_LINES
            )));
        }
        let total: usize = self.lines.iter().map(String::len).sum();
        if total > MAX_TEXT_LENGTH {
            return Err(LumiError::InvalidInput(format!(
                "Text length {} exceeds maximum {} bytes",
                total, MAX_TEXT_LENGTH
            )));
        }
        Ok(())
    }
}

/// `POST /predict_text` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictTextRequest {
    pub text: String,
}

impl PredictTextRequest {
    pub fn validate(&self) -> Result<(), LumiError> {
        validate_text(&self.text)
    }
}

// =============================================================================
// CALIBRATE REQUEST/RESPONSE
// =============================================================================

/// `POST /calibrate` body. A missing `texts` field is an empty batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrateRequest {
    #[serde(default)]
    pub texts: Vec<String>,
}

impl CalibrateRequest {
    /// Check batch size and each text's size.
    pub fn validate(&self) -> Result<(), LumiError> {
        if self.texts.len() > MAX_BATCH_TEXTS {
            return Err(LumiError::InvalidInput(format!(
                "Batch size {} exceeds maximum {}",
                self.texts.len(),
                MAX_BATCH_TEXTS
            )));
        }
        self.texts.iter().try_for_each(|t| validate_text(t))
    }
}

/// One analyzed text in a calibration batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub text: String,
    pub prediction: Prediction,
}

/// Response of `POST /calibrate` and `GET /calibrate_sample`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrateResponse {
    pub results: Vec<CalibrationResult>,
}
