//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CalibrateRequest, CalibrateResponse, CalibrationResult, ErrorResponse, HealthResponse,
        PredictRequest, PredictTextRequest,
    },
};
use crate::analyzer::Analyzer;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lumi_core::{LumiError, SAMPLE_TEXTS};

/// 400 response for input that failed validation.
fn bad_request(e: &LumiError) -> Response {
    tracing::warn!(event = "invalid_request", "Rejected request: {}", e);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// PREDICT HANDLERS
// =============================================================================

/// Analyze a journal entry given as lines.
pub async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return bad_request(&e);
    }

    let prediction = state.analyzer.analyze_lines(&request.lines).await;
    (StatusCode::OK, Json(prediction)).into_response()
}

/// Analyze a single text.
pub async fn predict_text_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictTextRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return bad_request(&e);
    }

    let prediction = state.analyzer.analyze_text(&request.text).await;
    (StatusCode::OK, Json(prediction)).into_response()
}

// =============================================================================
// CALIBRATION HANDLERS
// =============================================================================

/// Analyze a batch of texts.
pub async fn calibrate_handler(
    State(state): State<AppState>,
    Json(request): Json<CalibrateRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return bad_request(&e);
    }

    let response = analyze_batch(&state.analyzer, &request.texts).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Analyze the built-in sample texts.
pub async fn calibrate_sample_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = analyze_batch(&state.analyzer, &sample_texts()).await;
    (StatusCode::OK, Json(response))
}

/// The built-in sample texts, owned.
pub fn sample_texts() -> Vec<String> {
    SAMPLE_TEXTS.iter().map(|t| (*t).to_string()).collect()
}

/// Analyze texts in order.
pub async fn analyze_batch(analyzer: &Analyzer, texts: &[String]) -> CalibrateResponse {
    let mut results = Vec::with_capacity(texts.len());
    for text in texts {
        let prediction = analyzer.analyze_text(text).await;
        results.push(CalibrationResult {
            text: text.clone(),
            prediction,
        });
    }
    CalibrateResponse { results }
}
