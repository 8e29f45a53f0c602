//! Integration tests for the Lumi HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.
//! Classifiers are replaced by keyword stubs.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use lumi::analyzer::Analyzer;
use lumi::api::{AppState, CalibrateResponse, ErrorResponse, HealthResponse, create_router};
use lumi::inference::{ClassifierError, EmotionClassifier, Pipelines, ZeroShotClassifier};
use lumi_core::{
    Cascade, LabelScore, ModelVersions, Prediction, SAMPLE_TEXTS, Score, ZeroShotOutput,
    primitives::MAX_LINES,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mutex to serialize tests since they modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// STUB CLASSIFIERS
// =============================================================================

fn label_scores(pairs: &[(&str, f64)]) -> Vec<LabelScore> {
    pairs
        .iter()
        .map(|(l, p)| LabelScore::new(*l, Score::from_probability(*p)))
        .collect()
}

/// Emotion model keyed on words in the text.
struct KeywordEmotion;

#[async_trait]
impl EmotionClassifier for KeywordEmotion {
    fn model_id(&self) -> &str {
        "stub/emotion"
    }

    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        let scores = if text.contains("died") {
            label_scores(&[("sadness", 0.90), ("joy", 0.05), ("neutral", 0.05)])
        } else if text.contains("terrified") {
            label_scores(&[("fear", 0.22), ("surprise", 0.25), ("joy", 0.08)])
        } else {
            label_scores(&[("joy", 0.10), ("sadness", 0.09), ("neutral", 0.08)])
        };
        Ok(scores)
    }
}

/// Zero-shot classifier that leans sad, and counts its calls.
/// It has no answer for texts about being terrified.
struct SadZeroShot {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ZeroShotClassifier for SadZeroShot {
    fn model_id(&self) -> &str {
        "stub/zero-shot"
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(candidate_labels.len(), 9);
        if text.contains("terrified") {
            return Ok(ZeroShotOutput::empty());
        }
        Ok(ZeroShotOutput {
            labels: vec!["Sad/Depressed".to_string(), "Neutral/Mixed".to_string()],
            scores: vec![Score::from_probability(0.95), Score::from_probability(0.05)],
        })
    }
}

struct DownEmotion;

#[async_trait]
impl EmotionClassifier for DownEmotion {
    fn model_id(&self) -> &str {
        "stub/down"
    }

    async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        Err(ClassifierError::ConnectionFailed("stub".to_string()))
    }
}

struct DownZeroShot;

#[async_trait]
impl ZeroShotClassifier for DownZeroShot {
    fn model_id(&self) -> &str {
        "stub/down"
    }

    async fn classify(
        &self,
        _text: &str,
        _candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, ClassifierError> {
        Err(ClassifierError::Timeout)
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe {
            std::env::remove_var("LUMI_API_KEY");
            std::env::remove_var("LUMI_RATE_LIMIT");
        };
    }
}

fn lock_env(api_key: Option<&str>) -> TestGuard {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe {
        std::env::set_var("LUMI_RATE_LIMIT", "0");
        match api_key {
            Some(key) => std::env::set_var("LUMI_API_KEY", key),
            None => std::env::remove_var("LUMI_API_KEY"),
        }
    };
    TestGuard { _guard: guard }
}

fn server_with(pipelines: Pipelines) -> TestServer {
    let analyzer = Analyzer::new(pipelines, Cascade::default());
    TestServer::new(create_router(AppState::new(analyzer))).unwrap()
}

/// Create a test server backed by the keyword stubs.
/// Returns the zero-shot call counter and a guard that must be kept alive.
fn create_test_server() -> (TestServer, Arc<AtomicUsize>, TestGuard) {
    let guard = lock_env(None);
    let calls = Arc::new(AtomicUsize::new(0));
    let pipelines = Pipelines::with_classifiers(
        Arc::new(KeywordEmotion),
        Arc::new(SadZeroShot {
            calls: Arc::clone(&calls),
        }),
    );
    (server_with(pipelines), calls, guard)
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

// =============================================================================
// PREDICT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_predict_sad_entry() {
    let (server, calls, _guard) = create_test_server();

    let response = server
        .post("/predict")
        .json(&json!({"lines": ["My dog died", "", "I miss him"]}))
        .await;

    response.assert_status_ok();
    let prediction: Prediction = response.json();
    assert_eq!(prediction.emotion, "Sad");
    assert_eq!(prediction.hue, Some(240));
    assert_eq!(prediction.confidence, "90.0%");
    assert!(prediction.method.as_str().starts_with("emotion-model"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_text_zero_shot_fallback() {
    let (server, calls, _guard) = create_test_server();

    let response = server
        .post("/predict_text")
        .json(&json!({"text": "It was such a loss"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["emotion"], "Sad");
    assert_eq!(body["raw_emotion"], "Sad/Depressed");
    assert_eq!(body["method"], "zero-shot");
    assert_eq!(body["confidence"], "95.0%");
    assert_eq!(body["version"]["emotion_model"], "stub/emotion");
    assert_eq!(body["version"]["zero_shot"], "stub/zero-shot");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_weak_multi_label_keeps_model_top() {
    let (server, calls, _guard) = create_test_server();

    let response = server
        .post("/predict_text")
        .json(&json!({"text": "I was terrified but also excited"}))
        .await;

    response.assert_status_ok();
    let prediction: Prediction = response.json();
    assert_eq!(prediction.emotion, "Inspired");
    assert_eq!(prediction.hue, Some(30));
    assert_eq!(prediction.method.as_str(), "emotion-model");
    assert_eq!(prediction.confidence, "25.0%");
    assert_eq!(prediction.candidates[0].label, "Surprised/Inspired");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_empty_lines() {
    let (server, calls, _guard) = create_test_server();

    let response = server
        .post("/predict")
        .json(&json!({"lines": ["", "   "]}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["method"], "none");
    assert_eq!(body["confidence"], "0%");
    assert!(body.get("raw_emotion").is_none());
    assert!(body["candidates"].as_array().unwrap().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_too_many_lines_rejected() {
    let (server, _, _guard) = create_test_server();
    let lines: Vec<String> = (0..=MAX_LINES).map(|i| format!("line {i}")).collect();

    let response = server.post("/predict").json(&json!({ "lines": lines })).await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("Line count"));
}

#[tokio::test]
async fn test_predict_text_too_long_rejected() {
    let (server, _, _guard) = create_test_server();

    let response = server
        .post("/predict_text")
        .json(&json!({"text": "a".repeat(10_001)}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_predict_malformed_body() {
    let (server, _, _guard) = create_test_server();

    let response = server.post("/predict").json(&json!({"text": 42})).await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_classifier_outage_falls_back_to_neutral() {
    let _guard = lock_env(None);
    let server = server_with(Pipelines::with_classifiers(
        Arc::new(DownEmotion),
        Arc::new(DownZeroShot),
    ));

    let response = server
        .post("/predict_text")
        .json(&json!({"text": "Something happened"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["method"], "fallback-neutral");
    assert_eq!(body["emotion"], "Neutral");
    assert!(body["hue"].is_null());
}

// =============================================================================
// CALIBRATE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_calibrate_keeps_order() {
    let (server, _, _guard) = create_test_server();

    let response = server
        .post("/calibrate")
        .json(&json!({"texts": ["My dog died", "It was such a loss"]}))
        .await;

    response.assert_status_ok();
    let body: CalibrateResponse = response.json();
    assert_eq!(body.results.len(), 2);
    assert_eq!(body.results[0].text, "My dog died");
    assert_eq!(body.results[1].prediction.method.as_str(), "zero-shot");
}

#[tokio::test]
async fn test_calibrate_missing_texts_is_empty() {
    let (server, _, _guard) = create_test_server();

    let response = server.post("/calibrate").json(&json!({})).await;

    response.assert_status_ok();
    let body: CalibrateResponse = response.json();
    assert!(body.results.is_empty());
}

#[tokio::test]
async fn test_calibrate_sample() {
    let (server, _, _guard) = create_test_server();

    let response = server.get("/calibrate_sample").await;

    response.assert_status_ok();
    let body: CalibrateResponse = response.json();
    let texts: Vec<&str> = body.results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, SAMPLE_TEXTS);
    assert_eq!(body.results[0].prediction.emotion, "Sad");
}

// =============================================================================
// LAZY PIPELINES
// =============================================================================

#[tokio::test]
async fn test_zero_shot_not_built_when_emotion_model_decides() {
    let _guard = lock_env(None);
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let pipelines = Pipelines::with_factories(
        Box::new(|| Ok(Arc::new(KeywordEmotion) as Arc<dyn EmotionClassifier>)),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(DownZeroShot) as Arc<dyn ZeroShotClassifier>)
        }),
        ModelVersions::default(),
    );
    let server = server_with(pipelines);

    server
        .post("/predict_text")
        .json(&json!({"text": "My dog died"}))
        .await
        .assert_status_ok();
    assert_eq!(builds.load(Ordering::SeqCst), 0);

    server
        .post("/predict_text")
        .json(&json!({"text": "quiet day"}))
        .await
        .assert_status_ok();
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

// =============================================================================
// AUTHENTICATION TESTS
// =============================================================================

fn create_auth_test_server(api_key: &str) -> (TestServer, TestGuard) {
    let guard = lock_env(Some(api_key));
    let pipelines = Pipelines::with_classifiers(
        Arc::new(KeywordEmotion),
        Arc::new(SadZeroShot {
            calls: Arc::new(AtomicUsize::new(0)),
        }),
    );
    (server_with(pipelines), guard)
}

#[tokio::test]
async fn test_auth_health_is_public() {
    let (server, _guard) = create_auth_test_server("test-secret-key-12345");

    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let (server, _guard) = create_auth_test_server("test-secret-key-12345");

    let response = server
        .post("/predict_text")
        .json(&json!({"text": "My dog died"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let (server, _guard) = create_auth_test_server(api_key);

    let response = server
        .post("/predict_text")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .json(&json!({"text": "My dog died"}))
        .await;

    response.assert_status_ok();
    let prediction: Prediction = response.json();
    assert_eq!(prediction.emotion, "Sad");
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");

    let response = server
        .get("/calibrate_sample")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    assert_eq!(response.status_code().as_u16(), 401);
}
