//! # Lumi HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `POST /predict` - Analyze a journal entry given as lines
//! - `POST /predict_text` - Analyze a single text
//! - `POST /calibrate` - Analyze a batch of texts
//! - `GET /calibrate_sample` - Analyze the built-in sample texts
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `LUMI_CORS_ORIGINS`: Comma-separated list of allowed origins (default: all)
//! - `LUMI_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `LUMI_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{get_api_key_from_env, keys_match};
pub use middleware::{create_rate_limiter, get_rate_limit_from_env, parse_rate_limit};
// Re-export handlers and types for integration tests (via `lumi::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    analyze_batch, calibrate_handler, calibrate_sample_handler, health_handler, predict_handler,
    predict_text_handler, sample_texts,
};
#[allow(unused_imports)]
pub use types::{
    CalibrateRequest, CalibrateResponse, CalibrationResult, ErrorResponse, HealthResponse,
    PredictRequest, PredictTextRequest,
};

use crate::analyzer::Analyzer;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lumi_core::LumiError;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit.
const MAX_BODY_BYTES: usize = 256 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The analyzer; classifiers inside it are built on first use.
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    #[must_use]
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `LUMI_CORS_ORIGINS`.
///
/// - If not set or "*": allows all origins (the browser front end may be
///   served from anywhere)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("LUMI_CORS_ORIGINS").ok();

    match origins_env.as_deref().map(str::trim) {
        None | Some("") | Some("*") => {
            tracing::info!("CORS: Allowing all origins");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins in LUMI_CORS_ORIGINS, allowing all");
                CorsLayer::permissive()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication disabled. Set LUMI_API_KEY to require a bearer token."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/predict", post(handlers::predict_handler))
        .route("/predict_text", post(handlers::predict_text_handler))
        .route("/calibrate", post(handlers::calibrate_handler))
        .route("/calibrate_sample", get(handlers::calibrate_sample_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, analyzer: Analyzer) -> Result<(), LumiError> {
    let router = create_router(AppState::new(analyzer));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LumiError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Lumi HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| LumiError::IoError(format!("Server error: {}", e)))
}
