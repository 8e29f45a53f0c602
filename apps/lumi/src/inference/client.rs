//! # Inference HTTP Client
//!
//! Calls a hosted classifier pipeline (Hugging Face inference API contract).
//!
//! ```text
//! POST {base_url}/models/{model}
//! text-classification:  {"inputs": text, "parameters": {"top_k": null}}
//!                       -> [[{"label", "score"}, ...]]  or  [{"label", "score"}, ...]
//! zero-shot:            {"inputs": text, "parameters": {"candidate_labels": [...], "multi_label": false}}
//!                       -> {"sequence", "labels": [...], "scores": [...]}
//!                          or [{"label", "score"}, ...]
//! ```

use super::{ClassifierError, EmotionClassifier, ZeroShotClassifier};
use async_trait::async_trait;
use lumi_core::{LabelScore, ZeroShotOutput};
use serde_json::{Value, json};
use std::time::Duration;

/// HTTP client bound to one model on an inference endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl InferenceClient {
    /// Create a client for `model` at `base_url`.
    pub fn new(
        base_url: &str,
        model: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Unavailable(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_token,
        })
    }

    /// Endpoint URL for this model.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    /// POST a JSON body and return the parsed JSON response.
    async fn post(&self, body: &Value) -> Result<Value, ClassifierError> {
        let mut req = self.http.post(self.url()).json(body);
        if let Some(ref token) = self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout
            } else {
                ClassifierError::ConnectionFailed(format!("{}: {e}", self.base_url))
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ClassifierError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClassifierError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifierError::ServerError(status.as_u16(), body));
        }

        resp.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout
            } else {
                ClassifierError::ParseError(e.to_string())
            }
        })
    }
}

#[async_trait]
impl EmotionClassifier for InferenceClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        let body = json!({
            "inputs": text,
            "parameters": { "top_k": null },
        });
        let value = self.post(&body).await?;
        parse_label_scores(value)
    }
}

#[async_trait]
impl ZeroShotClassifier for InferenceClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, ClassifierError> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": candidate_labels,
                "multi_label": false,
            },
        });
        let value = self.post(&body).await?;
        parse_zero_shot(value)
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Parse a text-classification response. A batched `[[...]]` response is
/// reduced to its first row.
pub(crate) fn parse_label_scores(value: Value) -> Result<Vec<LabelScore>, ClassifierError> {
    let rows = match value {
        Value::Array(mut items) if items.first().is_some_and(Value::is_array) => {
            items.swap_remove(0)
        }
        other => other,
    };
    serde_json::from_value(rows).map_err(|e| ClassifierError::ParseError(e.to_string()))
}

/// Parse a zero-shot response in either the `labels`/`scores` object form or
/// the list-of-pairs form.
pub(crate) fn parse_zero_shot(value: Value) -> Result<ZeroShotOutput, ClassifierError> {
    if value.is_array() {
        let mut pairs = parse_label_scores(value)?;
        pairs.sort_by(|a, b| b.score.cmp(&a.score));
        let (labels, scores) = pairs.into_iter().map(|p| (p.label, p.score)).unzip();
        return Ok(ZeroShotOutput { labels, scores });
    }

    let output: ZeroShotOutput =
        serde_json::from_value(value).map_err(|e| ClassifierError::ParseError(e.to_string()))?;
    if output.labels.len() != output.scores.len() {
        return Err(ClassifierError::ParseError(format!(
            "{} labels but {} scores",
            output.labels.len(),
            output.scores.len()
        )));
    }
    Ok(output)
}

// =============================================================================
// TESTS
// =============================================================================
