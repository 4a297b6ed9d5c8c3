//! Evaluation service client.
//!
//! DESIGN
//! ======
//! The service takes a PNG data URI plus the current variable bindings at
//! `POST {base}/calculate` and answers with an ordered list of
//! `{expr, result, assign}` entries. `Evaluator` is the seam the session
//! talks to; `HttpEvaluator` is the real transport. Response parsing is a
//! pure function so it can be tested without a server.
//!
//! No retries and no request timeout: a submission either completes or
//! fails at the transport, and the session decides what the user sees.

use async_trait::async_trait;
use canvas::vars::{Bindings, EvaluationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by an evaluation round trip.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The request never produced a response (connect, DNS, reset, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("server error: status {status}")]
    Server { status: u16, body: String },

    /// The response body was not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl EvalError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Server { .. } => "E_SERVER",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

// =============================================================================
// SEAM
// =============================================================================

#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Send one capture with its bindings and return the results in order.
    async fn evaluate(&self, image_data_uri: &str, bindings: &Bindings) -> Result<Vec<EvaluationResult>, EvalError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpEvaluator {
    http: reqwest::Client,
    base_url: String,
}

impl HttpEvaluator {
    /// # Errors
    ///
    /// Returns [`EvalError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, EvalError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| EvalError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/api`; returns the service's status message.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Evaluator::evaluate`].
    pub async fn health(&self) -> Result<String, EvalError> {
        let url = format!("{}/api", self.base_url);
        let text = self.read_body(self.http.get(url)).await?;
        parse_health(&text)
    }

    async fn read_body(&self, request: reqwest::RequestBuilder) -> Result<String, EvalError> {
        let response = request
            .send()
            .await
            .map_err(|e| EvalError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EvalError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(EvalError::Server { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait]
impl Evaluator for HttpEvaluator {
    async fn evaluate(&self, image_data_uri: &str, bindings: &Bindings) -> Result<Vec<EvaluationResult>, EvalError> {
        let url = format!("{}/calculate", self.base_url);
        let body = CalculateRequest { image: image_data_uri, dict_of_vars: bindings };
        debug!(%url, vars = bindings.len(), image_bytes = image_data_uri.len(), "posting capture");

        let text = self.read_body(self.http.post(url).json(&body)).await?;
        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CalculateRequest<'a> {
    image: &'a str,
    dict_of_vars: &'a Bindings,
}

#[derive(Deserialize)]
struct CalculateResponse {
    data: Vec<WireResult>,
}

#[derive(Deserialize)]
struct WireResult {
    expr: String,
    result: Value,
    assign: bool,
}

#[derive(Deserialize)]
struct HealthResponse {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a `/calculate` response body into ordered results.
///
/// `result` may arrive as a JSON string or number; anything else is malformed.
///
/// # Errors
///
/// Returns [`EvalError::MalformedResponse`] for any shape mismatch.
pub fn parse_response(json: &str) -> Result<Vec<EvaluationResult>, EvalError> {
    let parsed: CalculateResponse =
        serde_json::from_str(json).map_err(|e| EvalError::MalformedResponse(e.to_string()))?;

    parsed
        .data
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let result = match entry.result {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(EvalError::MalformedResponse(format!(
                        "data[{i}].result: expected string or number, got {other}"
                    )));
                }
            };
            Ok(EvaluationResult { expression: entry.expr, result, is_assignment: entry.assign })
        })
        .collect()
}

fn parse_health(json: &str) -> Result<String, EvalError> {
    let parsed: HealthResponse =
        serde_json::from_str(json).map_err(|e| EvalError::MalformedResponse(e.to_string()))?;
    Ok(parsed.message)
}

#[cfg(test)]
#[path = "eval_test.rs"]
mod tests;
