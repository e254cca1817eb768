// src/api.rs
//! HTTP surface: `/health`, `/analyze` (multipart PDF upload), `/chatbot`.
//!
//! Handlers are stateless single passes over immutable startup state.
//! Everything unexpected is caught at this boundary and mapped to the
//! wire-format error JSON; nothing below ever panics on bad input.

use anyhow::anyhow;
use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::extract;
use crate::gate;
use crate::inference::ModelSet;
use crate::report::{self, AnalysisReport};
use crate::segment;

/// Fixed chatbot reply when the QA model cannot produce an answer.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I cannot answer that question based on the provided context.";

#[derive(Clone)]
pub struct AppState {
    pub models: ModelSet,
}

impl AppState {
    pub fn new(models: ModelSet) -> Self {
        Self { models }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/chatbot", post(chatbot))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Analyze flow
// ------------------------------------------------------------

/// Failures of the analyze flow, mapped to the frontend's error contract.
#[derive(Debug)]
pub enum AnalyzeError {
    /// The upload failed the legal-document gate (client error).
    NotLegalContract,
    /// Anything else: bad multipart, unreadable PDF, internal failure.
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AnalyzeError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotLegalContract => (StatusCode::BAD_REQUEST, "Not a legal contract".to_string()),
            Self::Internal(e) => {
                warn!(error = ?e, "analyze flow failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        let body = json!({ "success": false, "error": message });
        (status, Json(body)).into_response()
    }
}

async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisReport>, AnalyzeError> {
    // A rejected extractor must still answer in the wire-format error JSON,
    // not axum's plain-text rejection body.
    let mut multipart =
        multipart.map_err(|e| anyhow!("invalid upload request: {}", e.body_text()))?;
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let text = extract::extract_text(&bytes)?;

    if !gate::is_legal_document(&state.models.classifier, &text).await {
        counter!("analyze_rejected_total").increment(1);
        info!(id = %anon_hash(&text), "upload rejected by legal gate");
        return Err(AnalyzeError::NotLegalContract);
    }

    let clauses = segment::extract_clauses(&text);
    let report = report::build_report(&filename, &clauses);
    counter!("analyze_documents_total").increment(1);
    // Never log raw contract text; only a hashed id and shape info.
    info!(
        id = %anon_hash(&text),
        clauses_found = clauses.len(),
        clauses_reported = report.clauses.len(),
        risk = ?report.overall_risk,
        "document analyzed"
    );
    Ok(Json(report))
}

/// Pull the first file part out of the multipart form.
async fn read_upload(multipart: &mut Multipart) -> anyhow::Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| anyhow!("invalid multipart form: {e}"))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| anyhow!("failed to read uploaded file: {e}"))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(anyhow!("no file uploaded"))
}

// ------------------------------------------------------------
// Chatbot flow
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatbotRequest {
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    question: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatbotResponse {
    answer: String,
}

#[derive(Debug)]
pub enum ChatbotError {
    MissingField(&'static str),
    InvalidBody(String),
}

impl IntoResponse for ChatbotError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingField(field) => format!("missing field `{field}`"),
            Self::InvalidBody(message) => message,
        };
        let body = json!({ "error": message });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn chatbot(
    State(state): State<AppState>,
    payload: Result<Json<ChatbotRequest>, JsonRejection>,
) -> Result<Json<ChatbotResponse>, ChatbotError> {
    // Same boundary rule as /analyze: a body that fails to parse still gets
    // the structured `{error}` shape.
    let Json(body) = payload.map_err(|e| ChatbotError::InvalidBody(e.body_text()))?;
    let context = body.context.ok_or(ChatbotError::MissingField("context"))?;
    let question = body.question.ok_or(ChatbotError::MissingField("question"))?;

    counter!("chatbot_questions_total").increment(1);
    let answer = match state.models.answerer.answer(&context, &question).await {
        Some(a) => a,
        None => {
            // Soft model failure: the fallback sentence is a *successful*
            // answer as far as the caller is concerned.
            counter!("model_fallbacks_total").increment(1);
            info!(
                provider = state.models.answerer.provider_name(),
                "qa model unavailable, returning fallback answer"
            );
            FALLBACK_ANSWER.to_string()
        }
    };
    Ok(Json(ChatbotResponse { answer }))
}

// ------------------------------------------------------------
// Helpers
// ------------------------------------------------------------

/// Short anonymized id for log lines; raw document text never hits the logs.
fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("some contract text");
        let b = anon_hash("some contract text");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, anon_hash("other text"));
    }
}
