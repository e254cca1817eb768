// src/inference.rs
//! Remote model providers: trait abstraction over the hosted inference API
//! plus mock and disabled implementations for tests and tokenless runs.
//!
//! All provider failures map to `None`; callers own the fallback policy
//! (the gate falls through to "not legal", the chatbot answers with a fixed
//! apology). Nothing in here ever returns an error to a handler.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Ranked output of a zero-shot classification call, best label first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl Classification {
    /// Top-ranked (label, score), if the provider returned anything at all.
    pub fn top(&self) -> Option<(&str, f64)> {
        let label = self.labels.first()?;
        let score = self.scores.first().copied()?;
        Some((label.as_str(), score))
    }
}

/// Zero-shot text classifier over caller-supplied candidate labels.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// `None` on any provider failure; the caller decides what that means.
    async fn classify(&self, text: &str, labels: &[&str]) -> Option<Classification>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Extractive question answering: picks an answer span out of `context`.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, context: &str, question: &str) -> Option<String>;
    fn provider_name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn ZeroShotClassifier>;
pub type DynAnswerer = Arc<dyn QuestionAnswerer>;

/// The two models the request handlers need, built once at startup and
/// shared read-only through `AppState`.
#[derive(Clone)]
pub struct ModelSet {
    pub classifier: DynClassifier,
    pub answerer: DynAnswerer,
}

impl ModelSet {
    /// Factory honoring the environment:
    /// * `MODEL_TEST_MODE=mock` → deterministic mock providers.
    /// * `HF_API_TOKEN` set → hosted Hugging Face inference.
    /// * otherwise → disabled providers (gate keyword rule still works).
    pub fn from_env() -> Self {
        if std::env::var("MODEL_TEST_MODE")
            .map(|v| v == "mock")
            .unwrap_or(false)
        {
            return Self::mock();
        }
        match std::env::var("HF_API_TOKEN") {
            Ok(token) if !token.is_empty() => {
                let provider = Arc::new(HfProvider::new(token));
                Self {
                    classifier: provider.clone(),
                    answerer: provider,
                }
            }
            _ => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            classifier: Arc::new(DisabledProvider),
            answerer: Arc::new(DisabledProvider),
        }
    }

    pub fn mock() -> Self {
        Self {
            classifier: Arc::new(MockClassifier::legal(0.95)),
            answerer: Arc::new(MockAnswerer),
        }
    }
}

// ------------------------------------------------------------
// Hosted provider (Hugging Face Inference API)
// ------------------------------------------------------------

const ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";
const QA_MODEL: &str = "distilbert-base-cased-distilled-squad";

/// Hugging Face Inference API client. One provider serves both model
/// endpoints; the trait impls pick the model route.
pub struct HfProvider {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl HfProvider {
    pub fn new(token: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("contractiq/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            token,
            base_url: "https://api-inference.huggingface.co/models".to_string(),
        }
    }

    /// Point the provider at a different host (used by tests with a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model)
    }
}

#[async_trait]
impl ZeroShotClassifier for HfProvider {
    async fn classify(&self, text: &str, labels: &[&str]) -> Option<Classification> {
        #[derive(Serialize)]
        struct Params<'a> {
            candidate_labels: &'a [&'a str],
        }
        #[derive(Serialize)]
        struct Req<'a> {
            inputs: &'a str,
            parameters: Params<'a>,
        }
        #[derive(Deserialize)]
        struct Resp {
            labels: Vec<String>,
            scores: Vec<f64>,
        }

        let req = Req {
            inputs: text,
            parameters: Params {
                candidate_labels: labels,
            },
        };
        let resp = match self
            .http
            .post(self.model_url(ZERO_SHOT_MODEL))
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = ?e, model = ZERO_SHOT_MODEL, "zero-shot request failed");
                counter!("model_provider_errors_total").increment(1);
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), model = ZERO_SHOT_MODEL, "zero-shot non-success status");
            counter!("model_provider_errors_total").increment(1);
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        if body.labels.is_empty() || body.labels.len() != body.scores.len() {
            return None;
        }
        Some(Classification {
            labels: body.labels,
            scores: body.scores,
        })
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }
}

#[async_trait]
impl QuestionAnswerer for HfProvider {
    async fn answer(&self, context: &str, question: &str) -> Option<String> {
        #[derive(Serialize)]
        struct Inputs<'a> {
            question: &'a str,
            context: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            inputs: Inputs<'a>,
        }
        #[derive(Deserialize)]
        struct Resp {
            answer: String,
        }

        let req = Req {
            inputs: Inputs { question, context },
        };
        let resp = match self
            .http
            .post(self.model_url(QA_MODEL))
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = ?e, model = QA_MODEL, "qa request failed");
                counter!("model_provider_errors_total").increment(1);
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), model = QA_MODEL, "qa non-success status");
            counter!("model_provider_errors_total").increment(1);
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        if body.answer.is_empty() {
            None
        } else {
            Some(body.answer)
        }
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }
}

// ------------------------------------------------------------
// Disabled + mock providers
// ------------------------------------------------------------

/// Returns `None` always; used when no API token is configured.
pub struct DisabledProvider;

#[async_trait]
impl ZeroShotClassifier for DisabledProvider {
    async fn classify(&self, _text: &str, _labels: &[&str]) -> Option<Classification> {
        None
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

#[async_trait]
impl QuestionAnswerer for DisabledProvider {
    async fn answer(&self, _context: &str, _question: &str) -> Option<String> {
        None
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic classifier for tests/local runs: always ranks `label` first
/// with the given score.
#[derive(Clone)]
pub struct MockClassifier {
    pub label: String,
    pub score: f64,
}

impl MockClassifier {
    pub fn legal(score: f64) -> Self {
        Self {
            label: "legal document".to_string(),
            score,
        }
    }

    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for MockClassifier {
    async fn classify(&self, _text: &str, labels: &[&str]) -> Option<Classification> {
        // Fixed top label, remaining candidates share the leftover mass.
        let mut out_labels = vec![self.label.clone()];
        let mut out_scores = vec![self.score];
        let rest: Vec<&&str> = labels.iter().filter(|l| **l != self.label).collect();
        if !rest.is_empty() {
            let share = (1.0 - self.score).max(0.0) / rest.len() as f64;
            for l in rest {
                out_labels.push((*l).to_string());
                out_scores.push(share);
            }
        }
        Some(Classification {
            labels: out_labels,
            scores: out_scores,
        })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Toy extractive answerer for tests/local runs: "answers" with the last
/// word token of the context, which is right surprisingly often for short
/// fixture sentences ("The sky is blue." -> "blue").
pub struct MockAnswerer;

#[async_trait]
impl QuestionAnswerer for MockAnswerer {
    async fn answer(&self, context: &str, _question: &str) -> Option<String> {
        context
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .next_back()
            .map(|t| t.to_string())
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
