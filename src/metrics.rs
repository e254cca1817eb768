// src/metrics.rs
//! Prometheus metrics: recorder installation and the `/metrics` route.
//!
//! Counters used across the service:
//! - `analyze_documents_total`   — accepted and fully analyzed uploads
//! - `analyze_rejected_total`    — uploads rejected by the legal gate
//! - `chatbot_questions_total`   — chatbot requests served
//! - `model_fallbacks_total`     — soft model failures absorbed by callers
//! - `model_provider_errors_total` — raw provider call failures

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Call once at startup.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");
        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
