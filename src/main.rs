//! ContractIQ Backend — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use contractiq::metrics::Metrics;
use contractiq::{create_router, AppState, ModelSet};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("contractiq=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init();
    let models = ModelSet::from_env();
    info!(
        classifier = models.classifier.provider_name(),
        answerer = models.answerer.provider_name(),
        "model providers ready"
    );

    let router = create_router(AppState::new(models)).merge(metrics.router());

    let addr = std::env::var("CONTRACTIQ_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "contractiq backend listening");
    axum::serve(listener, router).await?;
    Ok(())
}
