use std::sync::Arc;

use anyhow::Context;
use dashmap::DashMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skill_bridge::api::{build_router, AppState};
use skill_bridge::chat::{OpenAiClient, OpenAiConfig};
use skill_bridge::config::Config;
use skill_bridge::conversation::{ConversationStore, TiktokenEstimator};
use skill_bridge::sweep::spawn_cache_sweep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skill_bridge=info,tower_http=info")),
        )
        .init();

    let config = Config::default().from_env();

    let store = ConversationStore::new(config.cache_ttl(), config.system_prompt.clone());
    let backend = OpenAiClient::new(OpenAiConfig {
        endpoint: config.chat_endpoint.clone(),
        api_key: config.openai_api_key.clone(),
        model: config.model.clone(),
        timeout: config.completion_timeout(),
    })
    .context("failed to build completion client")?;

    let state = AppState {
        store: store.clone(),
        backend: Arc::new(backend),
        estimator: Arc::new(TiktokenEstimator),
        inflight: Arc::new(DashMap::new()),
        config: Arc::new(config.clone()),
    };

    let sweep = spawn_cache_sweep(store, state.inflight.clone(), config.sweep_interval());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // In-flight completions are not cancelled; only the periodic sweep is
    sweep.abort();
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
        std::future::pending::<()>().await;
    }
}
