mod config;
mod documents;
mod errors;
mod llm_client;
mod routes;
mod session;
mod state;
mod tailoring;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::documents::store::InMemoryDocumentStore;
use crate::llm_client::{GenerationSettings, LlmClient};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;
use crate::tailoring::prompts::PromptComposer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing ANTHROPIC_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        GenerationSettings::from_config(&config),
    )
    .context("failed to build HTTP client")?;
    info!(
        "LLM client initialized (model: {}, deadline: {:?})",
        llm.model(),
        config.generation_deadline
    );

    let composer = PromptComposer::load(config.prompt_template_path.as_deref())?;
    if let Some(path) = &config.prompt_template_path {
        info!("Using prompt template from {}", path.display());
    }

    info!("Generated documents scoped per {:?}", config.session_scope);

    // Build app state
    let state = AppState {
        generator: Arc::new(llm),
        store: Arc::new(InMemoryDocumentStore::new(config.session_ttl)),
        composer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
