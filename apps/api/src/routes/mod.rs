pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::documents::handlers::handle_download;
use crate::session::create_session_layer;
use crate::state::AppState;
use crate::tailoring::handlers::handle_generate;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let session_layer = create_session_layer(&state.config);

    Router::new()
        .route("/", get(health::landing_handler))
        .route("/health", get(health::health_handler))
        .route("/generate", post(handle_generate))
        .route("/download/:doc_type/docx", get(handle_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(session_layer)
        .with_state(state)
}

/// Any origin when none are configured; otherwise only the listed origins, with
/// credentials so the session cookie survives cross-origin calls.
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let Some(origins) = &config.cors_allowed_origins else {
        return Ok(CorsLayer::permissive());
    };

    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    info!("CORS restricted to {} origin(s)", origins.len());

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
