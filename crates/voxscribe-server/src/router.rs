use crate::handlers::{health_handler, transcribe_handler, upload_handler};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use voxscribe_core::ServerConfig;

/// Transport limits applied around every route.
#[derive(Debug, Clone, Copy)]
pub struct RouterLimits {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl From<&ServerConfig> for RouterLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_body_bytes: config.max_upload_mb * 1024 * 1024,
        }
    }
}

impl Default for RouterLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

pub fn create_router(state: AppState, limits: RouterLimits) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // method routers answer other verbs with 405
    Router::new()
        .route("/transcribe", post(transcribe_handler))
        .route("/transcribe/upload", post(upload_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(trace_layer)
        .with_state(state)
}
