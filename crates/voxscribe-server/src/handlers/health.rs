use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use voxscribe_core::Language;

#[derive(Debug, Serialize)]
pub struct LanguageHealth {
    pub model: Option<String>,
    pub ready: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine: String,
    pub version: String,
    pub vad: bool,
    pub languages: BTreeMap<&'static str, LanguageHealth>,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let engines = state.transcriber.engines();
    let languages = [Language::En, Language::Ru]
        .into_iter()
        .map(|language| {
            let status = engines.language_status(language);
            (
                language.code(),
                LanguageHealth {
                    model: status.model,
                    ready: status.ready,
                },
            )
        })
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            engine: state.info.engine.clone(),
            version: state.info.version.clone(),
            vad: engines.vad_enabled(),
            languages,
        }),
    )
}
