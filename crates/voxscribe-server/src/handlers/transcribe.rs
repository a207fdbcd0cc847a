use super::{error_response, run_transcription};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use voxscribe_core::{Language, TranscriptionRequest, VadOverride};

#[derive(Debug, Deserialize)]
pub struct TranscribeBody {
    #[serde(default)]
    pub audio_path: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub vad: Option<bool>,
}

/// `POST /transcribe` with a JSON body naming a file on the server.
#[tracing::instrument(skip(state, body))]
pub async fn transcribe_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let body: TranscribeBody = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting malformed request body");
            return error_response(StatusCode::BAD_REQUEST, format!("invalid JSON: {e}"));
        }
    };
    if body.audio_path.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "audio_path required");
    }

    let language = Language::from_code(&body.language);
    tracing::debug!(audio_path = %body.audio_path, %language, vad = ?body.vad, "transcribe request");
    let request = TranscriptionRequest::from_path(body.audio_path, language, VadOverride::from(body.vad));
    run_transcription(state, request).await
}
