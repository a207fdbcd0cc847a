mod health;
mod transcribe;
mod upload;

pub use health::{health_handler, HealthResponse, LanguageHealth};
pub use transcribe::{transcribe_handler, TranscribeBody};
pub use upload::{parse_vad_field, upload_handler};

use crate::state::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use voxscribe_core::{StatusHint, TranscriptionRequest, TranscriptionResult};

pub fn status_for(hint: StatusHint) -> StatusCode {
    match hint {
        StatusHint::Ok => StatusCode::OK,
        StatusHint::BadRequest => StatusCode::BAD_REQUEST,
        StatusHint::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        StatusHint::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        StatusHint::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(TranscriptionResult::failure(message, 0.0))).into_response()
}

/// Run the pipeline on a blocking worker and map the outcome to a response.
pub(crate) async fn run_transcription(state: AppState, request: TranscriptionRequest) -> Response {
    let transcriber = Arc::clone(&state.transcriber);
    match tokio::task::spawn_blocking(move || transcriber.run(&request)).await {
        Ok((result, hint)) => (status_for(hint), Json(result)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "transcription worker failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transcription worker failed",
            )
        }
    }
}
