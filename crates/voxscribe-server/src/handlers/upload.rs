use super::{error_response, run_transcription};
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use std::path::Path;
use voxscribe_core::{AudioSource, Language, TranscriptionRequest, VadOverride};

/// `true/1/yes` force segmentation on, `false/0/no` force it off, anything
/// else leaves the decision to the pipeline.
pub fn parse_vad_field(value: &str) -> VadOverride {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => VadOverride::ForceOn,
        "false" | "0" | "no" => VadOverride::ForceOff,
        _ => VadOverride::Auto,
    }
}

/// `POST /transcribe/upload` with a multipart form: `audio` file plus
/// optional `language` and `vad` text fields.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut audio: Option<(Vec<u8>, Option<String>)> = None;
    let mut language = String::new();
    let mut vad = VadOverride::Auto;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read multipart form");
                return error_response(StatusCode::BAD_REQUEST, format!("invalid multipart form: {e}"));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let extension = field
                    .file_name()
                    .and_then(|name| Path::new(name).extension())
                    .map(|ext| ext.to_string_lossy().into_owned());
                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read uploaded file");
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read upload: {e}"),
                        );
                    }
                };
                audio = Some((data.to_vec(), extension));
            }
            "language" | "vad" => {
                let value = match field.text().await {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(field = %name, error = %e, "failed to read form field");
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read field {name}: {e}"),
                        );
                    }
                };
                if name == "language" {
                    language = value;
                } else {
                    vad = parse_vad_field(&value);
                }
            }
            _ => {}
        }
    }

    let Some((data, extension)) = audio else {
        return error_response(StatusCode::BAD_REQUEST, "audio file required");
    };
    tracing::debug!(bytes = data.len(), extension = ?extension, "upload received");

    let request = TranscriptionRequest {
        source: AudioSource::Bytes { data, extension },
        language: Language::from_code(&language),
        vad,
    };
    run_transcription(state, request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vad_field() {
        for on in ["true", "1", "yes", " YES ", "True"] {
            assert_eq!(parse_vad_field(on), VadOverride::ForceOn, "{on:?}");
        }
        for off in ["false", "0", "no", "NO"] {
            assert_eq!(parse_vad_field(off), VadOverride::ForceOff, "{off:?}");
        }
        for auto in ["", "auto", "maybe", "2"] {
            assert_eq!(parse_vad_field(auto), VadOverride::Auto, "{auto:?}");
        }
    }
}
