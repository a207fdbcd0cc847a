use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use voxscribe_core::{Language, TranscriptionConfig};
use voxscribe_engine::{
    Dispatcher, EnergyVad, EngineHandle, Engines, NullEngine, Segmenter, Transcriber, RUNTIME,
};
use voxscribe_server::{create_router, serve, AppState, RouterLimits, ServeOutcome, ServiceInfo};

const BOUNDARY: &str = "voxscribe-test-boundary";

fn test_router(with_vad: bool) -> Router {
    let dispatcher = Dispatcher::new(
        Some(EngineHandle::new(Language::En, "null-en", Box::new(NullEngine::new()))),
        None,
    );
    let segmenter = with_vad
        .then(|| Segmenter::new(Box::new(EnergyVad::new(0.01, 0.25, 0.5, 512)), 25.0));
    let engines = Arc::new(Engines::new(dispatcher, segmenter));
    let config = TranscriptionConfig {
        ffmpeg_path: "/nonexistent/ffmpeg".to_string(),
        ..TranscriptionConfig::default()
    };
    let transcriber = Arc::new(Transcriber::from_config(engines, &config));
    create_router(
        AppState::new(transcriber, ServiceInfo::new(RUNTIME)),
        RouterLimits::default(),
    )
}

fn write_wav(path: &Path, seconds: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..seconds * 16_000 {
        writer
            .write_sample(((i as f32 * 0.05).sin() * 8000.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/transcribe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match filename {
            Some(file) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/transcribe/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_reports_languages() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(test_router(true), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], RUNTIME);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["vad"], true);
    assert_eq!(json["languages"]["en"]["model"], "null-en");
    assert_eq!(json["languages"]["en"]["ready"], true);
    assert_eq!(json["languages"]["ru"]["model"], Value::Null);
    assert_eq!(json["languages"]["ru"]["ready"], false);
}

#[tokio::test]
async fn test_transcribe_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    write_wav(&path, 1);

    let body = serde_json::json!({ "audio_path": path, "language": " EN " }).to_string();
    let (status, json) = send(test_router(false), json_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "[null] 16000 samples");
    assert!(json["duration_ms"].as_f64().unwrap() >= 0.0);
    assert!(json.get("error").is_none());
    assert!(json.get("speech_ms").is_none());
}

#[tokio::test]
async fn test_transcribe_invalid_json_is_bad_request() {
    let (status, json) = send(test_router(false), json_request("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["text"], "");
    assert_eq!(json["duration_ms"], 0.0);
    assert!(json["error"].as_str().unwrap().starts_with("invalid JSON"));
}

#[tokio::test]
async fn test_transcribe_requires_audio_path() {
    let (status, json) = send(test_router(false), json_request(r#"{"language":"en"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "audio_path required");
}

#[tokio::test]
async fn test_unloaded_language_is_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    write_wav(&path, 1);

    let body = serde_json::json!({ "audio_path": path, "language": "RU" }).to_string();
    let (status, json) = send(test_router(false), json_request(&body)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "ru model not loaded");
    assert_eq!(json["text"], "");
}

#[tokio::test]
async fn test_conversion_failure_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp3");
    std::fs::write(&path, b"ID3 not really audio").unwrap();

    let body = serde_json::json!({ "audio_path": path }).to_string();
    let (status, json) = send(test_router(false), json_request(&body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().starts_with("ffmpeg"));
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let body = r#"{"audio_path":"/does/not/exist.wav"}"#;
    let (status, json) = send(test_router(false), json_request(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_get_on_transcribe_is_method_not_allowed() {
    for uri in ["/transcribe", "/transcribe/upload"] {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = test_router(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
    }
}

#[tokio::test]
async fn test_upload_transcribes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    write_wav(&path, 2);
    let data = std::fs::read(&path).unwrap();

    let request = multipart_request(&[
        ("audio", Some("clip.wav"), data.as_slice()),
        ("language", None, &b"en"[..]),
        ("vad", None, &b"no"[..]),
    ]);
    let (status, json) = send(test_router(true), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "[null] 32000 samples");
    assert!(json.get("speech_ms").is_none());
}

#[tokio::test]
async fn test_upload_forced_vad_reports_speech() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    write_wav(&path, 2);
    let data = std::fs::read(&path).unwrap();

    let request = multipart_request(&[("audio", Some("clip.wav"), data.as_slice()), ("vad", None, &b"yes"[..])]);
    let (status, json) = send(test_router(true), request).await;

    assert_eq!(status, StatusCode::OK);
    let speech_ms = json["speech_ms"].as_f64().unwrap();
    assert!(speech_ms > 1900.0 && speech_ms <= 2000.0, "speech_ms = {speech_ms}");
}

#[tokio::test]
async fn test_upload_without_audio_is_bad_request() {
    let request = multipart_request(&[("language", None, &b"en"[..])]);
    let (status, json) = send(test_router(false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "audio file required");
}

#[tokio::test]
async fn test_upload_truncated_text_field_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    write_wav(&path, 1);
    let data = std::fs::read(&path).unwrap();

    // the language field is cut off before its closing boundary
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"clip.wav\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&data);
    body.extend_from_slice(
        format!("\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\nr")
            .as_bytes(),
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcribe/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, json) = send(test_router(false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["error"].as_str().unwrap().starts_with("failed to read field language"),
        "{json}"
    );
}

#[tokio::test]
async fn test_serve_drains_on_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let outcome = serve(
        listener,
        test_router(false),
        async {},
        Duration::from_secs(5),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ServeOutcome::Drained);
}
