use crate::types::{Language, StatusHint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("ffmpeg: {status} {stderr}")]
    Conversion { status: String, stderr: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("unsupported WAV: {bits_per_sample}bit {channels}ch")]
    UnsupportedFormat { bits_per_sample: u16, channels: u16 },

    #[error("audio I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("engine processing failed: {0}")]
    ProcessingFailed(String),

    #[error("engine not found: {0}")]
    EngineNotFound(String),
}

/// Everything that can end a transcription request.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("unsupported sample rate {found} (need {expected})")]
    UnsupportedSampleRate { found: u32, expected: u32 },

    #[error("audio too long: {duration_s:.1}s > max {max_s:.0}s")]
    AudioTooLong { duration_s: f64, max_s: f64 },

    #[error("{0} model not loaded")]
    EngineUnavailable(Language),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl TranscribeError {
    pub fn status_hint(&self) -> StatusHint {
        match self {
            TranscribeError::Audio(AudioError::Conversion { .. }) => StatusHint::Unprocessable,
            TranscribeError::Audio(_) => StatusHint::BadRequest,
            TranscribeError::UnsupportedSampleRate { .. } => StatusHint::BadRequest,
            TranscribeError::AudioTooLong { .. } => StatusHint::BadRequest,
            TranscribeError::EngineUnavailable(_) => StatusHint::Unavailable,
            TranscribeError::Engine(_) => StatusHint::Internal,
        }
    }
}
