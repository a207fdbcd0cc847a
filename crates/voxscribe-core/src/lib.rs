pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, EnginesConfig, GeneralConfig, RecognizerConfig, ServerConfig, TranscriptionConfig,
    VadConfig,
};
pub use error::{AudioError, ConfigError, EngineError, TranscribeError};
pub use types::{
    AudioBuffer, AudioSource, Chunk, Language, SpeechSegment, StatusHint, TranscriptionRequest,
    TranscriptionResult, VadOverride, CANONICAL_SAMPLE_RATE,
};
