pub mod dispatcher;
pub mod energy_vad;
pub mod engine_trait;
pub mod engines;
pub mod hallucination;
pub mod null_engine;
pub mod registry;
pub mod segmenter;
#[cfg(feature = "sherpa")]
pub mod sherpa;
pub mod transcriber;

pub use dispatcher::{Dispatcher, EngineHandle};
pub use energy_vad::EnergyVad;
pub use engine_trait::{RecognitionEngine, VadEngine};
pub use engines::{Engines, LanguageStatus};
pub use hallucination::{compression_ratio, HallucinationFilter};
pub use null_engine::NullEngine;
pub use registry::EngineRegistry;
pub use segmenter::{group_into_chunks, Segmenter};
pub use transcriber::{Transcriber, TranscriptionSettings};

/// Inference runtime the recognizers are built on, as reported by `/health`.
pub const RUNTIME: &str = if cfg!(feature = "sherpa") {
    "sherpa-onnx"
} else {
    "builtin"
};
