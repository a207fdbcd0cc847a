//! sherpa-onnx backed engines: Moonshine (EN), offline Zipformer
//! transducer (RU) and Silero VAD.

use crate::engine_trait::{RecognitionEngine, VadEngine};
use sherpa_rs::moonshine::{MoonshineConfig, MoonshineRecognizer};
use sherpa_rs::silero_vad::{SileroVad, SileroVadConfig};
use sherpa_rs::zipformer::{ZipFormer, ZipFormerConfig};
use std::path::Path;
use voxscribe_core::{EngineError, RecognizerConfig, SpeechSegment, VadConfig, CANONICAL_SAMPLE_RATE};

const SILERO_WINDOW_SIZE: usize = 512;

fn model_file(dir: &Path, file: &str) -> Result<String, EngineError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(EngineError::InitializationFailed(format!(
            "model file not found: {}",
            path.display()
        )));
    }
    Ok(path.to_string_lossy().into_owned())
}

pub struct MoonshineEngine {
    recognizer: MoonshineRecognizer,
}

pub fn load_moonshine(config: &RecognizerConfig) -> Result<Box<dyn RecognitionEngine>, EngineError> {
    let dir = config.model_dir.as_path();
    let moonshine = MoonshineConfig {
        preprocessor: model_file(dir, "preprocess.onnx")?,
        encoder: model_file(dir, "encode.int8.onnx")?,
        uncached_decoder: model_file(dir, "uncached_decode.int8.onnx")?,
        cached_decoder: model_file(dir, "cached_decode.int8.onnx")?,
        tokens: model_file(dir, "tokens.txt")?,
        provider: Some("cpu".to_string()),
        num_threads: Some(config.num_threads as i32),
        debug: false,
    };
    let recognizer = MoonshineRecognizer::new(moonshine)
        .map_err(|e| EngineError::InitializationFailed(format!("moonshine: {e}")))?;
    tracing::info!(model_dir = %dir.display(), "moonshine recognizer loaded");
    Ok(Box::new(MoonshineEngine { recognizer }))
}

impl RecognitionEngine for MoonshineEngine {
    fn name(&self) -> &str {
        "moonshine"
    }

    fn decode(&mut self, sample_rate: u32, samples: &[f32]) -> Result<String, EngineError> {
        Ok(self.recognizer.transcribe(sample_rate, samples).text)
    }
}

pub struct ZipformerEngine {
    recognizer: ZipFormer,
}

pub fn load_zipformer(config: &RecognizerConfig) -> Result<Box<dyn RecognitionEngine>, EngineError> {
    let dir = config.model_dir.as_path();
    let zipformer = ZipFormerConfig {
        encoder: model_file(dir, "encoder.int8.onnx")?,
        decoder: model_file(dir, "decoder.int8.onnx")?,
        joiner: model_file(dir, "joiner.int8.onnx")?,
        tokens: model_file(dir, "tokens.txt")?,
        num_threads: Some(config.num_threads as i32),
        provider: Some("cpu".to_string()),
        debug: false,
    };
    let recognizer = ZipFormer::new(zipformer)
        .map_err(|e| EngineError::InitializationFailed(format!("zipformer: {e}")))?;
    tracing::info!(model_dir = %dir.display(), "zipformer recognizer loaded");
    Ok(Box::new(ZipformerEngine { recognizer }))
}

impl RecognitionEngine for ZipformerEngine {
    fn name(&self) -> &str {
        "zipformer"
    }

    fn decode(&mut self, sample_rate: u32, samples: &[f32]) -> Result<String, EngineError> {
        Ok(self.recognizer.decode(sample_rate, samples.to_vec()))
    }
}

pub struct SileroVadEngine {
    vad: SileroVad,
}

pub fn load_silero(config: &VadConfig) -> Result<Box<dyn VadEngine>, EngineError> {
    let model_path = config.model_path.as_deref().ok_or_else(|| {
        EngineError::InitializationFailed("silero vad requires 'model_path'".to_string())
    })?;
    if !model_path.is_file() {
        return Err(EngineError::InitializationFailed(format!(
            "model file not found: {}",
            model_path.display()
        )));
    }
    let silero = SileroVadConfig {
        model: model_path.to_string_lossy().into_owned(),
        threshold: config.threshold,
        min_silence_duration: config.min_silence_duration_s,
        min_speech_duration: config.min_speech_duration_s,
        sample_rate: CANONICAL_SAMPLE_RATE,
        window_size: SILERO_WINDOW_SIZE as i32,
        ..Default::default()
    };
    let vad = SileroVad::new(silero, config.buffer_size_s)
        .map_err(|e| EngineError::InitializationFailed(format!("silero vad: {e}")))?;
    tracing::info!(model = %model_path.display(), "silero vad loaded");
    Ok(Box::new(SileroVadEngine { vad }))
}

impl VadEngine for SileroVadEngine {
    fn name(&self) -> &str {
        "silero"
    }

    fn window_size(&self) -> usize {
        SILERO_WINDOW_SIZE
    }

    fn accept_waveform(&mut self, window: &[f32]) {
        self.vad.accept_waveform(window.to_vec());
    }

    fn flush(&mut self) {
        self.vad.flush();
    }

    fn pop_segment(&mut self) -> Option<SpeechSegment> {
        if self.vad.is_empty() {
            return None;
        }
        let segment = self.vad.front();
        self.vad.pop();
        Some(SpeechSegment {
            start: segment.start.max(0) as usize,
            samples: segment.samples,
        })
    }

    fn reset(&mut self) {
        self.vad.clear();
        self.vad.reset();
    }
}
