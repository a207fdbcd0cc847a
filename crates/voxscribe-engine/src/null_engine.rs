use crate::engine_trait::RecognitionEngine;
use std::sync::atomic::{AtomicUsize, Ordering};
use voxscribe_core::{EngineError, RecognizerConfig};

/// Recognizer that reports how many samples it received instead of text.
///
/// Lets the service run end to end without model files.
pub struct NullEngine {
    decode_count: AtomicUsize,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            decode_count: AtomicUsize::new(0),
        }
    }

    pub fn load(_config: &RecognizerConfig) -> Result<Box<dyn RecognitionEngine>, EngineError> {
        Ok(Box::new(Self::new()))
    }

    pub fn decode_count(&self) -> usize {
        self.decode_count.load(Ordering::Relaxed)
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn decode(&mut self, sample_rate: u32, samples: &[f32]) -> Result<String, EngineError> {
        let count = self.decode_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("NullEngine decode #{count}, {} samples @ {sample_rate}Hz", samples.len());
        Ok(format!("[null] {} samples", samples.len()))
    }
}
