use crate::engine_trait::{RecognitionEngine, VadEngine};
use std::collections::HashMap;
use voxscribe_core::{EngineError, RecognizerConfig, VadConfig};

pub type RecognizerLoader = fn(&RecognizerConfig) -> Result<Box<dyn RecognitionEngine>, EngineError>;
pub type VadLoader = fn(&VadConfig) -> Result<Box<dyn VadEngine>, EngineError>;

/// Maps engine family names from the config file to their loaders.
pub struct EngineRegistry {
    recognizers: HashMap<String, RecognizerLoader>,
    vads: HashMap<String, VadLoader>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            recognizers: HashMap::new(),
            vads: HashMap::new(),
        };
        registry.register_recognizer("null", crate::null_engine::NullEngine::load);
        registry.register_vad("energy", crate::energy_vad::EnergyVad::load);
        #[cfg(feature = "sherpa")]
        {
            registry.register_recognizer("moonshine", crate::sherpa::load_moonshine);
            registry.register_recognizer("zipformer", crate::sherpa::load_zipformer);
            registry.register_vad("silero", crate::sherpa::load_silero);
        }
        registry
    }

    pub fn register_recognizer(&mut self, name: &str, loader: RecognizerLoader) {
        self.recognizers.insert(name.to_string(), loader);
    }

    pub fn register_vad(&mut self, name: &str, loader: VadLoader) {
        self.vads.insert(name.to_string(), loader);
    }

    pub fn load_recognizer(
        &self,
        config: &RecognizerConfig,
    ) -> Result<Box<dyn RecognitionEngine>, EngineError> {
        let loader = self
            .recognizers
            .get(&config.engine)
            .ok_or_else(|| EngineError::EngineNotFound(config.engine.clone()))?;
        loader(config)
    }

    pub fn load_vad(&self, config: &VadConfig) -> Result<Box<dyn VadEngine>, EngineError> {
        let loader = self
            .vads
            .get(&config.engine)
            .ok_or_else(|| EngineError::EngineNotFound(config.engine.clone()))?;
        loader(config)
    }

    pub fn list_recognizers(&self) -> Vec<&str> {
        self.recognizers.keys().map(|s| s.as_str()).collect()
    }

    pub fn list_vads(&self) -> Vec<&str> {
        self.vads.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
