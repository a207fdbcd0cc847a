use crate::engine_trait::RecognitionEngine;
use std::sync::{Mutex, PoisonError};
use voxscribe_core::{EngineError, Language, TranscribeError};

/// A loaded recognizer plus the lock that serializes access to it.
pub struct EngineHandle {
    language: Language,
    model_name: String,
    engine: Mutex<Box<dyn RecognitionEngine>>,
}

impl EngineHandle {
    pub fn new(
        language: Language,
        model_name: impl Into<String>,
        engine: Box<dyn RecognitionEngine>,
    ) -> Self {
        Self {
            language,
            model_name: model_name.into(),
            engine: Mutex::new(engine),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Decode while holding this engine's lock; the lock is released as soon
    /// as the engine returns.
    pub fn decode(&self, sample_rate: u32, samples: &[f32]) -> Result<String, EngineError> {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine.decode(sample_rate, samples)
    }
}

/// Routes recognition calls to the engine for the requested language.
///
/// Each language has its own lock, so decodes for different languages may
/// run concurrently while decodes for the same language never overlap.
pub struct Dispatcher {
    en: Option<EngineHandle>,
    ru: Option<EngineHandle>,
}

impl Dispatcher {
    pub fn new(en: Option<EngineHandle>, ru: Option<EngineHandle>) -> Self {
        Self { en, ru }
    }

    pub fn handle(&self, language: Language) -> Option<&EngineHandle> {
        match language {
            Language::En => self.en.as_ref(),
            Language::Ru => self.ru.as_ref(),
        }
    }

    pub fn is_available(&self, language: Language) -> bool {
        self.handle(language).is_some()
    }

    pub fn handles(&self) -> impl Iterator<Item = &EngineHandle> {
        self.en.iter().chain(self.ru.iter())
    }

    pub fn recognize(
        &self,
        samples: &[f32],
        sample_rate: u32,
        language: Language,
    ) -> Result<String, TranscribeError> {
        let handle = self
            .handle(language)
            .ok_or(TranscribeError::EngineUnavailable(language))?;
        Ok(handle.decode(sample_rate, samples)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullEngine;

    struct FixedEngine(&'static str);

    impl RecognitionEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn decode(&mut self, _sample_rate: u32, _samples: &[f32]) -> Result<String, EngineError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingEngine;

    impl RecognitionEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn decode(&mut self, _sample_rate: u32, _samples: &[f32]) -> Result<String, EngineError> {
            Err(EngineError::ProcessingFailed("decoder crashed".to_string()))
        }
    }

    fn both() -> Dispatcher {
        Dispatcher::new(
            Some(EngineHandle::new(Language::En, "en-model", Box::new(FixedEngine("hello")))),
            Some(EngineHandle::new(Language::Ru, "ru-model", Box::new(FixedEngine("привет")))),
        )
    }

    #[test]
    fn test_routes_by_language() {
        let dispatcher = both();
        assert_eq!(dispatcher.recognize(&[0.0; 16], 16000, Language::En).unwrap(), "hello");
        assert_eq!(dispatcher.recognize(&[0.0; 16], 16000, Language::Ru).unwrap(), "привет");
    }

    #[test]
    fn test_unknown_code_routes_to_english() {
        let dispatcher = both();
        let language = Language::from_code("fr");
        assert_eq!(dispatcher.recognize(&[0.0; 16], 16000, language).unwrap(), "hello");
    }

    #[test]
    fn test_missing_engine_is_unavailable() {
        let dispatcher = Dispatcher::new(
            Some(EngineHandle::new(Language::En, "null", Box::new(NullEngine::new()))),
            None,
        );
        assert!(!dispatcher.is_available(Language::Ru));
        match dispatcher.recognize(&[0.0; 16], 16000, Language::Ru) {
            Err(TranscribeError::EngineUnavailable(Language::Ru)) => {}
            other => panic!("expected EngineUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_engine_failure_propagates() {
        let dispatcher = Dispatcher::new(
            Some(EngineHandle::new(Language::En, "failing", Box::new(FailingEngine))),
            None,
        );
        assert!(matches!(
            dispatcher.recognize(&[0.0; 16], 16000, Language::En),
            Err(TranscribeError::Engine(EngineError::ProcessingFailed(_)))
        ));
    }

    #[test]
    fn test_handles_lists_loaded_engines() {
        let dispatcher = both();
        let names: Vec<_> = dispatcher.handles().map(|h| h.model_name()).collect();
        assert_eq!(names, vec!["en-model", "ru-model"]);
        assert_eq!(dispatcher.handle(Language::Ru).unwrap().language(), Language::Ru);
    }

    #[test]
    fn test_dispatcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
    }
}
