use crate::dispatcher::{Dispatcher, EngineHandle};
use crate::registry::EngineRegistry;
use crate::segmenter::Segmenter;
use std::thread::ScopedJoinHandle;
use std::time::Instant;
use voxscribe_core::{AppConfig, EngineError, Language, RecognizerConfig, CANONICAL_SAMPLE_RATE};

/// Load state of one language, as reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStatus {
    pub language: Language,
    pub model: Option<String>,
    pub ready: bool,
}

/// Every model the service holds for its lifetime.
///
/// Built once at startup and shared read-only by all requests. Dropping it
/// releases the native models.
pub struct Engines {
    dispatcher: Dispatcher,
    segmenter: Option<Segmenter>,
}

impl Engines {
    pub fn new(dispatcher: Dispatcher, segmenter: Option<Segmenter>) -> Self {
        Self {
            dispatcher,
            segmenter,
        }
    }

    /// Load the configured models. The EN and RU recognizers load in
    /// parallel.
    ///
    /// Only an EN failure is fatal: a RU or VAD failure is logged and leaves
    /// that capability disabled.
    pub fn load(config: &AppConfig, registry: &EngineRegistry) -> Result<Self, EngineError> {
        let started = Instant::now();

        let (en, ru) = std::thread::scope(|scope| {
            let en = scope.spawn(|| load_recognizer(registry, Language::En, &config.engines.en));
            let ru = config
                .engines
                .ru
                .as_ref()
                .map(|ru| scope.spawn(move || load_recognizer(registry, Language::Ru, ru)));
            (join_loader(en), ru.map(join_loader))
        });

        let en = en?;
        let ru = match ru {
            Some(Ok(handle)) => Some(handle),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "RU model failed to load, RU transcription unavailable");
                None
            }
            None => {
                tracing::info!("no RU model configured, RU transcription unavailable");
                None
            }
        };

        let segmenter = match &config.vad {
            Some(vad) => match registry.load_vad(vad) {
                Ok(engine) => {
                    tracing::info!(engine = engine.name(), "VAD loaded");
                    Some(Segmenter::new(
                        engine,
                        config.transcription.max_chunk_duration_s,
                    ))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "VAD failed to load, segmentation disabled");
                    None
                }
            },
            None => {
                tracing::info!("VAD not configured, segmentation disabled");
                None
            }
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "engines loaded"
        );
        Ok(Self::new(Dispatcher::new(Some(en), ru), segmenter))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn segmenter(&self) -> Option<&Segmenter> {
        self.segmenter.as_ref()
    }

    pub fn vad_enabled(&self) -> bool {
        self.segmenter.is_some()
    }

    pub fn language_status(&self, language: Language) -> LanguageStatus {
        let handle = self.dispatcher.handle(language);
        LanguageStatus {
            language,
            model: handle.map(|h| h.model_name().to_string()),
            ready: handle.is_some(),
        }
    }

    /// Push one second of silence through every loaded recognizer so the
    /// first real request does not pay for lazy initialization.
    pub fn warm_up(&self) {
        let silence = vec![0.0f32; CANONICAL_SAMPLE_RATE as usize];
        for handle in self.dispatcher.handles() {
            let started = Instant::now();
            match handle.decode(CANONICAL_SAMPLE_RATE, &silence) {
                Ok(_) => tracing::info!(
                    language = %handle.language(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "warm-up done"
                ),
                Err(e) => tracing::warn!(
                    language = %handle.language(),
                    error = %e,
                    "warm-up failed"
                ),
            }
        }
    }
}

fn load_recognizer(
    registry: &EngineRegistry,
    language: Language,
    config: &RecognizerConfig,
) -> Result<EngineHandle, EngineError> {
    let started = Instant::now();
    let engine = registry.load_recognizer(config)?;
    tracing::info!(
        language = %language,
        engine = engine.name(),
        model = config.display_name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model loaded"
    );
    Ok(EngineHandle::new(language, config.display_name(), engine))
}

fn join_loader(
    handle: ScopedJoinHandle<'_, Result<EngineHandle, EngineError>>,
) -> Result<EngineHandle, EngineError> {
    handle.join().unwrap_or_else(|_| {
        Err(EngineError::InitializationFailed(
            "model loader panicked".to_string(),
        ))
    })
}
