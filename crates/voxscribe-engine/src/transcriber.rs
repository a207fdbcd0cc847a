use crate::engines::Engines;
use crate::hallucination::HallucinationFilter;
use crate::segmenter::Segmenter;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempPath;
use voxscribe_audio::Normalizer;
use voxscribe_core::{
    AudioSource, Chunk, StatusHint, TranscribeError, TranscriptionConfig, TranscriptionRequest,
    TranscriptionResult, VadOverride, CANONICAL_SAMPLE_RATE,
};

/// Limits applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptionSettings {
    pub max_audio_duration_s: f64,
    /// Auto mode segments audio at least this long.
    pub vad_min_duration_s: f64,
    pub hallucination_threshold: f64,
}

impl From<&TranscriptionConfig> for TranscriptionSettings {
    fn from(config: &TranscriptionConfig) -> Self {
        Self {
            max_audio_duration_s: config.max_audio_duration_s,
            vad_min_duration_s: config.vad_min_duration_s,
            hallucination_threshold: config.hallucination_threshold,
        }
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self::from(&TranscriptionConfig::default())
    }
}

/// Where the orchestrator reads the request's audio from. Uploads are
/// staged to a temporary file that is removed when this is dropped.
enum Input<'a> {
    Path(&'a Path),
    Upload(TempPath),
}

impl Input<'_> {
    fn path(&self) -> &Path {
        match self {
            Input::Path(path) => *path,
            Input::Upload(temp) => &**temp,
        }
    }
}

/// Runs one request end to end: normalize, decode, validate, segment,
/// recognize each chunk, filter and join.
pub struct Transcriber {
    engines: Arc<Engines>,
    normalizer: Normalizer,
    filter: HallucinationFilter,
    settings: TranscriptionSettings,
}

impl Transcriber {
    pub fn new(engines: Arc<Engines>, normalizer: Normalizer, settings: TranscriptionSettings) -> Self {
        Self {
            engines,
            normalizer,
            filter: HallucinationFilter::new(settings.hallucination_threshold),
            settings,
        }
    }

    pub fn from_config(engines: Arc<Engines>, config: &TranscriptionConfig) -> Self {
        let normalizer = Normalizer::new(&config.ffmpeg_path, config.temp_dir.clone());
        Self::new(engines, normalizer, TranscriptionSettings::from(config))
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    /// Transcribe and classify the outcome for the boundary layer. Failures
    /// carry their message in `error` and the elapsed time so far.
    pub fn run(&self, request: &TranscriptionRequest) -> (TranscriptionResult, StatusHint) {
        let started = Instant::now();
        match self.transcribe(request) {
            Ok(result) => (result, StatusHint::Ok),
            Err(e) => {
                let hint = e.status_hint();
                tracing::warn!(language = %request.language, error = %e, ?hint, "transcription failed");
                (TranscriptionResult::failure(e.to_string(), elapsed_ms(started)), hint)
            }
        }
    }

    pub fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResult, TranscribeError> {
        let started = Instant::now();
        let language = request.language;

        // fail before touching the audio
        if !self.engines.dispatcher().is_available(language) {
            return Err(TranscribeError::EngineUnavailable(language));
        }

        let input = match &request.source {
            AudioSource::Path(path) => Input::Path(path),
            AudioSource::Bytes { data, extension } => {
                Input::Upload(self.normalizer.stage_upload(data, extension.as_deref())?)
            }
        };
        let normalized = self.normalizer.normalize(input.path())?;
        let buffer = voxscribe_audio::decode_file(normalized.path())?;
        drop(normalized);
        drop(input);

        if buffer.sample_rate != CANONICAL_SAMPLE_RATE {
            return Err(TranscribeError::UnsupportedSampleRate {
                found: buffer.sample_rate,
                expected: CANONICAL_SAMPLE_RATE,
            });
        }
        let duration_s = buffer.duration_secs();
        if duration_s > self.settings.max_audio_duration_s {
            return Err(TranscribeError::AudioTooLong {
                duration_s,
                max_s: self.settings.max_audio_duration_s,
            });
        }

        let sample_rate = buffer.sample_rate;
        let (chunks, speech_ms) = match self.segmenter_for(request.vad, duration_s) {
            Some(segmenter) => {
                let chunks = segmenter.segment(&buffer);
                let speech_samples: usize = chunks.iter().map(|c| c.samples.len()).sum();
                let speech_ms = speech_samples as f64 * 1000.0 / sample_rate as f64;
                tracing::info!(
                    language = %language,
                    vad = segmenter.name(),
                    audio_s = duration_s,
                    speech_s = speech_ms / 1000.0,
                    silence_removed_pct = silence_removed_pct(speech_ms, duration_s),
                    chunks = chunks.len(),
                    segments = chunks.iter().map(|c| c.segment_count).sum::<usize>(),
                    "speech segmented"
                );
                (chunks, Some(speech_ms))
            }
            None => (
                vec![Chunk {
                    start: 0,
                    samples: buffer.samples,
                    segment_count: 1,
                }],
                None,
            ),
        };

        let mut texts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let raw = self
                .engines
                .dispatcher()
                .recognize(&chunk.samples, sample_rate, language)?;
            let text = self.filter.apply(raw.trim().to_string());
            if !text.is_empty() {
                texts.push(text);
            }
        }

        let result = TranscriptionResult {
            text: texts.join(" "),
            duration_ms: elapsed_ms(started),
            speech_ms,
            error: None,
        };
        tracing::info!(
            language = %language,
            audio_s = duration_s,
            chunks = chunks.len(),
            duration_ms = result.duration_ms,
            chars = result.text.chars().count(),
            "transcribed"
        );
        Ok(result)
    }

    fn segmenter_for(&self, vad: VadOverride, duration_s: f64) -> Option<&Segmenter> {
        let segmenter = self.engines.segmenter()?;
        match vad {
            VadOverride::ForceOn => Some(segmenter),
            VadOverride::ForceOff => None,
            VadOverride::Auto if duration_s >= self.settings.vad_min_duration_s => Some(segmenter),
            VadOverride::Auto => None,
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_millis() as f64
}

fn silence_removed_pct(speech_ms: f64, duration_s: f64) -> f64 {
    if duration_s <= 0.0 {
        return 0.0;
    }
    (100.0 * (1.0 - speech_ms / (duration_s * 1000.0))).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Dispatcher, EngineHandle};
    use crate::{EnergyVad, NullEngine};
    use voxscribe_core::{EngineError, Language};

    fn engines(with_vad: bool) -> Arc<Engines> {
        let dispatcher = Dispatcher::new(
            Some(EngineHandle::new(Language::En, "null", Box::new(NullEngine::new()))),
            None,
        );
        let segmenter = with_vad.then(|| {
            Segmenter::new(Box::new(EnergyVad::new(0.01, 0.25, 0.5, 512)), 25.0)
        });
        Arc::new(Engines::new(dispatcher, segmenter))
    }

    #[test]
    fn test_unavailable_language_fails_before_reading_audio() {
        let transcriber = Transcriber::new(engines(false), Normalizer::default(), TranscriptionSettings::default());
        let request = TranscriptionRequest::from_path("/does/not/exist.wav", Language::Ru, VadOverride::Auto);
        let (result, hint) = transcriber.run(&request);
        assert_eq!(hint, StatusHint::Unavailable);
        assert_eq!(result.error.as_deref(), Some("ru model not loaded"));
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_missing_file_is_bad_request() {
        let transcriber = Transcriber::new(engines(false), Normalizer::default(), TranscriptionSettings::default());
        let request = TranscriptionRequest::from_path("/does/not/exist.wav", Language::En, VadOverride::Auto);
        let (result, hint) = transcriber.run(&request);
        assert_eq!(hint, StatusHint::BadRequest);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_segmenter_choice() {
        let settings = TranscriptionSettings {
            vad_min_duration_s: 10.0,
            ..TranscriptionSettings::default()
        };
        let with_vad = Transcriber::new(engines(true), Normalizer::default(), settings);
        assert!(with_vad.segmenter_for(VadOverride::Auto, 10.0).is_some());
        assert!(with_vad.segmenter_for(VadOverride::Auto, 9.9).is_none());
        assert!(with_vad.segmenter_for(VadOverride::ForceOn, 1.0).is_some());
        assert!(with_vad.segmenter_for(VadOverride::ForceOff, 60.0).is_none());

        let without_vad = Transcriber::new(engines(false), Normalizer::default(), settings);
        assert!(without_vad.segmenter_for(VadOverride::ForceOn, 60.0).is_none());
    }

    #[test]
    fn test_silence_removed_pct() {
        assert_eq!(silence_removed_pct(5000.0, 20.0), 75.0);
        assert_eq!(silence_removed_pct(0.0, 0.0), 0.0);
        assert_eq!(silence_removed_pct(21_000.0, 20.0), 0.0);
    }

    #[test]
    fn test_settings_from_config() {
        let settings = TranscriptionSettings::from(&TranscriptionConfig::default());
        assert_eq!(settings.max_audio_duration_s, 300.0);
        assert_eq!(settings.vad_min_duration_s, 10.0);
        assert_eq!(settings.hallucination_threshold, 2.4);
    }

    #[test]
    fn test_engine_error_is_internal() {
        let err = TranscribeError::from(EngineError::ProcessingFailed("boom".into()));
        assert_eq!(err.status_hint(), StatusHint::Internal);
    }
}
