use crate::engine_trait::VadEngine;
use std::collections::VecDeque;
use voxscribe_core::{EngineError, SpeechSegment, VadConfig, CANONICAL_SAMPLE_RATE};

pub const DEFAULT_WINDOW_SIZE: usize = 512;

struct OpenSegment {
    start: usize,
    samples: Vec<f32>,
    trailing_silence: usize,
}

/// RMS-threshold voice activity detector.
///
/// A window whose RMS reaches `threshold` is speech. A segment closes after
/// `min_silence` windows of silence; the trailing silence is trimmed and the
/// segment is dropped if it holds fewer than `min_speech` windows of audio.
pub struct EnergyVad {
    window_size: usize,
    threshold: f32,
    min_speech_windows: usize,
    min_silence_windows: usize,
    position: usize,
    current: Option<OpenSegment>,
    ready: VecDeque<SpeechSegment>,
}

impl EnergyVad {
    pub fn new(threshold: f32, min_speech_s: f32, min_silence_s: f32, window_size: usize) -> Self {
        let windows = |secs: f32| {
            let samples = (secs.max(0.0) * CANONICAL_SAMPLE_RATE as f32).ceil() as usize;
            samples.div_ceil(window_size).max(1)
        };
        Self {
            window_size,
            threshold,
            min_speech_windows: windows(min_speech_s),
            min_silence_windows: windows(min_silence_s),
            position: 0,
            current: None,
            ready: VecDeque::new(),
        }
    }

    pub fn load(config: &VadConfig) -> Result<Box<dyn VadEngine>, EngineError> {
        if !config.energy_threshold.is_finite() || config.energy_threshold <= 0.0 {
            return Err(EngineError::InitializationFailed(format!(
                "energy_threshold must be positive, got {}",
                config.energy_threshold
            )));
        }
        Ok(Box::new(Self::new(
            config.energy_threshold,
            config.min_speech_duration_s,
            config.min_silence_duration_s,
            DEFAULT_WINDOW_SIZE,
        )))
    }

    fn rms(window: &[f32]) -> f32 {
        if window.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = window.iter().map(|s| s * s).sum();
        (sum_sq / window.len() as f32).sqrt()
    }

    fn close_current(&mut self) {
        let Some(mut open) = self.current.take() else {
            return;
        };
        let trailing = (open.trailing_silence * self.window_size).min(open.samples.len());
        open.samples.truncate(open.samples.len() - trailing);
        if open.samples.len() >= self.min_speech_windows * self.window_size {
            self.ready.push_back(SpeechSegment {
                start: open.start,
                samples: open.samples,
            });
        }
    }
}

impl VadEngine for EnergyVad {
    fn name(&self) -> &str {
        "energy"
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn accept_waveform(&mut self, window: &[f32]) {
        let is_speech = Self::rms(window) >= self.threshold;
        let position = self.position;
        self.position += window.len();

        let mut close = false;
        match self.current.as_mut() {
            Some(open) => {
                open.samples.extend_from_slice(window);
                if is_speech {
                    open.trailing_silence = 0;
                } else {
                    open.trailing_silence += 1;
                    close = open.trailing_silence >= self.min_silence_windows;
                }
            }
            None if is_speech => {
                self.current = Some(OpenSegment {
                    start: position,
                    samples: window.to_vec(),
                    trailing_silence: 0,
                });
            }
            None => {}
        }
        if close {
            self.close_current();
        }
    }

    fn flush(&mut self) {
        self.close_current();
    }

    fn pop_segment(&mut self) -> Option<SpeechSegment> {
        self.ready.pop_front()
    }

    fn reset(&mut self) {
        self.position = 0;
        self.current = None;
        self.ready.clear();
    }
}
