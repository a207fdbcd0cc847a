use voxscribe_core::{EngineError, SpeechSegment};

/// A loaded speech-recognition model.
///
/// Engines are not reentrant: callers hold the handle's lock for the whole
/// [`decode`](Self::decode) call. Dropping the engine releases the model.
pub trait RecognitionEngine: Send {
    /// Returns the engine family name (e.g. `"moonshine"`, `"null"`).
    fn name(&self) -> &str;
    /// Recognize a mono waveform sampled at `sample_rate`.
    fn decode(&mut self, sample_rate: u32, samples: &[f32]) -> Result<String, EngineError>;
}

/// A streaming voice-activity detector fed fixed-size windows.
pub trait VadEngine: Send {
    fn name(&self) -> &str;
    /// Number of samples per [`accept_waveform`](Self::accept_waveform) call.
    fn window_size(&self) -> usize;
    /// Feed exactly one window of samples.
    fn accept_waveform(&mut self, window: &[f32]);
    /// Close any segment still open at end of stream.
    fn flush(&mut self);
    /// Remove and return the oldest completed segment, if any.
    fn pop_segment(&mut self) -> Option<SpeechSegment>;
    /// Drop all buffered audio, segments and detector state.
    fn reset(&mut self);
}
