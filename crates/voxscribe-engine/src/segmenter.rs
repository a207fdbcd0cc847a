use crate::engine_trait::VadEngine;
use std::sync::{Mutex, MutexGuard, PoisonError};
use voxscribe_core::{AudioBuffer, Chunk, SpeechSegment};

/// Exclusive use of the shared detector for one request. The detector is
/// reset when the session ends, whatever happened during it.
struct VadSession<'a> {
    vad: MutexGuard<'a, Box<dyn VadEngine>>,
}

impl Drop for VadSession<'_> {
    fn drop(&mut self) {
        self.vad.reset();
    }
}

/// Splits a buffer into duration-bounded chunks of detected speech.
pub struct Segmenter {
    name: String,
    vad: Mutex<Box<dyn VadEngine>>,
    max_chunk_duration_s: f64,
}

impl Segmenter {
    pub fn new(vad: Box<dyn VadEngine>, max_chunk_duration_s: f64) -> Self {
        Self {
            name: vad.name().to_string(),
            vad: Mutex::new(vad),
            max_chunk_duration_s,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn VadEngine>> {
        self.vad.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the whole buffer through the detector and group the detected
    /// speech into chunks. An empty result means no speech was found.
    pub fn segment(&self, buffer: &AudioBuffer) -> Vec<Chunk> {
        let segments = self.detect(&buffer.samples);
        let max_samples = (self.max_chunk_duration_s * buffer.sample_rate as f64) as usize;
        group_into_chunks(segments, max_samples)
    }

    fn detect(&self, samples: &[f32]) -> Vec<SpeechSegment> {
        let mut session = VadSession { vad: self.lock() };
        let window_size = session.vad.window_size().max(1);

        let mut windows = samples.chunks_exact(window_size);
        for window in windows.by_ref() {
            session.vad.accept_waveform(window);
        }
        let tail = windows.remainder();
        if !tail.is_empty() {
            let mut padded = vec![0.0; window_size];
            padded[..tail.len()].copy_from_slice(tail);
            session.vad.accept_waveform(&padded);
        }
        session.vad.flush();

        let mut segments = Vec::new();
        while let Some(mut segment) = session.vad.pop_segment() {
            // zero padding may extend the last segment past the real tail
            if segment.start >= samples.len() {
                continue;
            }
            let available = samples.len() - segment.start;
            segment.samples.truncate(available);
            if !segment.samples.is_empty() {
                segments.push(segment);
            }
        }
        segments
    }
}

/// Greedily pack segments into chunks of at most `max_samples`.
///
/// A segment that would push a non-empty chunk over the limit starts a new
/// chunk. Segments are never split, so a single oversized segment becomes
/// its own chunk.
pub fn group_into_chunks(
    segments: impl IntoIterator<Item = SpeechSegment>,
    max_samples: usize,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Chunk::default();

    for segment in segments {
        if !current.is_empty() && current.samples.len() + segment.samples.len() > max_samples {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(segment);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
