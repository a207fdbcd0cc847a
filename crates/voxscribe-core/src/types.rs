use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Sample rate every recognition engine expects.
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

/// Decoded PCM audio as normalized `f32` samples in `[-1.0, 1.0]`.
///
/// `channels` records the layout at ingestion time; after decoding the
/// samples themselves are always mono.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_secs() * 1000.0
    }
}

/// A run of samples the VAD classified as speech.
///
/// `start` is the offset of the first sample within the buffer that was fed
/// to the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSegment {
    pub start: usize,
    pub samples: Vec<f32>,
}

/// One or more adjacent speech segments submitted to an engine as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub start: usize,
    pub samples: Vec<f32>,
    pub segment_count: usize,
}

impl Chunk {
    pub fn is_empty(&self) -> bool {
        self.segment_count == 0
    }

    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / sample_rate as f64
    }

    pub fn push(&mut self, segment: SpeechSegment) {
        if self.segment_count == 0 {
            self.start = segment.start;
        }
        self.samples.extend(segment.samples);
        self.segment_count += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
}

impl Language {
    /// `ru` selects Russian; anything else, including an empty code, is English.
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("ru") {
            Language::Ru
        } else {
            Language::En
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Caller's choice about speech segmentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VadOverride {
    #[default]
    Auto,
    ForceOn,
    ForceOff,
}

impl From<Option<bool>> for VadOverride {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => VadOverride::Auto,
            Some(true) => VadOverride::ForceOn,
            Some(false) => VadOverride::ForceOff,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AudioSource {
    Path(PathBuf),
    /// Uploaded bytes; `extension` is the original file extension without
    /// the leading dot.
    Bytes {
        data: Vec<u8>,
        extension: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub source: AudioSource,
    pub language: Language,
    pub vad: VadOverride,
}

impl TranscriptionRequest {
    pub fn from_path(path: impl Into<PathBuf>, language: Language, vad: VadOverride) -> Self {
        Self {
            source: AudioSource::Path(path.into()),
            language,
            vad,
        }
    }
}

/// Wire shape of a transcription response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptionResult {
    pub fn failure(message: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            text: String::new(),
            duration_ms,
            speech_ms: None,
            error: Some(message.into()),
        }
    }
}

/// Coarse outcome class the boundary layer maps onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    Ok,
    BadRequest,
    Unprocessable,
    Unavailable,
    Internal,
}
