//! Compression-ratio guard against looping decoder output.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub const DEFAULT_THRESHOLD: f64 = 2.4;

/// Texts with fewer characters than this are never judged.
pub const MIN_SCORED_LEN: usize = 10;

/// Ratio of the text's byte length to its zlib-compressed length.
///
/// Returns 0 for texts shorter than [`MIN_SCORED_LEN`].
pub fn compression_ratio(text: &str) -> f64 {
    if text.chars().count() < MIN_SCORED_LEN {
        return 0.0;
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let compressed = encoder
        .write_all(text.as_bytes())
        .and_then(|_| encoder.finish());
    match compressed {
        Ok(bytes) if !bytes.is_empty() => text.len() as f64 / bytes.len() as f64,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HallucinationFilter {
    threshold: f64,
}

impl HallucinationFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Returns the text unchanged, or an empty string when it scores above
    /// the threshold.
    pub fn apply(&self, text: String) -> String {
        let ratio = compression_ratio(&text);
        if ratio > self.threshold {
            tracing::warn!(
                ratio,
                threshold = self.threshold,
                text = %text,
                "clearing likely hallucination"
            );
            return String::new();
        }
        text
    }
}

impl Default for HallucinationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
