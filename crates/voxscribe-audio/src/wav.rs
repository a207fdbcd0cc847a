//! Canonical 44-byte-header PCM WAV decoding.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use voxscribe_core::{AudioBuffer, AudioError};

pub const WAV_HEADER_LEN: usize = 44;

const FULL_SCALE_16: f32 = 32768.0;

/// Fields read from the fixed-offset canonical header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavHeader {
    pub fn parse(header: &[u8]) -> Result<Self, AudioError> {
        if header.len() < WAV_HEADER_LEN {
            return Err(AudioError::MalformedInput(format!(
                "read header: expected {WAV_HEADER_LEN} bytes, got {}",
                header.len()
            )));
        }
        if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
            return Err(AudioError::MalformedInput(
                "read header: missing RIFF/WAVE signature".to_string(),
            ));
        }
        Ok(Self {
            channels: u16::from_le_bytes([header[22], header[23]]),
            sample_rate: u32::from_le_bytes([header[24], header[25], header[26], header[27]]),
            bits_per_sample: u16::from_le_bytes([header[34], header[35]]),
        })
    }
}

/// Decode a canonical WAV file into mono `f32` samples.
pub fn decode_file(path: &Path) -> Result<AudioBuffer, AudioError> {
    let file = File::open(path)?;
    decode_reader(file)
}

/// Decode canonical WAV bytes from any reader.
///
/// 16-bit stereo is downmixed by averaging each frame. A trailing partial
/// frame is ignored.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<AudioBuffer, AudioError> {
    let mut header = [0u8; WAV_HEADER_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|e| AudioError::MalformedInput(format!("read header: {e}")))?;
    let header = WavHeader::parse(&header)?;

    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| AudioError::MalformedInput(format!("read payload: {e}")))?;

    let samples = match (header.bits_per_sample, header.channels) {
        (16, 1) => data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / FULL_SCALE_16)
            .collect(),
        (16, 2) => data
            .chunks_exact(4)
            .map(|b| {
                let left = i16::from_le_bytes([b[0], b[1]]) as f32;
                let right = i16::from_le_bytes([b[2], b[3]]) as f32;
                (left + right) / 2.0 / FULL_SCALE_16
            })
            .collect(),
        (bits_per_sample, channels) => {
            return Err(AudioError::UnsupportedFormat {
                bits_per_sample,
                channels,
            })
        }
    };

    Ok(AudioBuffer {
        samples,
        sample_rate: header.sample_rate,
        channels: header.channels,
    })
}
