use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempPath;
use voxscribe_core::{AudioError, CANONICAL_SAMPLE_RATE};

const TEMP_PREFIX: &str = "voxscribe_";

/// Audio ready for the PCM decoder.
///
/// A converted file lives in a temporary path that is removed when this value
/// is dropped, whether or not the request succeeded.
#[derive(Debug)]
pub enum NormalizedAudio {
    Passthrough(PathBuf),
    Converted(TempPath),
}

impl NormalizedAudio {
    pub fn path(&self) -> &Path {
        match self {
            NormalizedAudio::Passthrough(path) => path.as_path(),
            NormalizedAudio::Converted(temp) => &**temp,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, NormalizedAudio::Converted(_))
    }
}

/// Converts arbitrary input files to mono 16 kHz 16-bit WAV via ffmpeg.
#[derive(Debug, Clone)]
pub struct Normalizer {
    ffmpeg_path: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl Normalizer {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, temp_dir: Option<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            temp_dir,
        }
    }

    /// Files with a `.wav` extension skip conversion; the decoder validates them.
    pub fn is_canonical(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
    }

    pub fn normalize(&self, input: &Path) -> Result<NormalizedAudio, AudioError> {
        if Self::is_canonical(input) {
            return Ok(NormalizedAudio::Passthrough(input.to_path_buf()));
        }

        let output = self.temp_path(".wav")?;
        let sample_rate = CANONICAL_SAMPLE_RATE.to_string();
        tracing::debug!(input = %input.display(), output = %output.display(), "converting audio");

        let result = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-ar", &sample_rate, "-ac", "1", "-f", "wav"])
            // no LIST/INFO chunk, so the header stays at 44 bytes
            .args(["-map_metadata", "-1", "-fflags", "+bitexact"])
            .arg(&*output)
            .args(["-y", "-loglevel", "error"])
            .output()
            .map_err(|e| AudioError::Conversion {
                status: e.to_string(),
                stderr: String::new(),
            })?;

        if !result.status.success() {
            let mut diagnostics = String::from_utf8_lossy(&result.stderr).into_owned();
            diagnostics.push_str(&String::from_utf8_lossy(&result.stdout));
            tracing::warn!(
                input = %input.display(),
                status = %result.status,
                "ffmpeg conversion failed"
            );
            return Err(AudioError::Conversion {
                status: result.status.to_string(),
                stderr: diagnostics.trim().to_string(),
            });
        }

        Ok(NormalizedAudio::Converted(output))
    }

    /// Write uploaded bytes to a request-local temporary file, keeping the
    /// upload's extension (`wav` if none) so normalization can recognise it.
    pub fn stage_upload(
        &self,
        data: &[u8],
        extension: Option<&str>,
    ) -> Result<TempPath, AudioError> {
        let ext = extension
            .map(|e| e.trim_start_matches('.'))
            .filter(|e| !e.is_empty())
            .unwrap_or("wav");
        let path = self.temp_path(&format!(".{ext}"))?;
        std::fs::write(&path, data)?;
        Ok(path)
    }

    fn temp_path(&self, suffix: &str) -> Result<TempPath, AudioError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file.into_temp_path())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new("ffmpeg", None)
    }
}
