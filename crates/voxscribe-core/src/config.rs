use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub engines: EnginesConfig,

    #[serde(default)]
    pub vad: Option<VadConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default = "default_max_audio_duration_s")]
    pub max_audio_duration_s: f64,

    #[serde(default = "default_vad_min_duration_s")]
    pub vad_min_duration_s: f64,

    #[serde(default = "default_max_chunk_duration_s")]
    pub max_chunk_duration_s: f64,

    #[serde(default = "default_hallucination_threshold")]
    pub hallucination_threshold: f64,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Scratch directory for converted and uploaded audio. Falls back to the
    /// system temp dir.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            max_audio_duration_s: default_max_audio_duration_s(),
            vad_min_duration_s: default_vad_min_duration_s(),
            max_chunk_duration_s: default_max_chunk_duration_s(),
            hallucination_threshold: default_hallucination_threshold(),
            ffmpeg_path: default_ffmpeg_path(),
            temp_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnginesConfig {
    #[serde(default = "default_en_engine")]
    pub en: RecognizerConfig,

    #[serde(default)]
    pub ru: Option<RecognizerConfig>,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            en: default_en_engine(),
            ru: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognizerConfig {
    /// Engine family registered in the engine registry.
    pub engine: String,

    #[serde(default)]
    pub model_dir: PathBuf,

    #[serde(default = "default_num_threads")]
    pub num_threads: u32,

    /// Name reported by the health endpoint; defaults to the engine family.
    #[serde(default)]
    pub model_name: Option<String>,
}

impl RecognizerConfig {
    pub fn display_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(&self.engine)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VadConfig {
    #[serde(default = "default_vad_engine")]
    pub engine: String,

    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Speech probability threshold for model-based detectors.
    #[serde(default = "default_vad_threshold")]
    pub threshold: f32,

    /// RMS level at which the energy detector treats a window as speech.
    #[serde(default = "default_energy_threshold")]
    pub energy_threshold: f32,

    #[serde(default = "default_min_silence_duration_s")]
    pub min_silence_duration_s: f32,

    #[serde(default = "default_min_speech_duration_s")]
    pub min_speech_duration_s: f32,

    #[serde(default = "default_buffer_size_s")]
    pub buffer_size_s: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            engine: default_vad_engine(),
            model_path: None,
            threshold: default_vad_threshold(),
            energy_threshold: default_energy_threshold(),
            min_silence_duration_s: default_min_silence_duration_s(),
            min_speech_duration_s: default_min_speech_duration_s(),
            buffer_size_s: default_buffer_size_s(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8092
}

fn default_request_timeout_secs() -> u64 {
    600
}

fn default_shutdown_grace_secs() -> u64 {
    30
}

fn default_max_upload_mb() -> usize {
    50
}

fn default_max_audio_duration_s() -> f64 {
    300.0
}

fn default_vad_min_duration_s() -> f64 {
    10.0
}

fn default_max_chunk_duration_s() -> f64 {
    25.0
}

fn default_hallucination_threshold() -> f64 {
    2.4
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_en_engine() -> RecognizerConfig {
    RecognizerConfig {
        engine: "null".to_string(),
        model_dir: PathBuf::new(),
        num_threads: default_num_threads(),
        model_name: None,
    }
}

fn default_num_threads() -> u32 {
    4
}

fn default_vad_engine() -> String {
    "energy".to_string()
}

fn default_vad_threshold() -> f32 {
    0.5
}

fn default_energy_threshold() -> f32 {
    0.01
}

fn default_min_silence_duration_s() -> f32 {
    0.5
}

fn default_min_speech_duration_s() -> f32 {
    0.25
}

fn default_buffer_size_s() -> f32 {
    60.0
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in env_var_pattern().captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}
