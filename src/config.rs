use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::TtsError;

pub const DEFAULT_SYNTHESIS_URL: &str = "https://f.cluster.resemble.ai/synthesize";
pub const DEFAULT_VOICES_URL: &str = "https://app.resemble.ai/api/v2/voices";
pub const DEFAULT_AUDIO_PATH: &str = "generated_audio";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Missing keys are tolerated at startup and rejected per request.
    pub api_key: Option<SecretString>,
    pub synthesis_url: String,
    pub voices_url: String,
    pub audio_dir: PathBuf,
    pub request_timeout: Duration,
    pub voice_warmup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, TtsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, TtsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| TtsError::Configuration(format!("PORT must be a number, got '{}'", v)))?,
            None => 8000,
        };

        let request_timeout = match get("RESEMBLE_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse().map_err(|_| {
                TtsError::Configuration(format!(
                    "RESEMBLE_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    v
                ))
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let voice_warmup = match get("VOICE_WARMUP") {
            Some(v) => parse_flag(&v).ok_or_else(|| {
                TtsError::Configuration(format!("VOICE_WARMUP must be true or false, got '{}'", v))
            })?,
            None => true,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_key: get("RESEMBLE_API_KEY").map(SecretString::from),
            synthesis_url: get("RESEMBLE_SYNTHESIS_URL")
                .unwrap_or_else(|| DEFAULT_SYNTHESIS_URL.to_string()),
            voices_url: get("RESEMBLE_VOICES_URL").unwrap_or_else(|| DEFAULT_VOICES_URL.to_string()),
            audio_dir: get("TTS_AUDIO_PATH")
                .unwrap_or_else(|| DEFAULT_AUDIO_PATH.to_string())
                .into(),
            request_timeout,
            voice_warmup,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, TtsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| TtsError::Configuration(format!("Invalid listen address: {}", e)))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
