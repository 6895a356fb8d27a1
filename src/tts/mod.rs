pub mod resemble;
pub mod voice;
pub mod warmup;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::Config;
use crate::error::TtsError;

pub use resemble::ResembleClient;
pub use voice::{Voice, VoiceCache, VoiceMap};
pub use warmup::{spawn_warmup, WarmupHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp3,
    Wav,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Wav => "wav",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp3" => Ok(OutputFormat::Mp3),
            "wav" => Ok(OutputFormat::Wav),
            other => Err(TtsError::InvalidArgument(format!(
                "Unsupported output format '{}' (expected mp3 or wav)",
                other
            ))),
        }
    }
}

pub struct TtsService {
    client: ResembleClient,
    voices: VoiceCache,
    audio_dir: PathBuf,
}

impl TtsService {
    pub fn new(config: &Config) -> Result<Self, TtsError> {
        Ok(Self {
            client: ResembleClient::new(config)?,
            voices: VoiceCache::new(),
            audio_dir: config.audio_dir.clone(),
        })
    }

    pub fn cache(&self) -> &VoiceCache {
        &self.voices
    }

    /// All known voices, fetched from Resemble on first use.
    pub async fn voices(&self) -> Result<Arc<VoiceMap>, TtsError> {
        self.voices.ensure_populated(&self.client).await
    }

    /// Membership check against whatever is cached right now. Never fetches,
    /// so every id is rejected until the catalog has been loaded.
    pub async fn is_valid_voice(&self, voice_id: &str) -> bool {
        self.voices.contains(voice_id).await
    }

    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        output_format: &str,
        title: &str,
    ) -> Result<PathBuf, TtsError> {
        // 1. Credentials
        if !self.client.has_api_key() {
            return Err(TtsError::Configuration(
                "RESEMBLE_API_KEY must be set in the environment variables".into(),
            ));
        }

        // 2. Input
        let format: OutputFormat = output_format.parse()?;

        if text.is_empty() {
            return Err(TtsError::InvalidArgument("Text cannot be empty".into()));
        }

        // 3. Voice
        self.voices().await?;
        if !self.is_valid_voice(voice_id).await {
            return Err(TtsError::InvalidArgument(format!(
                "Voice '{}' is not available",
                voice_id
            )));
        }

        // 4. Synthesize and store
        let audio = self.client.synthesize(text, voice_id, format, title).await?;
        let path = self.store_audio(&audio, format).await?;

        tracing::info!("Generated {} bytes of audio at {}", audio.len(), path.display());

        Ok(path)
    }

    async fn store_audio(&self, audio: &[u8], format: OutputFormat) -> Result<PathBuf, TtsError> {
        let path = self
            .audio_dir
            .join(format!("{}.{}", Uuid::new_v4().simple(), format.extension()));

        tokio::fs::create_dir_all(&self.audio_dir).await?;

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        // The file is ours from here on. Rebinding `file` after the guard
        // makes the handle close before the guard removes the path.
        let pending = PendingAudioFile::new(path);
        let mut file = file;

        file.write_all(audio).await?;
        file.flush().await?;

        Ok(pending.commit())
    }
}

/// Removes a freshly created audio file on drop unless it was committed.
///
/// Covers both write errors and the request future being dropped mid-write.
struct PendingAudioFile {
    path: Option<PathBuf>,
}

impl PendingAudioFile {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn commit(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for PendingAudioFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to remove partial audio file {}: {}", path.display(), e);
            } else {
                tracing::debug!("Removed partial audio file {}", path.display());
            }
        }
    }
}
