use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::TtsError;
use crate::tts::resemble::ResembleClient;

pub type VoiceMap = HashMap<String, Voice>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub status: String,
    pub default_language: String,
    pub voice_type: String,
    pub source: String,
    pub supported_languages: Vec<String>,
}

/// One page of the Resemble voice listing.
#[derive(Debug, Deserialize)]
pub struct VoicePage {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub num_pages: u32,
    #[serde(default)]
    pub items: Vec<RemoteVoice>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RemoteVoice {
    pub uuid: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub default_language: Option<String>,
    pub voice_type: Option<String>,
    pub source: Option<String>,
    pub supported_languages: Option<Vec<String>>,
}

impl From<RemoteVoice> for Voice {
    fn from(remote: RemoteVoice) -> Self {
        Self {
            id: remote.uuid,
            name: remote.name.unwrap_or_default(),
            status: remote.status.unwrap_or_default(),
            default_language: remote.default_language.unwrap_or_default(),
            voice_type: remote.voice_type.unwrap_or_default(),
            source: remote.source.unwrap_or_default(),
            supported_languages: remote.supported_languages.unwrap_or_default(),
        }
    }
}

/// Voice catalog shared by all requests.
///
/// The map is only ever swapped for a complete one, so readers see either the
/// previous catalog or the new one. Once filled it lives for the process.
pub struct VoiceCache {
    voices: RwLock<Arc<VoiceMap>>,
    /// Outcome of the last finished fill; held for the duration of a fill.
    fill: Mutex<Option<TtsError>>,
    /// Number of fills that ran to completion, successful or not.
    attempts: AtomicU64,
}

impl VoiceCache {
    pub fn new() -> Self {
        Self {
            voices: RwLock::new(Arc::new(HashMap::new())),
            fill: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> Arc<VoiceMap> {
        Arc::clone(&*self.voices.read().await)
    }

    pub async fn contains(&self, voice_id: &str) -> bool {
        self.voices.read().await.contains_key(voice_id)
    }

    pub async fn is_empty(&self) -> bool {
        self.voices.read().await.is_empty()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.voices.read().await.len()
    }

    #[cfg(test)]
    async fn replace(&self, voices: VoiceMap) {
        *self.voices.write().await = Arc::new(voices);
    }

    /// Returns the cached catalog, fetching every page first if it is empty.
    ///
    /// Concurrent cold callers share one fetch: anyone who queued behind a
    /// fill gets that fill's result instead of starting another sweep. A
    /// failed or dropped fetch leaves the cache untouched.
    pub async fn ensure_populated(&self, client: &ResembleClient) -> Result<Arc<VoiceMap>, TtsError> {
        let current = self.snapshot().await;
        if !current.is_empty() {
            return Ok(current);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last_error = self.fill.lock().await;

        // Another caller may have filled it while we waited
        let current = self.snapshot().await;
        if !current.is_empty() {
            return Ok(current);
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(e) = last_error.as_ref() {
                return Err(e.clone());
            }
        }

        let result = client.fetch_all_voices().await;
        self.attempts.fetch_add(1, Ordering::Release);

        match result {
            Ok(voices) => {
                let voices = Arc::new(voices);
                tracing::info!("Cached {} TTS voices", voices.len());

                *self.voices.write().await = Arc::clone(&voices);
                *last_error = None;
                Ok(voices)
            }
            Err(e) => {
                *last_error = Some(e.clone());
                Err(e)
            }
        }
    }
}
