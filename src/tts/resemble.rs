use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{header, Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::TtsError;
use crate::tts::voice::{Voice, VoiceMap, VoicePage};
use crate::tts::OutputFormat;

/// HTTP client for the Resemble AI synthesis and voice listing endpoints.
pub struct ResembleClient {
    client: Client,
    synthesis_url: String,
    voices_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

#[derive(Serialize)]
struct SynthesisPayload<'a> {
    voice_uuid: &'a str,
    data: &'a str,
    title: &'a str,
    output_format: &'a str,
}

#[derive(Deserialize)]
struct SynthesisResponse {
    audio_content: Option<String>,
}

impl ResembleClient {
    pub fn new(config: &Config) -> Result<Self, TtsError> {
        let client = Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| TtsError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            synthesis_url: config.synthesis_url.clone(),
            voices_url: config.voices_url.clone(),
            api_key: config
                .api_key
                .as_ref()
                .map(|key| SecretString::from(key.expose_secret())),
            timeout: config.request_timeout,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, TtsError> {
        let key = self.api_key.as_ref().ok_or_else(|| {
            TtsError::Configuration("RESEMBLE_API_KEY must be set in the environment variables".into())
        })?;

        Ok(builder
            .bearer_auth(key.expose_secret())
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout))
    }

    pub async fn fetch_voice_page(&self, page: u32) -> Result<VoicePage, TtsError> {
        tracing::debug!("Fetching Resemble voices page {}", page);

        let response = self
            .authorized(self.client.get(&self.voices_url).query(&[("page", page)]))?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Resemble voice listing failed on page {} ({}): {}", page, status, body);
            return Err(TtsError::remote_status(status, &body));
        }

        let page_data: VoicePage = response.json().await?;
        if !page_data.success {
            return Err(TtsError::RemoteService(format!(
                "Resemble AI reported failure listing voices (page {})",
                page
            )));
        }

        Ok(page_data)
    }

    /// Walks every page of the voice listing. Any failing page aborts the
    /// whole sweep and nothing collected so far is returned.
    pub async fn fetch_all_voices(&self) -> Result<VoiceMap, TtsError> {
        let mut voices = VoiceMap::new();
        let mut page = 1;

        loop {
            let data = self.fetch_voice_page(page).await?;

            for item in data.items {
                let voice = Voice::from(item);
                voices.insert(voice.id.clone(), voice);
            }

            if page >= data.num_pages {
                break;
            }
            page += 1;
        }

        Ok(voices)
    }

    /// Requests synthesis and returns the decoded audio bytes.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        format: OutputFormat,
        title: &str,
    ) -> Result<Vec<u8>, TtsError> {
        let payload = SynthesisPayload {
            voice_uuid: voice_id,
            data: text,
            title,
            output_format: format.extension(),
        };

        tracing::debug!(
            "Resemble TTS request: voice={}, format={}, input_len={}",
            voice_id,
            format,
            text.len()
        );

        let response = self
            .authorized(self.client.post(&self.synthesis_url))?
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Resemble synthesis failed ({}): {}", status, body);
            return Err(TtsError::remote_status(status, &body));
        }

        let body: SynthesisResponse = response.json().await?;
        let audio_base64 = body
            .audio_content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| TtsError::RemoteService("no audio content in Resemble AI response".into()))?;

        let audio = BASE64.decode(audio_base64.as_bytes())?;
        tracing::debug!("Resemble TTS synthesis complete, {} bytes", audio.len());

        Ok(audio)
    }
}
