pub mod handlers;
pub mod routes;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateAudioRequest {
    pub text: String,
    pub voice_id: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_output_format() -> String {
    "mp3".to_string()
}

fn default_title() -> String {
    "TTS".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateAudioResponse {
    pub audio_path: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
