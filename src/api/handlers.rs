use axum::{extract::State, Json};
use std::sync::Arc;

use super::{GenerateAudioRequest, GenerateAudioResponse, HealthResponse, WelcomeResponse};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::tts::VoiceMap;

pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Echobook AI API".to_string(),
    })
}

pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateAudioRequest>,
) -> Result<Json<GenerateAudioResponse>, AppError> {
    tracing::debug!(
        "Generate audio: voice={}, format={}, text_len={}",
        request.voice_id,
        request.output_format,
        request.text.len()
    );

    let path = state
        .tts
        .synthesize(
            &request.text,
            &request.voice_id,
            &request.output_format,
            &request.title,
        )
        .await
        .map_err(AppError::Synthesis)?;

    Ok(Json(GenerateAudioResponse {
        audio_path: path.to_string_lossy().into_owned(),
    }))
}

pub async fn list_voices(State(state): State<Arc<AppState>>) -> Result<Json<VoiceMap>, AppError> {
    let voices = state.tts.voices().await.map_err(AppError::Voices)?;
    Ok(Json(voices.as_ref().clone()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
