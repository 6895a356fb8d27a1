use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error returned by everything under `crate::tts`.
///
/// Lower-level failures (transport, decoding, filesystem) are converted into
/// one of these variants before they leave the service layer.
#[derive(thiserror::Error, Debug, Clone)]
pub enum TtsError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    RemoteService(String),

    #[error("Network error when calling Resemble AI: {0}")]
    Network(String),

    #[error("{0}")]
    Synthesis(String),

    #[error("Voice warmup cancelled")]
    Cancelled,

    #[error("Voice warmup task failed: {0}")]
    Warmup(String),
}

impl TtsError {
    pub fn remote_status(status: reqwest::StatusCode, body: &str) -> Self {
        TtsError::RemoteService(format!(
            "Resemble AI returned {}: {}",
            status.as_u16(),
            body
        ))
    }
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TtsError::RemoteService(format!("Malformed response from Resemble AI: {}", e))
        } else {
            TtsError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for TtsError {
    fn from(e: std::io::Error) -> Self {
        TtsError::Synthesis(format!("Failed to store audio: {}", e))
    }
}

impl From<base64::DecodeError> for TtsError {
    fn from(e: base64::DecodeError) -> Self {
        TtsError::Synthesis(format!("Failed to decode audio content: {}", e))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Error generating TTS: {0}")]
    Synthesis(TtsError),

    #[error("Error fetching TTS voices: {0}")]
    Voices(TtsError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        tracing::error!("Request failed: {}", message);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: message }),
        )
            .into_response()
    }
}
