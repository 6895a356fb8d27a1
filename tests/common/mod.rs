#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use echobook_server::config::Config;
use echobook_server::tts::TtsService;
use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const API_KEY: &str = "test-key";
pub const VOICES_PATH: &str = "/api/v2/voices";
pub const SYNTHESIS_PATH: &str = "/synthesize";

pub fn test_config(server: &MockServer, audio_dir: &Path, api_key: Option<&str>) -> Config {
    let key = api_key.map(str::to_string);
    let uri = server.uri();
    let dir = audio_dir.display().to_string();

    Config::from_lookup(|name| match name {
        "RESEMBLE_API_KEY" => key.clone(),
        "RESEMBLE_SYNTHESIS_URL" => Some(format!("{}{}", uri, SYNTHESIS_PATH)),
        "RESEMBLE_VOICES_URL" => Some(format!("{}{}", uri, VOICES_PATH)),
        "TTS_AUDIO_PATH" => Some(dir.clone()),
        "RESEMBLE_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn test_service(server: &MockServer, audio_dir: &Path) -> Arc<TtsService> {
    Arc::new(TtsService::new(&test_config(server, audio_dir, Some(API_KEY))).unwrap())
}

pub fn voice_json(id: &str) -> Value {
    json!({
        "uuid": id,
        "name": format!("Voice {}", id),
        "status": "finished",
        "default_language": "en-US",
        "voice_type": "professional",
        "supported_languages": ["en-US"],
        "source": "Resemble Voice Library"
    })
}

pub fn voice_page(num_pages: u32, ids: &[&str]) -> Value {
    json!({
        "success": true,
        "page": 1,
        "num_pages": num_pages,
        "items": ids.iter().map(|id| voice_json(id)).collect::<Vec<_>>()
    })
}

/// Mounts one mock per page, each expected to be hit exactly once.
pub async fn mount_voice_pages(server: &MockServer, pages: &[&[&str]]) {
    let num_pages = pages.len() as u32;
    for (i, ids) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(VOICES_PATH))
            .and(query_param("page", (i + 1).to_string()))
            .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(voice_page(num_pages, ids)))
            .expect(1)
            .mount(server)
            .await;
    }
}

pub async fn mount_synthesis(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(SYNTHESIS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
