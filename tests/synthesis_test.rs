mod common;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use common::{files_in, mount_synthesis, mount_voice_pages, test_service, SYNTHESIS_PATH};
use echobook_server::error::TtsError;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn test_synthesize_writes_decoded_audio() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_voice_pages(&server, &[&["v1"]]).await;

    Mock::given(method("POST"))
        .and(path(SYNTHESIS_PATH))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "voice_uuid": "v1",
            "data": "Once upon a time",
            "title": "Chapter 1",
            "output_format": "wav"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "audio_content": BASE64.encode("hello")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tts = test_service(&server, dir.path());
    let path = tts
        .synthesize("Once upon a time", "v1", "wav", "Chapter 1")
        .await
        .unwrap();

    assert!(path.starts_with(dir.path()));
    assert_eq!(path.extension().unwrap(), "wav");
    assert_eq!(std::fs::read(&path).unwrap(), b"hello");
}

#[tokio::test]
async fn test_unknown_voice_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_voice_pages(&server, &[&["v1", "v2"]]).await;

    Mock::given(method("POST"))
        .and(path(SYNTHESIS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tts = test_service(&server, dir.path());
    let err = tts.synthesize("Hello", "ghost", "mp3", "TTS").await.unwrap_err();

    assert!(matches!(err, TtsError::InvalidArgument(_)));
    assert!(err.to_string().contains("ghost"));
}

#[tokio::test]
async fn test_invalid_input_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let tts = test_service(&server, dir.path());

    for format in ["ogg", "MP3", "", "flac"] {
        let err = tts.synthesize("Hello", "v1", format, "TTS").await.unwrap_err();
        assert!(matches!(err, TtsError::InvalidArgument(_)), "format {:?}", format);
    }

    let err = tts.synthesize("", "v1", "mp3", "TTS").await.unwrap_err();
    assert!(matches!(err, TtsError::InvalidArgument(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_audio_content() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_voice_pages(&server, &[&["v1"]]).await;
    mount_synthesis(&server, json!({ "success": true })).await;

    let tts = test_service(&server, dir.path());
    let err = tts.synthesize("Hello", "v1", "mp3", "TTS").await.unwrap_err();

    assert!(matches!(err, TtsError::RemoteService(_)));
    assert!(err.to_string().to_lowercase().contains("no audio content"));
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_remote_error_status() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_voice_pages(&server, &[&["v1"]]).await;

    Mock::given(method("POST"))
        .and(path(SYNTHESIS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let tts = test_service(&server, dir.path());
    let err = tts.synthesize("Hello", "v1", "mp3", "TTS").await.unwrap_err();

    assert!(matches!(err, TtsError::RemoteService(_)));
    assert!(err.to_string().contains("429"));
    assert!(err.to_string().contains("rate limited"));
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_undecodable_audio() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_voice_pages(&server, &[&["v1"]]).await;
    mount_synthesis(&server, json!({ "audio_content": "not base64!!" })).await;

    let tts = test_service(&server, dir.path());
    let err = tts.synthesize("Hello", "v1", "mp3", "TTS").await.unwrap_err();

    assert!(matches!(err, TtsError::Synthesis(_)));
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_network_failure() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_voice_pages(&server, &[&["v1"]]).await;

    let config = echobook_server::config::Config {
        synthesis_url: "http://127.0.0.1:9/synthesize".to_string(),
        ..common::test_config(&server, dir.path(), Some(common::API_KEY))
    };
    let tts = echobook_server::tts::TtsService::new(&config).unwrap();

    let err = tts.synthesize("Hello", "v1", "mp3", "TTS").await.unwrap_err();
    assert!(matches!(err, TtsError::Network(_)));
}
