use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use echobook_server::api::routes::{create_router, AppState};
use echobook_server::config::Config;
use echobook_server::tts::{spawn_warmup, TtsService};

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configuration from environment
    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.addr().expect("Invalid address");

    tracing::info!("Echobook AI API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Audio output directory: {}", config.audio_dir.display());

    if config.api_key.is_none() {
        tracing::warn!("RESEMBLE_API_KEY is not set; synthesis and voice listing will fail");
    }

    // Create TTS service
    let tts = Arc::new(TtsService::new(&config).expect("Failed to create TTS service"));

    let shutdown = CancellationToken::new();
    let warmup = if config.voice_warmup && config.api_key.is_some() {
        Some(spawn_warmup(Arc::clone(&tts), shutdown.child_token()))
    } else {
        None
    };

    // Create app state
    let state = Arc::new(AppState { tts });

    // Create router
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let server_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await
        .expect("Server error");

    if let Some(warmup) = warmup {
        // Result was already logged by the task
        let _ = warmup.shutdown().await;
    }

    tracing::info!("Echobook AI API stopped");
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
