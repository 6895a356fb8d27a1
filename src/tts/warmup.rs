use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::TtsError;
use crate::tts::TtsService;

/// Handle to the startup task that loads the voice catalog.
pub struct WarmupHandle {
    token: CancellationToken,
    handle: JoinHandle<Result<usize, TtsError>>,
}

/// Loads the voice catalog in the background.
///
/// Cancelling `token` drops the fetch wherever it is suspended. The cache is
/// only written after the last page arrives, so an aborted warmup leaves it
/// as it was.
pub fn spawn_warmup(service: Arc<TtsService>, token: CancellationToken) -> WarmupHandle {
    let task_token = token.clone();

    let handle = tokio::spawn(async move {
        tracing::info!("Warming up TTS voice cache");

        tokio::select! {
            biased;

            _ = task_token.cancelled() => {
                tracing::info!("Voice warmup cancelled");
                Err(TtsError::Cancelled)
            }
            result = service.voices() => match result {
                Ok(voices) => {
                    tracing::info!("Voice warmup complete: {} voices", voices.len());
                    Ok(voices.len())
                }
                Err(e) => {
                    tracing::warn!("Voice warmup failed, voices will load on first request: {}", e);
                    Err(e)
                }
            },
        }
    });

    WarmupHandle { token, handle }
}

impl WarmupHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the warmup to finish on its own.
    pub async fn join(self) -> Result<usize, TtsError> {
        join_outcome(self.handle.await)
    }

    /// Cancels the warmup if it is still running and waits for it to stop.
    pub async fn shutdown(self) -> Result<usize, TtsError> {
        self.token.cancel();
        self.join().await
    }
}

fn join_outcome(joined: Result<Result<usize, TtsError>, JoinError>) -> Result<usize, TtsError> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(TtsError::Cancelled),
        Err(e) => {
            tracing::error!("Voice warmup task panicked: {}", e);
            Err(TtsError::Warmup(e.to_string()))
        }
    }
}
