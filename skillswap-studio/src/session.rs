//! Live session handle.
//!
//! A session is a background task that bridges two channels: microphone
//! audio in, assistant output out. The handle owns a `CancellationToken`;
//! closing or dropping the handle cancels the task.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{StudioError, StudioResult};
use crate::ports::{AudioChunk, LiveOutput};

const CHANNEL_CAPACITY: usize = 64;

/// The task side of a live session.
pub struct SessionIo {
    /// Audio sent by the caller
    pub input: mpsc::Receiver<AudioChunk>,
    /// Output delivered to the caller
    pub output: mpsc::Sender<LiveOutput>,
    /// Fires when the caller closes the session
    pub cancel: CancellationToken,
}

/// Cloneable sender for a session's microphone input.
#[derive(Clone)]
pub struct AudioSender {
    input: mpsc::Sender<AudioChunk>,
    cancel: CancellationToken,
}

impl AudioSender {
    /// Stream a chunk of microphone audio.
    pub async fn send(&self, chunk: AudioChunk) -> StudioResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StudioError::SessionClosed);
        }
        self.input.send(chunk).await.map_err(|_| StudioError::SessionClosed)
    }
}

/// Caller's handle to a running live session.
pub struct LiveSession {
    input: mpsc::Sender<AudioChunk>,
    output: mpsc::Receiver<LiveOutput>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveSession {
    /// Spawn `driver` as the session task and return the handle.
    pub fn spawn<F, Fut>(driver: F) -> Self
    where
        F: FnOnce(SessionIo) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (input_tx, input_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (output_tx, output_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let io = SessionIo {
            input: input_rx,
            output: output_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(driver(io));

        Self {
            input: input_tx,
            output: output_rx,
            cancel,
            task: Some(task),
        }
    }

    /// Stream a chunk of microphone audio.
    pub async fn send_audio(&self, chunk: AudioChunk) -> StudioResult<()> {
        self.audio_sender().send(chunk).await
    }

    /// Sender usable from another task while this handle reads output.
    pub fn audio_sender(&self) -> AudioSender {
        AudioSender {
            input: self.input.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Wait for the next output; `None` once the session has ended.
    pub async fn next_output(&mut self) -> Option<LiveOutput> {
        tokio::select! {
            output = self.output.recv() => output,
            _ = self.cancel.cancelled() => None,
        }
    }

    /// True once closed or cancelled.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the session and wait for its task to stop.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Live session task ended abnormally");
            }
        }
        debug!("Live session closed");
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
