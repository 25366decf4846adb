use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{stream::BoxStream, FutureExt, StreamExt};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::{sync::oneshot, task::JoinHandle};

pub const RECORDING_MIME: &str = "video/webm";

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("screen capture permission denied")]
    PermissionDenied,
    #[error("screen capture unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("Could not start recording. Please ensure you grant screen sharing permissions.")]
    Capture(#[from] CaptureError),
    #[error("already recording")]
    AlreadyRecording,
    #[error("recording task failed: {0}")]
    Collector(#[from] tokio::task::JoinError),
    #[error("could not timestamp recording: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// A live track of a capture; stopping it releases the screen/mic.
pub trait MediaTrack: Send {
    fn stop(&mut self);
}

/// An open screen capture: encoded chunks as the encoder emits them, plus its tracks.
pub struct Capture {
    pub chunks: BoxStream<'static, Bytes>,
    pub tracks: Vec<Box<dyn MediaTrack>>,
}

#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Prompts for a display capture with audio.
    async fn capture(&self) -> Result<Capture, CaptureError>;
}

/// The finished recording, ready to hand to the user as a download.
#[derive(Debug, Clone)]
pub struct RecordingFile {
    pub file_name: String,
    pub mime: &'static str,
    pub data: Bytes,
}

impl RecordingFile {
    pub async fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.data).await?;
        Ok(path)
    }
}

struct Active {
    stop: oneshot::Sender<()>,
    collector: JoinHandle<Vec<Bytes>>,
}

/// Local recording toggle: idle until [`Recorder::start`], recording until [`Recorder::stop`].
#[derive(Default)]
pub struct Recorder {
    active: Option<Active>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub async fn start(&mut self, source: &dyn CaptureSource) -> Result<(), RecordingError> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }

        let capture = source.capture().await.map_err(|err| {
            tracing::error!(error = %err, "error starting recording");
            err
        })?;

        let (stop, stopped) = oneshot::channel();
        let collector = tokio::spawn(collect(capture, stopped));
        self.active = Some(Active { stop, collector });
        tracing::info!("recording started");
        Ok(())
    }

    /// Ends the recording and assembles every chunk captured since start.
    /// Stopping while idle does nothing.
    pub async fn stop(&mut self) -> Result<Option<RecordingFile>, RecordingError> {
        let Some(Active { stop, collector }) = self.active.take() else {
            return Ok(None);
        };

        let _ = stop.send(());
        let chunks = collector.await?;

        let mut data = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in &chunks {
            data.extend_from_slice(chunk);
        }

        let file_name = format!(
            "UbuntuMeet-Recording-{}.webm",
            OffsetDateTime::now_utc().format(&Rfc3339)?
        );
        tracing::info!(%file_name, chunks = chunks.len(), bytes = data.len(), "recording stopped");

        Ok(Some(RecordingFile {
            file_name,
            mime: RECORDING_MIME,
            data: data.freeze(),
        }))
    }
}

async fn collect(mut capture: Capture, mut stopped: oneshot::Receiver<()>) -> Vec<Bytes> {
    let mut chunks = Vec::new();

    loop {
        tokio::select! {
            biased;
            chunk = capture.chunks.next() => match chunk {
                Some(chunk) => keep(&mut chunks, chunk),
                None => break,
            },
            _ = &mut stopped => {
                // whatever the encoder already flushed still belongs to this recording
                while let Some(Some(chunk)) = capture.chunks.next().now_or_never() {
                    keep(&mut chunks, chunk);
                }
                break;
            }
        }
    }

    for track in &mut capture.tracks {
        track.stop();
    }
    chunks
}

fn keep(chunks: &mut Vec<Bytes>, chunk: Bytes) {
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
}
