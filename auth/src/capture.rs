use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use voicegate_features::RawAudioFrame;

/// Errors reported by the capture/transcription collaborators.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("capture cancelled")]
    Cancelled,

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Produces raw PCM capture windows.
///
/// Implementations accumulate samples until the window holds at least
/// `min_secs` of audio at the device's actual rate. The window is bounded
/// by sample count, not wall-clock time, so `cancel` is the caller's
/// timeout/abort mechanism and must be honored. The frame carries the real
/// device sample rate; nothing downstream assumes a fixed one.
#[async_trait]
pub trait AudioSampler: Send + Sync {
    async fn capture(
        &self,
        min_secs: f32,
        cancel: &CancellationToken,
    ) -> Result<RawAudioFrame, CaptureError>;
}

/// Produces one finalized transcript per captured utterance.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, frame: &RawAudioFrame) -> Result<String, CaptureError>;
}
