//! File-based stand-ins for the capture and transcription collaborators.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use voicegate_auth::{AudioSampler, CaptureError, Transcriber};
use voicegate_features::RawAudioFrame;

/// Serves one utterance from a raw mono s16le PCM file.
///
/// The file is one capture window, delivered exactly once per attempt; a
/// second capture call reports the device as exhausted instead of looping
/// on the same too-short clip forever.
pub struct PcmFileSampler {
    path: PathBuf,
    sample_rate: u32,
    consumed: Mutex<bool>,
}

impl PcmFileSampler {
    pub fn new(path: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            sample_rate,
            consumed: Mutex::new(false),
        }
    }
}

#[async_trait]
impl AudioSampler for PcmFileSampler {
    async fn capture(
        &self,
        _min_secs: f32,
        cancel: &CancellationToken,
    ) -> Result<RawAudioFrame, CaptureError> {
        if cancel.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        {
            let mut consumed = self.consumed.lock().unwrap();
            if *consumed {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "capture source exhausted: {}",
                    self.path.display()
                )));
            }
            *consumed = true;
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CaptureError::DeviceUnavailable(format!("{}: {e}", self.path.display()))
        })?;

        // s16le mono -> f32 in [-1, 1].
        let n_samples = bytes.len() / 2;
        let mut samples = Vec::with_capacity(n_samples);
        for i in 0..n_samples {
            let s = i16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]);
            samples.push(s as f32 / 32768.0);
        }

        Ok(RawAudioFrame::new(samples, self.sample_rate))
    }
}

/// Returns a transcript supplied up front, standing in for a speech
/// recognizer that already finalized the utterance.
pub struct FixedTranscriber {
    transcript: String,
}

impl FixedTranscriber {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
        }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _frame: &RawAudioFrame) -> Result<String, CaptureError> {
        Ok(self.transcript.clone())
    }
}
