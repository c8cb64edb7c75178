use thiserror::Error;

/// Errors returned by feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("insufficient audio: need at least {need} samples, got {got}")]
    InsufficientAudio { need: usize, got: usize },
}
