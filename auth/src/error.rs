use thiserror::Error;
use voicegate_features::FeatureError;
use voicegate_store::StoreError;

use crate::session::AuthState;

/// Errors returned by authentication operations.
///
/// `Device` and `InsufficientAudio` are recoverable and never counted
/// toward lockout; `PhraseMismatch` and `LowSimilarity` are counted;
/// `LockedOut` refuses the attempt before any capture happens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("capture device unavailable: {0}")]
    Device(String),

    /// The capture window was too short; the session stays in `Listening`
    /// and the caller should recapture.
    #[error(transparent)]
    InsufficientAudio(#[from] FeatureError),

    #[error("transcript does not match any passphrase")]
    PhraseMismatch,

    #[error("voiceprint similarity {similarity:.3} is below threshold")]
    LowSimilarity { similarity: f32 },

    #[error("locked out after {attempts} failed attempts")]
    LockedOut { attempts: u32 },

    /// The requested transition is not valid from the current state
    /// (e.g. starting an attempt while one is already listening).
    #[error("operation not valid while {state}")]
    InvalidState { state: AuthState },

    #[error("attempt cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] StoreError),
}
