//! Passphrase and voiceprint gated developer-mode authentication.
//!
//! # Architecture
//!
//! One attempt flows through four stages:
//!
//! 1. [`AuthStateMachine::start_attempt`]: lockout check, `Locked` ->
//!    `Listening`
//! 2. capture + transcription via the [`AudioSampler`] / [`Transcriber`]
//!    capability traits (externally driven, cancellable)
//! 3. [`AuthStateMachine::on_phrase_recognized`]: passphrase check,
//!    feature extraction, then enrollment or similarity scoring
//! 4. outcome: `Authenticated` / `Failed`, mirrored on the
//!    [`AuthEvent`] channel and into [`PrivilegedSessionController`]
//!
//! The machine is polymorphic over its collaborators: audio capture,
//! transcription, and print persistence are all injected, and the core
//! never touches a platform audio API.
//!
//! # Failure accounting
//!
//! Phrase mismatches and low-similarity outcomes count toward lockout
//! (3 strikes). Device failures and too-short captures do not: the former
//! fails the attempt without counting, the latter keeps the session in
//! `Listening` so the caller can recapture.

mod capture;
mod error;
mod event;
mod machine;
mod phrases;
mod privileged;
mod session;

pub use capture::{AudioSampler, CaptureError, Transcriber};
pub use error::AuthError;
pub use event::{AuthEvent, AuthEventKind};
pub use machine::{AuthConfig, AuthOutcome, AuthStateMachine, MAX_FAILED_ATTEMPTS, SIMILARITY_THRESHOLD};
pub use phrases::PassphraseSet;
pub use privileged::PrivilegedSessionController;
pub use session::{AuthSession, AuthState};
