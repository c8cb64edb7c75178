use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use voicegate_features::{compare, extract, ExtractorConfig, RawAudioFrame};
use voicegate_store::VoicePrintStore;

use crate::capture::{AudioSampler, CaptureError, Transcriber};
use crate::error::AuthError;
use crate::event::{AuthEvent, AuthEventKind};
use crate::phrases::PassphraseSet;
use crate::session::{AuthSession, AuthState};

/// Minimum similarity for a candidate print to pass authentication.
pub const SIMILARITY_THRESHOLD: f32 = 0.70;

/// Counted failures before further attempts are refused.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// Configuration for [`AuthStateMachine`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub passphrases: PassphraseSet,
    pub extractor: ExtractorConfig,
    /// Similarity floor for authentication (default: [`SIMILARITY_THRESHOLD`]).
    pub similarity_threshold: f32,
    /// Counted failures before lockout (default: [`MAX_FAILED_ATTEMPTS`]).
    pub max_failed_attempts: u32,
    /// Optional lockout cooldown. `None` (the default) keeps
    /// [`AuthStateMachine::reset_enrollment`] as the sole recovery path;
    /// with `Some(d)`, the failure counter clears once `d` has elapsed
    /// since the last counted failure.
    pub lockout_cooldown: Option<Duration>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            passphrases: PassphraseSet::default(),
            extractor: ExtractorConfig::default(),
            similarity_threshold: SIMILARITY_THRESHOLD,
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            lockout_cooldown: None,
        }
    }
}

/// Successful result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthOutcome {
    /// Setup mode stored a new enrollment print.
    Enrolled,
    /// The candidate print matched the enrolled one.
    Authenticated { similarity: f32 },
}

/// Orchestrates phrase validation, enrollment vs. authentication, lockout,
/// and session state transitions.
///
/// The machine owns the one [`AuthSession`] of the process. The voiceprint
/// store is injected; the machine never holds an enrolled print beyond the
/// duration of a single attempt. State-change notifications go out on the
/// [`AuthEvent`] channel handed back by [`AuthStateMachine::new`].
pub struct AuthStateMachine {
    cfg: AuthConfig,
    store: Arc<dyn VoicePrintStore>,
    session: AuthSession,
    last_counted_failure: Option<Instant>,
    events: mpsc::UnboundedSender<AuthEvent>,
}

impl AuthStateMachine {
    /// Creates a machine over the given store and returns it together with
    /// the outbound event receiver. Starts in setup mode when the store
    /// holds no enrollment yet.
    pub fn new(
        cfg: AuthConfig,
        store: Arc<dyn VoicePrintStore>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<AuthEvent>), AuthError> {
        let enrolled = store.get()?.is_some();
        let (events, rx) = mpsc::unbounded_channel();
        let machine = Self {
            cfg,
            store,
            session: AuthSession::new(!enrolled),
            last_counted_failure: None,
            events,
        };
        Ok((machine, rx))
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state
    }

    /// Begins an attempt: `Locked`/`Failed` -> `Listening`.
    ///
    /// Refused with [`AuthError::LockedOut`] once the failure counter has
    /// reached its limit (before any capture happens), unless a configured
    /// cooldown has elapsed. Rejected with [`AuthError::InvalidState`]
    /// while another attempt is listening or the session is authenticated.
    pub fn start_attempt(&mut self) -> Result<(), AuthError> {
        match self.session.state {
            AuthState::Locked | AuthState::Failed => {}
            state => return Err(AuthError::InvalidState { state }),
        }

        if self.session.failed_attempts >= self.cfg.max_failed_attempts {
            let cooled = match (self.cfg.lockout_cooldown, self.last_counted_failure) {
                (Some(cooldown), Some(at)) => at.elapsed() >= cooldown,
                _ => false,
            };
            if !cooled {
                warn!(
                    attempts = self.session.failed_attempts,
                    "attempt refused: locked out"
                );
                return Err(AuthError::LockedOut {
                    attempts: self.session.failed_attempts,
                });
            }
            info!("lockout cooldown elapsed, clearing failure counter");
            self.session.failed_attempts = 0;
            self.last_counted_failure = None;
        }

        self.session.state = AuthState::Listening;
        debug!(setup = self.session.setup_mode, "attempt started, listening");
        Ok(())
    }

    /// Consumes the finalized transcript and its capture window.
    /// Only valid while `Listening`.
    ///
    /// A transcript that matches no passphrase fails the attempt and counts
    /// toward lockout without running feature extraction. A too-short
    /// capture keeps the session in `Listening` and returns
    /// [`AuthError::InsufficientAudio`] so the caller recaptures. Otherwise
    /// the extracted print is either enrolled (setup mode) or scored
    /// against the stored one.
    pub fn on_phrase_recognized(
        &mut self,
        transcript: &str,
        frame: &RawAudioFrame,
    ) -> Result<AuthOutcome, AuthError> {
        if self.session.state != AuthState::Listening {
            return Err(AuthError::InvalidState {
                state: self.session.state,
            });
        }

        if !self.cfg.passphrases.matches(transcript) {
            self.fail_counted(None);
            return Err(AuthError::PhraseMismatch);
        }

        let print = match extract(frame, &self.cfg.extractor) {
            Ok(print) => print,
            Err(err) => {
                debug!(%err, "capture window too short, staying in listening");
                return Err(err.into());
            }
        };

        if self.session.setup_mode {
            if let Err(err) = self.store.put(&print) {
                self.fail_uncounted(None);
                return Err(err.into());
            }
            self.session.state = AuthState::Authenticated;
            self.session.developer_mode_active = true;
            self.session.failed_attempts = 0;
            self.session.setup_mode = false;
            self.session.last_authenticated_at = Some(Utc::now());
            info!("voiceprint enrolled, developer mode active");
            self.emit(AuthEventKind::SetupComplete, None, None);
            return Ok(AuthOutcome::Enrolled);
        }

        let enrolled = match self.store.get() {
            Ok(enrolled) => enrolled,
            Err(err) => {
                self.fail_uncounted(None);
                return Err(err.into());
            }
        };
        let similarity = compare(&print, enrolled.as_ref());

        if similarity >= self.cfg.similarity_threshold {
            self.session.state = AuthState::Authenticated;
            self.session.developer_mode_active = true;
            self.session.failed_attempts = 0;
            self.session.last_authenticated_at = Some(Utc::now());
            info!(similarity, "voice authenticated, developer mode active");
            self.emit(AuthEventKind::Authenticated, Some(similarity), None);
            Ok(AuthOutcome::Authenticated { similarity })
        } else {
            self.fail_counted(Some(similarity));
            Err(AuthError::LowSimilarity { similarity })
        }
    }

    /// Records a capture-device failure: `Listening` -> `Failed`, not
    /// counted toward lockout. Returns the error to propagate.
    pub fn on_device_error(&mut self, reason: &str) -> AuthError {
        warn!(reason, "capture device unavailable");
        self.fail_uncounted(None);
        AuthError::Device(reason.to_string())
    }

    /// Aborts an in-flight attempt: `Listening` -> `Locked`, with no side
    /// effects on the enrolled print and nothing counted.
    pub fn cancel_attempt(&mut self) {
        if self.session.state == AuthState::Listening {
            debug!("attempt cancelled");
            self.session.state = AuthState::Locked;
        }
    }

    /// Leaves developer mode: `Authenticated` -> `Locked`.
    pub fn exit_privileged(&mut self) -> Result<(), AuthError> {
        if self.session.state != AuthState::Authenticated {
            return Err(AuthError::InvalidState {
                state: self.session.state,
            });
        }
        self.session.state = AuthState::Locked;
        self.session.developer_mode_active = false;
        info!("developer mode exited");
        self.emit(AuthEventKind::DeveloperModeExit, None, None);
        Ok(())
    }

    /// Deletes the enrolled print and rearms setup mode, from any state.
    /// Also clears the failure counter (the manual lockout recovery path).
    pub fn reset_enrollment(&mut self) -> Result<(), AuthError> {
        self.store.delete()?;
        let was_privileged = self.session.developer_mode_active;
        self.session.state = AuthState::Locked;
        self.session.developer_mode_active = false;
        self.session.setup_mode = true;
        self.session.failed_attempts = 0;
        self.last_counted_failure = None;
        info!("enrollment reset, setup mode rearmed");
        if was_privileged {
            self.emit(AuthEventKind::DeveloperModeExit, None, None);
        }
        Ok(())
    }

    /// Drives one full attempt against the capture and transcription
    /// collaborators: start, capture, transcribe, evaluate.
    ///
    /// Recaptures while the window comes back too short. Cancellation via
    /// `cancel` deterministically returns the session to `Locked` without
    /// touching the enrolled print. A device failure fails the attempt
    /// without counting it.
    pub async fn run_attempt(
        &mut self,
        sampler: &dyn AudioSampler,
        transcriber: &dyn Transcriber,
        cancel: &CancellationToken,
    ) -> Result<AuthOutcome, AuthError> {
        self.start_attempt()?;
        let min_secs = self.cfg.extractor.min_capture_secs;

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    self.cancel_attempt();
                    return Err(AuthError::Cancelled);
                }
                captured = sampler.capture(min_secs, cancel) => match captured {
                    Ok(frame) => frame,
                    Err(CaptureError::Cancelled) => {
                        self.cancel_attempt();
                        return Err(AuthError::Cancelled);
                    }
                    Err(err) => return Err(self.on_device_error(&err.to_string())),
                },
            };

            let transcript = match transcriber.transcribe(&frame).await {
                Ok(transcript) => transcript,
                Err(CaptureError::Cancelled) => {
                    self.cancel_attempt();
                    return Err(AuthError::Cancelled);
                }
                Err(err) => return Err(self.on_device_error(&err.to_string())),
            };

            match self.on_phrase_recognized(&transcript, &frame) {
                Err(AuthError::InsufficientAudio(err)) => {
                    debug!(%err, "recapturing");
                    continue;
                }
                outcome => return outcome,
            }
        }
    }

    /// Terminal failure that counts toward lockout.
    fn fail_counted(&mut self, similarity: Option<f32>) {
        self.session.state = AuthState::Failed;
        self.session.failed_attempts += 1;
        self.last_counted_failure = Some(Instant::now());
        warn!(
            attempts = self.session.failed_attempts,
            ?similarity,
            "authentication failed"
        );
        self.emit(
            AuthEventKind::AuthFailed,
            similarity,
            Some(self.session.failed_attempts),
        );
    }

    /// Terminal failure that does not count toward lockout.
    fn fail_uncounted(&mut self, similarity: Option<f32>) {
        self.session.state = AuthState::Failed;
        self.emit(
            AuthEventKind::AuthFailed,
            similarity,
            Some(self.session.failed_attempts),
        );
    }

    fn emit(&self, kind: AuthEventKind, similarity: Option<f32>, attempts: Option<u32>) {
        let event = AuthEvent {
            kind,
            authenticated: self.session.state == AuthState::Authenticated,
            developer_mode: self.session.developer_mode_active,
            similarity,
            attempts,
        };
        // The receiver may be gone during shutdown; dropping the event then
        // is fine.
        let _ = self.events.send(event);
    }
}
