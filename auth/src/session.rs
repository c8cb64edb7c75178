use std::fmt;

use chrono::{DateTime, Utc};

/// Authentication session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No attempt in flight, developer mode inactive. Initial state.
    Locked,
    /// One capture/authentication attempt is in flight. Acts as the
    /// mutual-exclusion flag: a second attempt cannot start.
    Listening,
    /// The last attempt succeeded; developer mode is active.
    Authenticated,
    /// The last attempt failed terminally.
    Failed,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Listening => write!(f, "listening"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Mutable session record, owned by the state machine and mutated only by
/// its transitions. Lives for the whole process; there is exactly one.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub state: AuthState,
    /// Failures counted toward lockout (phrase mismatch, low similarity).
    pub failed_attempts: u32,
    pub last_authenticated_at: Option<DateTime<Utc>>,
    pub developer_mode_active: bool,
    /// Whether the next successful attempt enrolls instead of verifying.
    /// Orthogonal to `state`.
    pub setup_mode: bool,
}

impl AuthSession {
    pub(crate) fn new(setup_mode: bool) -> Self {
        Self {
            state: AuthState::Locked,
            failed_attempts: 0,
            last_authenticated_at: None,
            developer_mode_active: false,
            setup_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(AuthState::Locked.to_string(), "locked");
        assert_eq!(AuthState::Listening.to_string(), "listening");
        assert_eq!(AuthState::Authenticated.to_string(), "authenticated");
        assert_eq!(AuthState::Failed.to_string(), "failed");
    }

    #[test]
    fn new_session_is_locked() {
        let session = AuthSession::new(true);
        assert_eq!(session.state, AuthState::Locked);
        assert_eq!(session.failed_attempts, 0);
        assert!(session.setup_mode);
        assert!(!session.developer_mode_active);
        assert!(session.last_authenticated_at.is_none());
    }
}
