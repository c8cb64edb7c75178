use crate::event::AuthEvent;

/// Gates the elevated capability surface.
///
/// A thin observer over the machine's outbound events: it mirrors
/// `developer_mode_active` and holds no state of its own. Grants on an
/// authenticated event that carries `developer_mode == true`, revokes
/// immediately on any transition away from it. What the elevated surface
/// exposes (debug, log, config actions) belongs to the hosting
/// application.
#[derive(Debug, Default)]
pub struct PrivilegedSessionController {
    active: bool,
}

impl PrivilegedSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one state-change event.
    pub fn observe(&mut self, event: &AuthEvent) {
        self.active = event.developer_mode;
    }

    /// Whether the elevated surface is currently exposed.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
