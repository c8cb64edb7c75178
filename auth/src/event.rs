use serde::Serialize;

/// What happened, in the outbound wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    SetupComplete,
    Authenticated,
    AuthFailed,
    DeveloperModeExit,
}

/// State-change notification for the UI/session collaborator.
///
/// Serialized shape:
/// `{ "type": "...", "authenticated": bool, "developerMode": bool,
///    "similarity"?: number, "attempts"?: number }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    #[serde(rename = "type")]
    pub kind: AuthEventKind,
    pub authenticated: bool,
    pub developer_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_wire_shape() {
        let event = AuthEvent {
            kind: AuthEventKind::AuthFailed,
            authenticated: false,
            developer_mode: false,
            similarity: Some(0.42),
            attempts: Some(2),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "auth_failed");
        assert_eq!(json["authenticated"], false);
        assert_eq!(json["developerMode"], false);
        assert_eq!(json["attempts"], 2);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let event = AuthEvent {
            kind: AuthEventKind::DeveloperModeExit,
            authenticated: false,
            developer_mode: false,
            similarity: None,
            attempts: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("similarity").is_none());
        assert!(json.get("attempts").is_none());
    }
}
