// Worker lifecycle states and control messages
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};

/// Service worker lifecycle, in order of progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    /// Installed and waiting to take control.
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

/// Messages pages post to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    SkipWaiting,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_parsing() {
        let skip: ClientMessage = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(skip, ClientMessage::SkipWaiting);

        let other: ClientMessage = serde_json::from_str(r#"{"type":"PING"}"#).unwrap();
        assert_eq!(other, ClientMessage::Unknown);
    }

    #[test]
    fn test_state_order() {
        assert!(WorkerState::Installing < WorkerState::Installed);
        assert!(WorkerState::Activated < WorkerState::Redundant);
    }
}
