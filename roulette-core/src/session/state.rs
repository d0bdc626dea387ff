//! Session state machine states

use std::fmt;

use serde::Serialize;

use crate::draw::DrawResult;

/// State of a selection session
///
/// ```text
/// Idle ─► Drawing ─► AwaitingConfirmation ─┬─► Committing ─► Idle
///  │                                       └─► Excluding  ─► Idle
///  └─► Refreshing ─► Idle
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Eligible subset is current
    Idle,
    /// Draw in progress against the eligible snapshot
    Drawing,
    /// Holding a drawn outcome until the caller confirms or rejects it
    AwaitingConfirmation { draw: DrawResult },
    /// Commit in flight
    Committing { draw: DrawResult },
    /// Rejected outcome being moved to the ledger
    Excluding { draw: DrawResult },
    /// Pool and history fetch in flight
    Refreshing,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Drawing => "Drawing",
            Self::AwaitingConfirmation { .. } => "AwaitingConfirmation",
            Self::Committing { .. } => "Committing",
            Self::Excluding { .. } => "Excluding",
            Self::Refreshing => "Refreshing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The outcome a decision is pending on, if any
    pub fn pending_draw(&self) -> Option<&DrawResult> {
        match self {
            Self::AwaitingConfirmation { draw }
            | Self::Committing { draw }
            | Self::Excluding { draw } => Some(draw),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a refresh request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot, eligibility and date index were replaced
    Applied,
    /// A decision is pending; the refresh runs once it resolves
    Deferred,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Participant;

    fn draw() -> DrawResult {
        DrawResult {
            index: 0,
            participant: Participant::new("a", "Ana"),
        }
    }

    #[test]
    fn pending_draw_only_while_deciding() {
        assert!(SessionState::Idle.pending_draw().is_none());
        assert!(SessionState::Refreshing.pending_draw().is_none());
        assert!(
            SessionState::AwaitingConfirmation { draw: draw() }
                .pending_draw()
                .is_some()
        );
        assert!(SessionState::Committing { draw: draw() }.pending_draw().is_some());
    }

    #[test]
    fn display_uses_state_name() {
        assert_eq!(
            SessionState::AwaitingConfirmation { draw: draw() }.to_string(),
            "AwaitingConfirmation"
        );
        assert_eq!(SessionState::Idle.to_string(), "Idle");
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_value(SessionState::Refreshing).unwrap();
        assert_eq!(json["state"], "refreshing");
    }

    #[test]
    fn pending_state_serializes_the_drawn_participant() {
        let state = SessionState::AwaitingConfirmation { draw: draw() };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["state"], "awaiting_confirmation");
        assert_eq!(json["draw"]["index"], 0);
        assert_eq!(json["draw"]["participant"]["id"], "a");
        assert_eq!(json["draw"]["participant"]["name"], "Ana");
        assert!(json["draw"]["participant"]["last_selected_at"].is_null());
    }
}
