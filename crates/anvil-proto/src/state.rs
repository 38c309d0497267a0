//! Action execution state
//!
//! `State` is the single canonical action-state table shared by the CRD
//! representation (string labels, e.g. `"STATE_RUNNING"`) and the wire
//! representation (integer codes). Both sides use this one type so the
//! label and code mappings cannot drift apart.

use serde::{Deserialize, Serialize};

/// Execution state of a workflow action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum State {
    /// Action has not started yet
    #[default]
    StatePending = 0,
    /// Action is currently executing on a worker
    StateRunning = 1,
    /// Action completed successfully
    StateSuccess = 2,
    /// Action failed
    StateFailed = 3,
    /// Action exceeded its timeout
    StateTimeout = 4,
}

// Convenience aliases for cleaner code
#[allow(non_upper_case_globals)]
impl State {
    pub const Pending: State = State::StatePending;
    pub const Running: State = State::StateRunning;
    pub const Success: State = State::StateSuccess;
    pub const Failed: State = State::StateFailed;
    pub const Timeout: State = State::StateTimeout;
}

impl State {
    /// All states, in code order
    pub const ALL: [State; 5] = [
        State::StatePending,
        State::StateRunning,
        State::StateSuccess,
        State::StateFailed,
        State::StateTimeout,
    ];

    /// The wire-protocol integer code for this state
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a state by its wire-protocol code
    pub fn from_code(code: i32) -> Option<State> {
        State::ALL.into_iter().find(|s| s.code() == code)
    }

    /// The canonical string label for this state (as stored in the CRD)
    pub fn label(self) -> &'static str {
        match self {
            State::StatePending => "STATE_PENDING",
            State::StateRunning => "STATE_RUNNING",
            State::StateSuccess => "STATE_SUCCESS",
            State::StateFailed => "STATE_FAILED",
            State::StateTimeout => "STATE_TIMEOUT",
        }
    }

    /// Look up a state by its canonical string label
    ///
    /// Returns `None` for unrecognized labels rather than falling back to a
    /// default code; callers holding raw strings decide how to handle that.
    pub fn from_label(label: &str) -> Option<State> {
        State::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Whether the action still has work to do (pending or running)
    pub fn is_active(self) -> bool {
        matches!(self, State::StatePending | State::StateRunning)
    }

    /// Whether the action has reached a final state
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_code_round_trip() {
        for state in State::ALL {
            assert_eq!(State::from_label(state.label()), Some(state));
            assert_eq!(State::from_code(state.code()), Some(state));
        }
    }

    #[test]
    fn test_codes_are_stable() {
        // Wire codes are a protocol contract; renumbering breaks agents.
        assert_eq!(State::Pending.code(), 0);
        assert_eq!(State::Running.code(), 1);
        assert_eq!(State::Success.code(), 2);
        assert_eq!(State::Failed.code(), 3);
        assert_eq!(State::Timeout.code(), 4);
    }

    #[test]
    fn test_unrecognized_label_is_rejected() {
        assert_eq!(State::from_label("STATE_BOGUS"), None);
        assert_eq!(State::from_label(""), None);
        assert_eq!(State::from_code(99), None);
    }

    #[test]
    fn test_serde_uses_canonical_labels() {
        for state in State::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.label()));

            let parsed: State = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, state);
        }

        // Unknown labels fail to parse instead of degrading to a zero code
        assert!(serde_json::from_str::<State>("\"STATE_BOGUS\"").is_err());
    }

    #[test]
    fn test_active_and_terminal() {
        assert!(State::Pending.is_active());
        assert!(State::Running.is_active());
        assert!(State::Success.is_terminal());
        assert!(State::Failed.is_terminal());
        assert!(State::Timeout.is_terminal());
    }
}
