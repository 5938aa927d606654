use serde::Serialize;
use std::fmt;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    CountingDownToOpen,
    Navigating,
    CountingDownToClose,
    Closed,
    Cancelled,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Closed | Phase::Cancelled | Phase::Failed)
    }

    /// A job in this phase owns a window and timers
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Phase::CountingDownToOpen | Phase::Navigating | Phase::CountingDownToClose
        )
    }

    pub fn is_counting_down(self) -> bool {
        matches!(self, Phase::CountingDownToOpen | Phase::CountingDownToClose)
    }

    /// Transitions only move forward; terminal phases have no successors.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        match self {
            Idle => next == CountingDownToOpen,
            CountingDownToOpen => matches!(next, Navigating | Cancelled | Failed),
            Navigating => matches!(next, CountingDownToClose | Cancelled | Failed),
            CountingDownToClose => matches!(next, Closed | Cancelled | Failed),
            Closed | Cancelled | Failed => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::CountingDownToOpen => "counting_down_to_open",
            Phase::Navigating => "navigating",
            Phase::CountingDownToClose => "counting_down_to_close",
            Phase::Closed => "closed",
            Phase::Cancelled => "cancelled",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_allowed() {
        let path = [
            Phase::Idle,
            Phase::CountingDownToOpen,
            Phase::Navigating,
            Phase::CountingDownToClose,
            Phase::Closed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn terminal_phases_are_final() {
        for terminal in [Phase::Closed, Phase::Cancelled, Phase::Failed] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(Phase::CountingDownToOpen));
            assert!(!terminal.can_transition_to(Phase::Idle));
        }
    }

    #[test]
    fn no_backwards_moves() {
        assert!(!Phase::CountingDownToClose.can_transition_to(Phase::CountingDownToOpen));
        assert!(!Phase::Navigating.can_transition_to(Phase::CountingDownToOpen));
        assert!(!Phase::Idle.can_transition_to(Phase::Closed));
    }
}
