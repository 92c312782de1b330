//! Session state machine.

/// Lifecycle state of an interpreter session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Session has been created but no process spawned yet.
    #[default]
    Unstarted,
    /// The interpreter process is alive and accepting input.
    Running,
    /// The process exited or was stopped; the session cannot be reused.
    Stopped,
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Unstarted -> Running
    /// - Unstarted -> Stopped
    /// - Running -> Stopped
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, target),
            (Unstarted, Running) | (Unstarted, Stopped) | (Running, Stopped)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::ReplBridgeError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped)
    }

    /// Check if session can accept commands.
    pub fn can_execute(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unstarted => "unstarted",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
        }
    }
}
