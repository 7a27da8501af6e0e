//! Command rejection errors.

use thiserror::Error;

use crate::types::ServiceState;

/// Errors returned by service commands whose precondition does not hold.
///
/// A rejected command leaves the service untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PomodoroError {
    /// Start requested while a session is running or paused.
    #[error("セッションは既に実行中です")]
    AlreadyRunning,

    /// Pause requested while no session is running.
    #[error("実行中のセッションはありません")]
    NotRunning,

    /// Resume requested while the session is not paused.
    #[error("セッションは一時停止していません")]
    NotPaused,

    /// Skip requested while no session is in progress.
    #[error("セッションは開始されていません")]
    Idle,
}

impl PomodoroError {
    /// Returns the service states in which the rejected command is accepted.
    #[must_use]
    pub fn expected_states(&self) -> &'static [ServiceState] {
        match self {
            Self::AlreadyRunning => &[ServiceState::Idle],
            Self::NotRunning => &[ServiceState::Running],
            Self::NotPaused => &[ServiceState::Paused],
            Self::Idle => &[ServiceState::Running, ServiceState::Paused],
        }
    }

    /// Returns the rejection a command gets in the given state, if any.
    pub(crate) fn check_start(state: ServiceState) -> Result<(), Self> {
        match state {
            ServiceState::Idle => Ok(()),
            _ => Err(Self::AlreadyRunning),
        }
    }

    pub(crate) fn check_pause(state: ServiceState) -> Result<(), Self> {
        match state {
            ServiceState::Running => Ok(()),
            _ => Err(Self::NotRunning),
        }
    }

    pub(crate) fn check_resume(state: ServiceState) -> Result<(), Self> {
        match state {
            ServiceState::Paused => Ok(()),
            _ => Err(Self::NotPaused),
        }
    }

    pub(crate) fn check_skip(state: ServiceState) -> Result<(), Self> {
        match state {
            ServiceState::Idle => Err(Self::Idle),
            _ => Ok(()),
        }
    }
}
