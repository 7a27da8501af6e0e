//! Session cycle tracking.
//!
//! A [`Session`] knows which kind of interval is current and how many work
//! sessions have been completed in the running cycle. It decides what comes
//! next but has no notion of time.

use crate::types::{CycleProgress, SessionType, SESSIONS_PER_CYCLE};

/// Current session type and cycle counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    /// Type of the current (or next to start) session
    pub current_type: SessionType,
    /// Work sessions completed in this cycle (0-4)
    pub completed_work_sessions: u32,
}

impl Session {
    /// Creates a session positioned at the first work interval of a cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Determines the session that follows the current one.
    ///
    /// Leaving a long break starts a new cycle, so this resets the work
    /// counter when the current type is [`SessionType::LongBreak`].
    pub fn determine_next(&mut self) -> (SessionType, u32) {
        let next = match self.current_type {
            SessionType::Work if self.completed_work_sessions >= SESSIONS_PER_CYCLE => {
                SessionType::LongBreak
            }
            SessionType::Work => SessionType::ShortBreak,
            SessionType::ShortBreak => SessionType::Work,
            SessionType::LongBreak => {
                self.completed_work_sessions = 0;
                SessionType::Work
            }
        };
        (next, next.duration_secs())
    }

    /// Counts a concluded work session. No-op for breaks.
    ///
    /// Must run before [`Session::determine_next`], whose break choice
    /// depends on the updated count.
    pub fn increment_cycle(&mut self) {
        if self.current_type == SessionType::Work {
            self.completed_work_sessions =
                (self.completed_work_sessions + 1).min(SESSIONS_PER_CYCLE);
        }
    }

    /// Concludes the current session and moves to the next one.
    ///
    /// Returns the new current type.
    pub fn advance(&mut self) -> SessionType {
        self.increment_cycle();
        let (next, _) = self.determine_next();
        self.current_type = next;
        next
    }

    /// Returns to the first work session of a fresh cycle.
    pub fn reset(&mut self) {
        self.current_type = SessionType::Work;
        self.completed_work_sessions = 0;
    }

    /// Returns the length of the current session in seconds.
    pub fn duration_secs(&self) -> u32 {
        self.current_type.duration_secs()
    }

    /// Returns the cycle position shown to the user.
    ///
    /// While working, the session in progress already counts as filled;
    /// during a break only completed sessions do.
    pub fn cycle_progress(&self) -> CycleProgress {
        let shown = if self.current_type == SessionType::Work {
            self.completed_work_sessions + 1
        } else {
            self.completed_work_sessions
        };
        CycleProgress {
            display_session: shown,
            filled: shown,
            total: SESSIONS_PER_CYCLE,
        }
    }
}
