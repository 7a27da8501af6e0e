//! Core data types for the Pomodoro Timer.
//!
//! This module defines the data structures used for:
//! - Session types and their fixed durations
//! - Service and timer states
//! - Runtime configuration with validation
//! - Serializable status snapshots

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of work sessions in one full cycle.
pub const SESSIONS_PER_CYCLE: u32 = 4;

/// Work session length in seconds (25 minutes).
pub const WORK_SECS: u32 = 1500;
/// Short break length in seconds (5 minutes).
pub const SHORT_BREAK_SECS: u32 = 300;
/// Long break length in seconds (15 minutes).
pub const LONG_BREAK_SECS: u32 = 900;

/// Tick cadence of the production countdown.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

// ============================================================================
// SessionType
// ============================================================================

/// Kind of a single timed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Focused work (25 minutes)
    #[default]
    Work,
    /// Short break between work sessions (5 minutes)
    ShortBreak,
    /// Long break after a full cycle (15 minutes)
    LongBreak,
}

impl SessionType {
    /// Returns the string representation of the session type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        }
    }

    /// Returns the fixed length of this session type in seconds.
    pub fn duration_secs(&self) -> u32 {
        match self {
            SessionType::Work => WORK_SECS,
            SessionType::ShortBreak => SHORT_BREAK_SECS,
            SessionType::LongBreak => LONG_BREAK_SECS,
        }
    }

    /// Returns true for either kind of break.
    pub fn is_break(&self) -> bool {
        matches!(self, SessionType::ShortBreak | SessionType::LongBreak)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(SessionType::Work),
            "short_break" => Ok(SessionType::ShortBreak),
            "long_break" => Ok(SessionType::LongBreak),
            other => Err(format!("不明なセッション種別です: {}", other)),
        }
    }
}

// ============================================================================
// ServiceState / TimerState
// ============================================================================

/// Top-level state of the pomodoro service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// No session in progress
    #[default]
    Idle,
    /// A session is counting down
    Running,
    /// A session is paused with its remaining time preserved
    Paused,
}

impl ServiceState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Idle => "idle",
            ServiceState::Running => "running",
            ServiceState::Paused => "paused",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the countdown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

// ============================================================================
// SessionStatus
// ============================================================================

/// Outcome recorded in the session log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Started,
    Completed,
    Skipped,
}

impl SessionStatus {
    /// Returns the string representation used in the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Started => "started",
            SessionStatus::Completed => "completed",
            SessionStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PomodoroConfig
// ============================================================================

/// Runtime configuration for the pomodoro service.
///
/// Interval lengths are fixed; only the tick cadence and the session log
/// location can be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Countdown tick cadence in seconds (1-60)
    pub tick_interval_secs: u32,
    /// Whether completed, started and skipped sessions are logged
    pub session_log: bool,
    /// Custom session log path (defaults to `~/.gopomodoro/sessions.log`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_log_path: Option<PathBuf>,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL.as_secs() as u32,
            session_log: true,
            session_log_path: None,
        }
    }
}

impl PomodoroConfig {
    /// Sets the tick cadence.
    pub fn with_tick_interval_secs(mut self, secs: u32) -> Self {
        self.tick_interval_secs = secs;
        self
    }

    /// Enables or disables the session log.
    pub fn with_session_log(mut self, enabled: bool) -> Self {
        self.session_log = enabled;
        self
    }

    /// Sets a custom session log path.
    pub fn with_session_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_log_path = Some(path.into());
        self
    }

    /// Returns the tick cadence as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.tick_interval_secs))
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_secs < 1 || self.tick_interval_secs > 60 {
            return Err("ティック間隔は1-60秒の範囲で指定してください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// CycleProgress
// ============================================================================

/// Position within the current four-session cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleProgress {
    /// Session number shown to the user (1-based while working)
    pub display_session: u32,
    /// Number of filled tomato slots
    pub filled: u32,
    /// Total slots in a cycle
    pub total: u32,
}

impl fmt::Display for CycleProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session {}/{}  ", self.display_session, self.total)?;
        for slot in 0..self.total {
            f.write_str(if slot < self.filled { "🍅" } else { "○" })?;
        }
        Ok(())
    }
}

// ============================================================================
// StatusSnapshot
// ============================================================================

/// Point-in-time view of the service, suitable for display or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: ServiceState,
    #[serde(rename = "sessionType")]
    pub session_type: SessionType,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u32,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: u32,
    #[serde(rename = "completedSessions")]
    pub completed_sessions: u32,
    pub progress: CycleProgress,
}

// ============================================================================
// Tests
// ============================================================================
