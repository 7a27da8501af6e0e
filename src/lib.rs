//! Pomodoro Cycle Library
//!
//! This library provides the core of a pomodoro timer:
//! - Session cycle rules (work, short break, long break every 4 sessions)
//! - Countdown timer driven by an injectable clock
//! - Service validating commands and reporting events to a notifier
//! - Session history logging to CSV
//! - CLI command parsing and terminal display

pub mod cli;
pub mod clock;
pub mod engine;
pub mod storage;
pub mod types;

// Re-export commonly used types for convenience
pub use clock::{Clock, MockClock, SystemClock, Ticker};
pub use engine::{
    ChannelNotifier, Notification, Notifier, PomodoroError, PomodoroService, ServiceBuilder,
    Session, Timer, TimerEvent,
};
pub use storage::{CsvStorage, MockStorage, SessionRecord, Storage, StorageError};
pub use types::{
    CycleProgress, PomodoroConfig, ServiceState, SessionStatus, SessionType, StatusSnapshot,
    TimerState,
};
