//! Display utilities for the Pomodoro CLI.
//!
//! This module provides formatted output for:
//! - Command results and errors
//! - Status display
//! - Live session events through [`TerminalNotifier`]

use crate::engine::{Notifier, PomodoroError};
use crate::types::{ServiceState, SessionType, StatusSnapshot};

use super::commands::InputCommand;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the greeting printed when the timer starts running.
    pub fn show_welcome(snapshot: &StatusSnapshot) {
        println!("ポモドーロタイマーを起動しました");
        println!(
            "次のセッション: {} ({})",
            Self::session_label(snapshot.session_type),
            Self::format_clock(snapshot.duration_seconds)
        );
        println!("コマンド: start / pause / resume / skip / reset / status / help / quit");
    }

    /// Shows the list of interactive commands.
    pub fn show_help() {
        println!("利用可能なコマンド:");
        for (command, description) in InputCommand::ALL {
            println!("  {:<8} {}", command.as_str(), description);
        }
    }

    /// Shows the current service status.
    pub fn show_status(snapshot: &StatusSnapshot) {
        for line in Self::status_lines(snapshot) {
            println!("{}", line);
        }
    }

    /// Shows the current service status as JSON.
    pub fn show_status_json(snapshot: &StatusSnapshot) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string(snapshot)?);
        Ok(())
    }

    /// Shows a success message for cycle reset.
    pub fn show_reset_success() {
        println!("↺ サイクルをリセットしました");
    }

    /// Shows a rejected command.
    pub fn show_rejected(error: &PomodoroError) {
        eprintln!("{}", Self::rejected_line(error));
    }

    /// Builds the line shown by [`Display::show_rejected`], naming the
    /// states in which the command is accepted.
    pub fn rejected_line(error: &PomodoroError) -> String {
        let accepted: Vec<&str> = error
            .expected_states()
            .iter()
            .map(|&state| Self::state_label(state))
            .collect();
        format!("! {} ({}のときに使えます)", error, accepted.join("・"))
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Builds the status block shown by [`Display::show_status`].
    pub fn status_lines(snapshot: &StatusSnapshot) -> Vec<String> {
        let mut lines = vec![
            "ポモドーロタイマー ステータス".to_string(),
            "─────────────────────────────".to_string(),
            format!("状態: {}", Self::state_label(snapshot.state)),
            format!("セッション: {}", Self::session_label(snapshot.session_type)),
        ];
        let time_label = match snapshot.state {
            ServiceState::Idle => "時間",
            _ => "残り時間",
        };
        lines.push(format!(
            "{}: {}",
            time_label,
            Self::format_clock(snapshot.remaining_seconds)
        ));
        lines.push(format!("完了した作業: {}", snapshot.completed_sessions));
        lines.push(snapshot.progress.to_string());
        lines
    }

    /// Returns the Japanese label for a session type.
    pub fn session_label(session_type: SessionType) -> &'static str {
        match session_type {
            SessionType::Work => "作業",
            SessionType::ShortBreak => "短い休憩",
            SessionType::LongBreak => "長い休憩",
        }
    }

    /// Returns the Japanese label for a service state.
    pub fn state_label(state: ServiceState) -> &'static str {
        match state {
            ServiceState::Idle => "待機中",
            ServiceState::Running => "実行中",
            ServiceState::Paused => "一時停止中",
        }
    }

    /// Formats seconds as `MM:SS`.
    pub fn format_clock(total_seconds: u32) -> String {
        let (minutes, seconds) = Self::format_time(total_seconds);
        format!("{:02}:{:02}", minutes, seconds)
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// TerminalNotifier
// ============================================================================

/// Prints session events to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn new() -> Self {
        Self
    }

    fn started_line(session_type: SessionType, duration_secs: u32) -> String {
        format!(
            "▶ {}を開始しました ({})",
            Display::session_label(session_type),
            Display::format_clock(duration_secs)
        )
    }

    fn completed_line(session_type: SessionType) -> String {
        let next_hint = if session_type.is_break() {
            "作業に戻りましょう"
        } else {
            "休憩しましょう"
        };
        format!(
            "✔ {}が終了しました。{}",
            Display::session_label(session_type),
            next_hint
        )
    }

    fn state_line(state: ServiceState) -> String {
        match state {
            ServiceState::Paused => "|| 一時停止しました".to_string(),
            ServiceState::Running => "> 再開しました".to_string(),
            ServiceState::Idle => "[] 停止しました".to_string(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn session_started(&self, session_type: SessionType, duration_secs: u32) {
        println!("{}", Self::started_line(session_type, duration_secs));
    }

    fn session_tick(&self, remaining_secs: u32) {
        println!("  残り時間: {}", Display::format_clock(remaining_secs));
    }

    fn session_completed(&self, session_type: SessionType) {
        println!("{}", Self::completed_line(session_type));
    }

    fn state_changed(&self, state: ServiceState) {
        println!("{}", Self::state_line(state));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CycleProgress;

    fn snapshot(state: ServiceState, remaining_seconds: u32) -> StatusSnapshot {
        StatusSnapshot {
            state,
            session_type: SessionType::Work,
            remaining_seconds,
            duration_seconds: 1500,
            completed_sessions: 1,
            progress: CycleProgress {
                display_session: 2,
                filled: 2,
                total: 4,
            },
        }
    }

    mod format_time_tests {
        use super::*;

        #[test]
        fn test_format_time_zero() {
            assert_eq!(Display::format_time(0), (0, 0));
            assert_eq!(Display::format_clock(0), "00:00");
        }

        #[test]
        fn test_format_time_mixed() {
            assert_eq!(Display::format_time(125), (2, 5));
            assert_eq!(Display::format_clock(125), "02:05");
        }

        #[test]
        fn test_format_time_25_minutes() {
            assert_eq!(Display::format_clock(1500), "25:00");
        }

        #[test]
        fn test_format_time_large() {
            assert_eq!(Display::format_clock(6000), "100:00");
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_status_lines_running() {
            let lines = Display::status_lines(&snapshot(ServiceState::Running, 754));
            assert!(lines.contains(&"状態: 実行中".to_string()));
            assert!(lines.contains(&"セッション: 作業".to_string()));
            assert!(lines.contains(&"残り時間: 12:34".to_string()));
            assert_eq!(lines.last().map(String::as_str), Some("Session 2/4  🍅🍅○○"));
        }

        #[test]
        fn test_status_lines_idle_shows_duration() {
            let lines = Display::status_lines(&snapshot(ServiceState::Idle, 1500));
            assert!(lines.contains(&"状態: 待機中".to_string()));
            assert!(lines.contains(&"時間: 25:00".to_string()));
        }

        #[test]
        fn test_labels() {
            assert_eq!(Display::session_label(SessionType::LongBreak), "長い休憩");
            assert_eq!(Display::state_label(ServiceState::Paused), "一時停止中");
        }

        #[test]
        fn test_rejected_line_names_accepted_states() {
            assert_eq!(
                Display::rejected_line(&PomodoroError::NotPaused),
                "! セッションは一時停止していません (一時停止中のときに使えます)"
            );
            assert_eq!(
                Display::rejected_line(&PomodoroError::Idle),
                "! セッションは開始されていません (実行中・一時停止中のときに使えます)"
            );
        }

        #[test]
        fn test_show_functions_do_not_panic() {
            let snapshot = snapshot(ServiceState::Paused, 60);
            Display::show_welcome(&snapshot);
            Display::show_help();
            Display::show_status(&snapshot);
            Display::show_status_json(&snapshot).unwrap();
            Display::show_reset_success();
            Display::show_rejected(&PomodoroError::NotPaused);
            Display::show_error("テストエラー");
        }
    }

    mod terminal_notifier_tests {
        use super::*;

        #[test]
        fn test_started_line() {
            assert_eq!(
                TerminalNotifier::started_line(SessionType::ShortBreak, 300),
                "▶ 短い休憩を開始しました (05:00)"
            );
        }

        #[test]
        fn test_completed_line_suggests_next() {
            assert!(TerminalNotifier::completed_line(SessionType::Work).contains("休憩しましょう"));
            assert!(
                TerminalNotifier::completed_line(SessionType::LongBreak).contains("作業に戻りましょう")
            );
        }

        #[test]
        fn test_state_line() {
            assert_eq!(TerminalNotifier::state_line(ServiceState::Paused), "|| 一時停止しました");
            assert_eq!(TerminalNotifier::state_line(ServiceState::Idle), "[] 停止しました");
        }

        #[test]
        fn test_notifier_methods_do_not_panic() {
            let notifier = TerminalNotifier::new();
            notifier.session_started(SessionType::Work, 1500);
            notifier.session_tick(1490);
            notifier.session_completed(SessionType::Work);
            notifier.state_changed(ServiceState::Running);
        }
    }
}
