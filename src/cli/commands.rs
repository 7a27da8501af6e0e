//! Command definitions for the Pomodoro CLI.
//!
//! Uses clap derive macro for argument parsing. Commands typed into a
//! running session are parsed by [`InputCommand`].

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::types::{PomodoroConfig, DEFAULT_TICK_INTERVAL};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro CLI - work/break cycle timer for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro",
    version,
    about = "ポモドーロサイクルタイマー",
    long_about = "25分の作業と5分の休憩を繰り返し、4セッションごとに15分の長い休憩を取る\n\
                  ポモドーロタイマーです。`run` で起動し、標準入力からコマンドを受け付けます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer, reading commands from standard input
    Run(RunArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Seconds between countdown updates (1-60)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_TICK_INTERVAL.as_secs() as u32,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub tick_secs: u32,

    /// Session log file (default: ~/.gopomodoro/sessions.log)
    #[arg(short, long, conflicts_with = "no_log")]
    pub log_file: Option<PathBuf>,

    /// Do not write the session log
    #[arg(long)]
    pub no_log: bool,

    /// Print `status` output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Builds the service configuration from the arguments.
    pub fn to_config(&self) -> PomodoroConfig {
        let mut config = PomodoroConfig::default()
            .with_tick_interval_secs(self.tick_secs)
            .with_session_log(!self.no_log);
        if let Some(path) = &self.log_file {
            config = config.with_session_log_path(path);
        }
        config
    }
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_INTERVAL.as_secs() as u32,
            log_file: None,
            no_log: false,
            json: false,
        }
    }
}

// ============================================================================
// Interactive Commands
// ============================================================================

/// A command typed into a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Start,
    Pause,
    Resume,
    Skip,
    Reset,
    Status,
    Help,
    Quit,
}

impl InputCommand {
    /// All commands with their descriptions, in help order.
    pub const ALL: [(InputCommand, &'static str); 8] = [
        (InputCommand::Start, "現在のセッションを開始"),
        (InputCommand::Pause, "一時停止"),
        (InputCommand::Resume, "再開"),
        (InputCommand::Skip, "現在のセッションをスキップ"),
        (InputCommand::Reset, "サイクルを最初からやり直す"),
        (InputCommand::Status, "現在の状態を表示"),
        (InputCommand::Help, "このヘルプを表示"),
        (InputCommand::Quit, "終了"),
    ];

    /// Returns the keyword that selects this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputCommand::Start => "start",
            InputCommand::Pause => "pause",
            InputCommand::Resume => "resume",
            InputCommand::Skip => "skip",
            InputCommand::Reset => "reset",
            InputCommand::Status => "status",
            InputCommand::Help => "help",
            InputCommand::Quit => "quit",
        }
    }
}

impl FromStr for InputCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Ok(InputCommand::Start),
            "pause" | "p" => Ok(InputCommand::Pause),
            "resume" | "r" => Ok(InputCommand::Resume),
            "skip" | "n" => Ok(InputCommand::Skip),
            "reset" => Ok(InputCommand::Reset),
            "status" | "st" => Ok(InputCommand::Status),
            "help" | "h" | "?" => Ok(InputCommand::Help),
            "quit" | "q" | "exit" => Ok(InputCommand::Quit),
            other => Err(format!(
                "不明なコマンドです: '{}' (help で一覧を表示)",
                other
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["pomodoro"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["pomodoro", "-v", "run"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["pomodoro", "run"]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert_eq!(args.tick_secs, 10);
                    assert!(args.log_file.is_none());
                    assert!(!args.no_log);
                    assert!(!args.json);
                }
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_with_options() {
            let cli = Cli::parse_from([
                "pomodoro",
                "run",
                "--tick-secs",
                "1",
                "--log-file",
                "/tmp/sessions.log",
                "--json",
            ]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert_eq!(args.tick_secs, 1);
                    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/sessions.log")));
                    assert!(args.json);
                }
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_rejects_tick_out_of_range() {
            assert!(Cli::try_parse_from(["pomodoro", "run", "--tick-secs", "0"]).is_err());
            assert!(Cli::try_parse_from(["pomodoro", "run", "--tick-secs", "61"]).is_err());
        }

        #[test]
        fn test_parse_log_file_conflicts_with_no_log() {
            let result =
                Cli::try_parse_from(["pomodoro", "run", "--no-log", "--log-file", "/tmp/x.log"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["pomodoro", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }

        #[test]
        fn test_parse_unknown_subcommand() {
            assert!(Cli::try_parse_from(["pomodoro", "daemon"]).is_err());
        }
    }

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_to_config_defaults() {
            let config = RunArgs::default().to_config();
            assert_eq!(config, PomodoroConfig::default());
        }

        #[test]
        fn test_to_config_no_log() {
            let args = RunArgs {
                no_log: true,
                tick_secs: 1,
                ..RunArgs::default()
            };
            let config = args.to_config();
            assert!(!config.session_log);
            assert_eq!(config.tick_interval_secs, 1);
        }

        #[test]
        fn test_to_config_log_file() {
            let args = RunArgs {
                log_file: Some(PathBuf::from("/tmp/p.log")),
                ..RunArgs::default()
            };
            let config = args.to_config();
            assert!(config.session_log);
            assert_eq!(config.session_log_path, Some(PathBuf::from("/tmp/p.log")));
        }
    }

    mod input_command_tests {
        use super::*;

        #[test]
        fn test_parse_keywords() {
            for (command, _) in InputCommand::ALL {
                assert_eq!(command.as_str().parse::<InputCommand>(), Ok(command));
            }
        }

        #[test]
        fn test_parse_aliases_and_case() {
            assert_eq!("  START \n".parse::<InputCommand>(), Ok(InputCommand::Start));
            assert_eq!("q".parse::<InputCommand>(), Ok(InputCommand::Quit));
            assert_eq!("exit".parse::<InputCommand>(), Ok(InputCommand::Quit));
            assert_eq!("?".parse::<InputCommand>(), Ok(InputCommand::Help));
        }

        #[test]
        fn test_parse_unknown() {
            let err = "stop".parse::<InputCommand>().unwrap_err();
            assert!(err.contains("stop"));
        }
    }
}
