//! Pomodoro CLI - work/break cycle timer for the terminal
//!
//! This tool helps you stay focused using the Pomodoro Technique:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break after 4 work sessions

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};

use pomodoro_cycle::cli::{Cli, Commands, Display, InputCommand, RunArgs, TerminalNotifier};
use pomodoro_cycle::{PomodoroService, ServiceBuilder};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects `debug`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => run(args).await?,
        Some(Commands::Completions { shell }) => generate_completions(shell),
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs the timer until `quit`, end of input or Ctrl-C.
async fn run(args: RunArgs) -> Result<()> {
    let config = args.to_config();
    config.validate().map_err(anyhow::Error::msg)?;
    tracing::debug!(?config, "starting timer");

    let service = ServiceBuilder::from_config(&config)
        .notifier(Arc::new(TerminalNotifier::new()))
        .build();
    Display::show_welcome(&service.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("標準入力の読み込みに失敗しました")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<InputCommand>() {
                    Ok(InputCommand::Quit) => break,
                    Ok(command) => dispatch(&service, command, args.json)?,
                    Err(message) => Display::show_error(&message),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    service.flush().await;
    Ok(())
}

/// Applies one interactive command to the service.
fn dispatch(service: &PomodoroService, command: InputCommand, json: bool) -> Result<()> {
    let result = match command {
        InputCommand::Start => service.start(),
        InputCommand::Pause => service.pause(),
        InputCommand::Resume => service.resume(),
        InputCommand::Skip => service.skip(),
        InputCommand::Reset => {
            service.reset_cycle();
            Display::show_reset_success();
            Ok(())
        }
        InputCommand::Status => {
            let snapshot = service.snapshot();
            if json {
                Display::show_status_json(&snapshot).context("ステータスの出力に失敗しました")?;
            } else {
                Display::show_status(&snapshot);
            }
            Ok(())
        }
        InputCommand::Help => {
            Display::show_help();
            Ok(())
        }
        InputCommand::Quit => Ok(()),
    };

    if let Err(e) = result {
        Display::show_rejected(&e);
    }
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["pomodoro"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["pomodoro", "run", "--no-log"]);
        match cli.command {
            Some(Commands::Run(args)) => assert!(args.no_log),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["pomodoro", "--verbose", "run"]);
        assert!(cli.verbose);
    }

    #[tokio::test]
    async fn test_dispatch_reports_rejections_without_failing() {
        let service = ServiceBuilder::new().build();

        dispatch(&service, InputCommand::Pause, false).unwrap();
        dispatch(&service, InputCommand::Start, false).unwrap();
        dispatch(&service, InputCommand::Start, false).unwrap();
        assert_eq!(service.state(), pomodoro_cycle::ServiceState::Running);

        dispatch(&service, InputCommand::Status, true).unwrap();
        dispatch(&service, InputCommand::Reset, false).unwrap();
        assert_eq!(service.state(), pomodoro_cycle::ServiceState::Idle);
    }
}
