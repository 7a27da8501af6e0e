//! CLI module for the Pomodoro timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and the terminal notifier

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, InputCommand, RunArgs};
pub use display::{Display, TerminalNotifier};
