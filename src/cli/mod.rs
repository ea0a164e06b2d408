//! CLI module for prodomo.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `console`: Parsing of interactive console lines
//! - `display`: Output formatting and display logic
//! - `app`: Subcommand implementations

pub mod app;
pub mod commands;
pub mod console;
pub mod display;

pub use app::{apply_settings, run_session, show_config, Paths};
pub use commands::{Cli, Commands, RunArgs, SetArgs};
pub use console::{parse_line, read_sound_file, ConsoleError, ConsoleInput, CONSOLE_HELP};
pub use display::Display;
