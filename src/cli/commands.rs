//! Command definitions for the prodomo CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use super::console::saturating_minutes;

// ============================================================================
// CLI Structure
// ============================================================================

/// prodomo - a work/break interval timer
#[derive(Parser, Debug)]
#[command(
    name = "prodomo",
    version,
    about = "Work/break interval timer for the terminal",
    long_about = "Alternates work and break intervals, plays an alarm at each boundary \
                  and mirrors the countdown into a desktop notification and an optional overlay.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub settings_file: Option<PathBuf>,

    /// Directory for uploaded sounds instead of the default location
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run an interactive timer session
    Run(RunArgs),

    /// Print the persisted settings as JSON
    Config,

    /// Change persisted settings without running a session
    Set(SetArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run / Set Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Disable the alarm sound
    #[arg(long)]
    pub no_sound: bool,

    /// Disable the desktop notification
    #[arg(long)]
    pub no_notification: bool,

    /// Show the overlay from the start
    #[arg(long)]
    pub overlay: bool,
}

/// Arguments for the set command
#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("alarm").args(["sound", "sound_file"])))]
pub struct SetArgs {
    /// Work duration in minutes (coerced into 1-999)
    #[arg(
        short,
        long,
        value_name = "MINUTES",
        allow_negative_numbers = true,
        value_parser = saturating_minutes
    )]
    pub work: Option<i64>,

    /// Break duration in minutes (coerced into 1-999)
    #[arg(
        short,
        long = "break",
        value_name = "MINUTES",
        allow_negative_numbers = true,
        value_parser = saturating_minutes
    )]
    pub break_time: Option<i64>,

    /// Built-in sound id (`none`, `sound_mp3`)
    #[arg(short, long, value_name = "ID")]
    pub sound: Option<String>,

    /// Audio file to store and use as the alarm
    #[arg(long, value_name = "PATH")]
    pub sound_file: Option<PathBuf>,
}

impl SetArgs {
    /// Returns true if no setting was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none()
            && self.break_time.is_none()
            && self.sound.is_none()
            && self.sound_file.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
