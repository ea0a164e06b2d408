//! Interactive console input.
//!
//! Each line typed during `prodomo run` is parsed into a [`ConsoleInput`].

use std::num::{IntErrorKind, ParseIntError};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::daemon::Command;
use crate::sound::{find_builtin, CUSTOM_SOUND_ID};

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Forward to the command handler
    Command(Command),
    /// Read this file and upload it as the custom sound
    UploadFile(PathBuf),
    /// List the built-in sounds
    ListSounds,
    Help,
    Quit,
    /// Blank line
    Empty,
}

/// Errors for lines that cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command '{0}' (type 'help')")]
    UnknownCommand(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' is not a whole number of minutes")]
    InvalidMinutes(String),

    #[error("expected 'on' or 'off', got '{0}'")]
    InvalidToggle(String),
}

/// Help text listing every console command.
pub const CONSOLE_HELP: &str = "\
Commands:
  start                 start or resume the countdown
  pause                 pause the countdown
  reset                 back to an idle work interval
  work <minutes>        set the work duration
  break <minutes>       set the break duration
  sound <id|custom|PATH>  choose the alarm (see 'sounds'), or upload a file
  overlay <on|off>      show or hide the overlay
  status                show the current state
  sounds                list the built-in sounds
  help                  show this help
  quit                  exit";

/// Parses one console line.
pub fn parse_line(line: &str) -> Result<ConsoleInput, ConsoleError> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(ConsoleInput::Empty);
    };
    // The sound argument may be a path containing spaces.
    let rest = line.trim_start()[word.len()..].trim();
    let word = word.to_ascii_lowercase();

    let input = match word.as_str() {
        "start" | "resume" => ConsoleInput::Command(Command::Start),
        "pause" => ConsoleInput::Command(Command::Pause),
        "reset" => ConsoleInput::Command(Command::Reset),
        "status" => ConsoleInput::Command(Command::Status),
        "work" => ConsoleInput::Command(Command::SetWorkMinutes(parse_minutes("work", rest)?)),
        "break" => ConsoleInput::Command(Command::SetBreakMinutes(parse_minutes("break", rest)?)),
        "sound" => parse_sound(rest)?,
        "overlay" => ConsoleInput::Command(Command::SetOverlay(parse_toggle(rest)?)),
        "sounds" => ConsoleInput::ListSounds,
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" | "q" => ConsoleInput::Quit,
        _ => return Err(ConsoleError::UnknownCommand(word)),
    };
    Ok(input)
}

fn parse_minutes(command: &'static str, arg: &str) -> Result<i64, ConsoleError> {
    if arg.is_empty() {
        return Err(ConsoleError::MissingArgument {
            command,
            expected: "a number of minutes",
        });
    }
    saturating_minutes(arg).map_err(|_| ConsoleError::InvalidMinutes(arg.to_string()))
}

/// Parses a whole number of minutes, saturating at the `i64` bounds.
///
/// Out-of-range digits are still a number of minutes; they get coerced into
/// range later like any other value.
pub fn saturating_minutes(arg: &str) -> Result<i64, ParseIntError> {
    arg.parse::<i64>().or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(e),
    })
}

fn parse_toggle(arg: &str) -> Result<bool, ConsoleError> {
    match arg.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        "" => Err(ConsoleError::MissingArgument {
            command: "overlay",
            expected: "'on' or 'off'",
        }),
        _ => Err(ConsoleError::InvalidToggle(arg.to_string())),
    }
}

fn parse_sound(arg: &str) -> Result<ConsoleInput, ConsoleError> {
    if arg.is_empty() {
        return Err(ConsoleError::MissingArgument {
            command: "sound",
            expected: "a sound id or a file path",
        });
    }
    if arg == CUSTOM_SOUND_ID || find_builtin(arg).is_some() {
        return Ok(ConsoleInput::Command(Command::SelectSound(arg.to_string())));
    }
    if looks_like_path(arg) {
        return Ok(ConsoleInput::UploadFile(PathBuf::from(arg)));
    }
    Ok(ConsoleInput::Command(Command::SelectSound(arg.to_string())))
}

fn looks_like_path(arg: &str) -> bool {
    arg.contains(std::path::MAIN_SEPARATOR) || arg.contains('/') || arg.contains('.')
}

/// Reads an audio file for upload. Returns its file name and contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_sound_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read sound file {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sound".to_string());
    Ok((name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_simple_commands() {
            assert_eq!(
                parse_line("start"),
                Ok(ConsoleInput::Command(Command::Start))
            );
            assert_eq!(
                parse_line("  PAUSE  "),
                Ok(ConsoleInput::Command(Command::Pause))
            );
            assert_eq!(
                parse_line("reset"),
                Ok(ConsoleInput::Command(Command::Reset))
            );
            assert_eq!(parse_line("sounds"), Ok(ConsoleInput::ListSounds));
            assert_eq!(parse_line("help"), Ok(ConsoleInput::Help));
            assert_eq!(parse_line("quit"), Ok(ConsoleInput::Quit));
            assert_eq!(parse_line("   "), Ok(ConsoleInput::Empty));
        }

        #[test]
        fn test_minutes() {
            assert_eq!(
                parse_line("work 25"),
                Ok(ConsoleInput::Command(Command::SetWorkMinutes(25)))
            );
            assert_eq!(
                parse_line("break -2"),
                Ok(ConsoleInput::Command(Command::SetBreakMinutes(-2)))
            );
            assert_eq!(
                parse_line("work abc"),
                Err(ConsoleError::InvalidMinutes("abc".to_string()))
            );
            assert_eq!(
                parse_line("work 2.5"),
                Err(ConsoleError::InvalidMinutes("2.5".to_string()))
            );
            assert!(matches!(
                parse_line("break"),
                Err(ConsoleError::MissingArgument { command: "break", .. })
            ));
        }

        #[test]
        fn test_oversized_minutes_saturate() {
            assert_eq!(
                parse_line("work 99999999999999999999"),
                Ok(ConsoleInput::Command(Command::SetWorkMinutes(i64::MAX)))
            );
            assert_eq!(
                parse_line("break -99999999999999999999"),
                Ok(ConsoleInput::Command(Command::SetBreakMinutes(i64::MIN)))
            );
            assert_eq!(
                parse_line("work 1e30"),
                Err(ConsoleError::InvalidMinutes("1e30".to_string()))
            );
        }

        #[test]
        fn test_overlay_toggle() {
            assert_eq!(
                parse_line("overlay on"),
                Ok(ConsoleInput::Command(Command::SetOverlay(true)))
            );
            assert_eq!(
                parse_line("overlay OFF"),
                Ok(ConsoleInput::Command(Command::SetOverlay(false)))
            );
            assert_eq!(
                parse_line("overlay maybe"),
                Err(ConsoleError::InvalidToggle("maybe".to_string()))
            );
        }

        #[test]
        fn test_sound_ids_and_paths() {
            assert_eq!(
                parse_line("sound none"),
                Ok(ConsoleInput::Command(Command::SelectSound("none".to_string())))
            );
            assert_eq!(
                parse_line("sound custom"),
                Ok(ConsoleInput::Command(Command::SelectSound("custom".to_string())))
            );
            assert_eq!(
                parse_line("sound ~/My Sounds/bell.wav"),
                Ok(ConsoleInput::UploadFile(PathBuf::from("~/My Sounds/bell.wav")))
            );
            assert_eq!(
                parse_line("sound kazoo"),
                Ok(ConsoleInput::Command(Command::SelectSound("kazoo".to_string())))
            );
        }

        #[test]
        fn test_unknown_command() {
            assert_eq!(
                parse_line("jump"),
                Err(ConsoleError::UnknownCommand("jump".to_string()))
            );
        }
    }

    #[test]
    fn test_read_sound_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let (name, bytes) = read_sound_file(&path).unwrap();
        assert_eq!(name, "bell.wav");
        assert_eq!(bytes, b"RIFF");
    }

    #[test]
    fn test_read_missing_sound_file() {
        let err = read_sound_file(Path::new("/nonexistent/bell.wav")).unwrap_err();
        assert!(err.to_string().contains("Failed to read sound file"));
    }
}
