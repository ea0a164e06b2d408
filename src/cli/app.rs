//! Subcommand implementations.
//!
//! `run` wires the concrete backends into a session and drives it from
//! console input until `quit`, end of input, or Ctrl-C.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::commands::{Cli, RunArgs, SetArgs};
use super::console::{parse_line, read_sound_file, ConsoleInput, CONSOLE_HELP};
use super::display::Display;
use crate::daemon::{Backends, Command, CommandHandler, SessionMachine, Ticker};
use crate::mirror::{default_notification_backend, TerminalTitleOverlay};
use crate::settings::{
    DirFileStore, FileStore, JsonFileStore, Preferences, SOUNDS_DIRECTORY,
};
use crate::sound::{try_create_engine, SoundSelection};

/// Where settings and uploaded sounds live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub settings_file: PathBuf,
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolves the paths from the global flags, falling back to the
    /// platform directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not given and the platform has no
    /// default for it.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let settings_file = match &cli.settings_file {
            Some(path) => path.clone(),
            None => JsonFileStore::default_path()
                .context("No config directory found; pass --settings-file")?,
        };
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => DirFileStore::default_root()
                .context("No data directory found; pass --data-dir")?,
        };
        Ok(Self {
            settings_file,
            data_dir,
        })
    }

    fn load_preferences(&self) -> Preferences {
        Preferences::load(Arc::new(JsonFileStore::open(&self.settings_file)))
    }
}

// ============================================================================
// config / set
// ============================================================================

/// Prints the persisted settings.
///
/// # Errors
///
/// Returns an error if the settings cannot be serialized.
pub fn show_config(paths: &Paths) -> Result<()> {
    let preferences = paths.load_preferences();
    Display::show_settings(preferences.settings()).context("Failed to print settings")
}

/// Applies `prodomo set`.
///
/// # Errors
///
/// Returns an error if nothing was given, the sound is unknown, the sound
/// file cannot be read or stored, or a setting cannot be saved.
pub fn apply_settings(paths: &Paths, args: &SetArgs) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Nothing to set; see `prodomo set --help`");
    }
    let mut preferences = paths.load_preferences();

    if let Some(minutes) = args.work {
        preferences
            .set_work_minutes(minutes)
            .context("Failed to save work duration")?;
    }
    if let Some(minutes) = args.break_time {
        preferences
            .set_break_minutes(minutes)
            .context("Failed to save break duration")?;
    }

    let files = DirFileStore::new(&paths.data_dir);
    if let Some(id) = &args.sound {
        let selection =
            SoundSelection::builtin(id).with_context(|| format!("Unknown sound: {}", id))?;
        replace_sound(&mut preferences, &files, selection)?;
    }
    if let Some(path) = &args.sound_file {
        let (name, bytes) = read_sound_file(path)?;
        let uri = files
            .write(&name, &bytes, SOUNDS_DIRECTORY)
            .context("Failed to store sound file")?;
        replace_sound(&mut preferences, &files, SoundSelection::custom(uri, name))?;
    }

    Display::show_settings(preferences.settings()).context("Failed to print settings")
}

fn replace_sound(
    preferences: &mut Preferences,
    files: &dyn FileStore,
    selection: SoundSelection,
) -> Result<()> {
    let new_ref = selection.payload_ref.clone();
    let previous = preferences
        .set_sound(selection)
        .context("Failed to save sound selection")?;
    if previous.is_custom() && previous.payload_ref != new_ref {
        if let Err(e) = files.delete(&previous.payload_ref) {
            warn!("Failed to delete superseded sound: {}", e);
        }
    }
    Ok(())
}

// ============================================================================
// run
// ============================================================================

/// Runs an interactive session.
///
/// # Errors
///
/// Returns an error if console input cannot be read or the Ctrl-C handler
/// cannot be installed.
pub async fn run_session(paths: &Paths, args: &RunArgs) -> Result<()> {
    let preferences = paths.load_preferences();
    let backends = Backends {
        audio: try_create_engine(args.no_sound),
        notification: default_notification_backend(args.no_notification),
        overlay: Arc::new(TerminalTitleOverlay),
    };

    let mut machine = SessionMachine::new(preferences.settings(), backends);
    let mut events = machine.subscribe();
    let session = machine.into_shared();

    let ticker = Ticker::new(Arc::clone(&session));
    let handler = CommandHandler::new(
        session,
        preferences,
        Arc::new(DirFileStore::new(&paths.data_dir)),
        ticker.restart_handle(),
    );

    let ticker_task = tokio::spawn(ticker.run());
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            Display::show_event(&event);
        }
    });
    info!("Session ready");

    if args.overlay {
        Display::show_response(&handler.handle(Command::SetOverlay(true)).await);
    }
    Display::show_response(&handler.handle(Command::Status).await);
    println!("Type 'help' for commands.");

    let result = console_loop(&handler).await;

    ticker_task.abort();
    handler.shutdown().await;
    // Shutdown drops the event senders, which ends the printer.
    if let Err(e) = printer.await {
        warn!("Event printer stopped abnormally: {}", e);
    }
    result
}

async fn console_loop(handler: &CommandHandler) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read console input")? else {
                    return Ok(());
                };
                if !dispatch(handler, &line).await {
                    return Ok(());
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                println!();
                return Ok(());
            }
        }
    }
}

/// Handles one console line. Returns false when the session should end.
async fn dispatch(handler: &CommandHandler, line: &str) -> bool {
    match parse_line(line) {
        Ok(ConsoleInput::Command(command)) => {
            Display::show_response(&handler.handle(command).await);
        }
        Ok(ConsoleInput::UploadFile(path)) => upload(handler, &path).await,
        Ok(ConsoleInput::ListSounds) => {
            Display::show_sounds(&handler.settings().await.sound.id);
        }
        Ok(ConsoleInput::Help) => println!("{}", CONSOLE_HELP),
        Ok(ConsoleInput::Quit) => return false,
        Ok(ConsoleInput::Empty) => {}
        Err(e) => Display::show_error(&e.to_string()),
    }
    true
}

async fn upload(handler: &CommandHandler, path: &Path) {
    match read_sound_file(path) {
        Ok((name, bytes)) => {
            let response = handler.handle(Command::UploadSound { name, bytes }).await;
            Display::show_response(&response);
        }
        Err(e) => Display::show_error(&format!("{:#}", e)),
    }
}
