//! Display utilities for the prodomo CLI.
//!
//! This module provides formatted output for:
//! - Command responses
//! - Session events
//! - Status display
//! - Settings and the sound catalog

use crate::daemon::{CommandResponse, SessionEvent};
use crate::settings::Settings;
use crate::sound::BUILTIN_SOUNDS;
use crate::types::{format_clock, Mode, RunState, SessionSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the outcome of a command.
    pub fn show_response(response: &CommandResponse) {
        if !response.is_success() {
            Self::show_error(&response.message);
            return;
        }
        if response.message.is_empty() {
            if let Some(data) = &response.data {
                Self::show_status(data);
            }
            return;
        }
        println!("{}", Self::response_line(response));
    }

    /// Shows a session event.
    pub fn show_event(event: &SessionEvent) {
        if let Some(line) = Self::event_line(event) {
            println!("{}", line);
        }
    }

    /// Shows the full status block.
    pub fn show_status(snapshot: &SessionSnapshot) {
        for line in Self::status_lines(snapshot) {
            println!("{}", line);
        }
    }

    /// Shows the persisted settings as JSON.
    pub fn show_settings(settings: &Settings) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(settings)?);
        Ok(())
    }

    /// Lists the built-in sounds, marking the selected one.
    pub fn show_sounds(selected_id: &str) {
        for line in Self::sound_lines(selected_id) {
            println!("{}", line);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    fn response_line(response: &CommandResponse) -> String {
        match &response.data {
            Some(data) => format!("{} [{} {}]", response.message, data.status, data.clock),
            None => response.message.clone(),
        }
    }

    /// One line per event worth printing. Plain ticks print nothing, except
    /// on whole minutes so the console stays readable.
    fn event_line(event: &SessionEvent) -> Option<String> {
        match *event {
            SessionEvent::Tick {
                mode,
                remaining_seconds,
            } => (remaining_seconds % 60 == 0).then(|| {
                format!("  {} - {}", mode.label(), format_clock(remaining_seconds))
            }),
            SessionEvent::ModeSwitched {
                mode,
                remaining_seconds,
            } => Some(format!(
                "* {} ({})",
                Self::switch_title(mode),
                format_clock(remaining_seconds)
            )),
            SessionEvent::StateChanged { .. } => None,
        }
    }

    fn switch_title(mode: Mode) -> &'static str {
        match mode {
            Mode::Work => "Break over, back to work",
            Mode::Break => "Work interval done, take a break",
        }
    }

    fn status_lines(snapshot: &SessionSnapshot) -> Vec<String> {
        let state = match snapshot.run_state {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
        };
        let mut lines = vec![
            "prodomo status".to_string(),
            "─────────────────────────────".to_string(),
            format!("Status:    {}", snapshot.status),
            format!("State:     {}", state),
            format!(
                "Remaining: {} ({:.0}%)",
                snapshot.clock,
                snapshot.progress * 100.0
            ),
            format!(
                "Work:      {} min / Break: {} min",
                snapshot.work_seconds / 60,
                snapshot.break_seconds / 60
            ),
        ];
        if let Some(sound) = &snapshot.sound_name {
            lines.push(format!("Sound:     {}", sound));
        }
        lines.push(format!(
            "Mirrors:   notification {}, overlay {}",
            on_off(snapshot.notification_active),
            on_off(snapshot.overlay_active)
        ));
        lines
    }

    fn sound_lines(selected_id: &str) -> Vec<String> {
        BUILTIN_SOUNDS
            .iter()
            .map(|sound| {
                let marker = if sound.id == selected_id { "*" } else { " " };
                format!("{} {:<10} {}", marker, sound.id, sound.name)
            })
            .collect()
    }
}

fn on_off(active: bool) -> &'static str {
    if active {
        "on"
    } else {
        "off"
    }
}

// ============================================================================
// Tests
// ============================================================================
