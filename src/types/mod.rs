//! Core data types for the interval timer.
//!
//! This module defines the data structures used for:
//! - Session mode and run state
//! - The countdown record and its transitions
//! - A serializable read model of the live session
//! - Clock formatting and duration bounds

use serde::{Deserialize, Serialize};

// ============================================================================
// Duration bounds
// ============================================================================

/// Smallest accepted interval length in minutes.
pub const MIN_MINUTES: u32 = 1;

/// Largest accepted interval length in minutes.
pub const MAX_MINUTES: u32 = 999;

/// Default work interval length in minutes.
pub const DEFAULT_WORK_MINUTES: u32 = 40;

/// Default break interval length in minutes.
pub const DEFAULT_BREAK_MINUTES: u32 = 10;

/// Coerces a user supplied minute count into `[MIN_MINUTES, MAX_MINUTES]`.
///
/// Out-of-range values are clamped rather than rejected.
pub fn clamp_minutes(minutes: i64) -> u32 {
    minutes.clamp(i64::from(MIN_MINUTES), i64::from(MAX_MINUTES)) as u32
}

/// Converts a minute count to seconds after clamping it.
pub fn minutes_to_seconds(minutes: u32) -> u32 {
    clamp_minutes(i64::from(minutes)) * 60
}

/// Formats seconds as a zero-padded `mm:ss` clock.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// Mode
// ============================================================================

/// The two alternating interval types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Focused work interval
    #[default]
    Work,
    /// Rest interval
    Break,
}

impl Mode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::Break => "break",
        }
    }

    /// Returns the human-readable status label.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Work => "Work Session",
            Mode::Break => "Break Time",
        }
    }

    /// Returns the mode that follows this one.
    pub fn other(&self) -> Mode {
        match self {
            Mode::Work => Mode::Break,
            Mode::Break => Mode::Work,
        }
    }
}

// ============================================================================
// RunState
// ============================================================================

/// Whether the countdown is ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Never started, or just reset
    #[default]
    Idle,
    /// Actively ticking
    Running,
    /// Started, then halted
    Paused,
}

impl RunState {
    /// Returns the string representation of the run state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
        }
    }

    /// Returns true if the countdown has a ticking obligation.
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not running; nothing changed
    Inert,
    /// One second elapsed and time remains
    Counted {
        /// Seconds left in the current interval
        remaining_seconds: u32,
    },
    /// The current interval reached zero
    Elapsed,
}

/// The live countdown.
///
/// `remaining_seconds` always lies in `[0, interval_seconds]`, where
/// `interval_seconds` is the length the current interval started with.
/// Duration edits while running or paused change the configured lengths
/// only; they are picked up at the next reset or mode switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    mode: Mode,
    run_state: RunState,
    remaining_seconds: u32,
    interval_seconds: u32,
    work_seconds: u32,
    break_seconds: u32,
}

impl Session {
    /// Creates an idle session at the start of a work interval.
    pub fn new(work_seconds: u32, break_seconds: u32) -> Self {
        let work_seconds = work_seconds.max(1);
        Self {
            mode: Mode::Work,
            run_state: RunState::Idle,
            remaining_seconds: work_seconds,
            interval_seconds: work_seconds,
            work_seconds,
            break_seconds: break_seconds.max(1),
        }
    }

    /// Creates an idle session from minute counts.
    pub fn from_minutes(work_minutes: u32, break_minutes: u32) -> Self {
        Self::new(
            minutes_to_seconds(work_minutes),
            minutes_to_seconds(break_minutes),
        )
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Length of the interval currently counting down.
    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    pub fn work_seconds(&self) -> u32 {
        self.work_seconds
    }

    pub fn break_seconds(&self) -> u32 {
        self.break_seconds
    }

    /// Returns the configured length for the given mode.
    pub fn configured_seconds(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_seconds,
            Mode::Break => self.break_seconds,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    pub fn is_idle(&self) -> bool {
        self.run_state == RunState::Idle
    }

    /// Moves `Idle` or `Paused` to `Running`.
    ///
    /// Returns false if the session was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.run_state = RunState::Running;
        true
    }

    /// Moves `Running` to `Paused`, keeping the remaining time.
    ///
    /// Returns false if the session was not running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.run_state = RunState::Paused;
        true
    }

    /// Returns to an idle work interval with the configured work length.
    pub fn reset(&mut self) {
        self.run_state = RunState::Idle;
        self.mode = Mode::Work;
        self.remaining_seconds = self.work_seconds;
        self.interval_seconds = self.work_seconds;
    }

    /// Decrements the countdown by one second.
    ///
    /// Does nothing unless running. The count never goes below zero.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Inert;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            TickOutcome::Elapsed
        } else {
            TickOutcome::Counted {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }

    /// Flips the mode and loads the other mode's configured length.
    pub fn switch_mode(&mut self) {
        self.mode = self.mode.other();
        self.remaining_seconds = self.configured_seconds(self.mode);
        self.interval_seconds = self.remaining_seconds;
    }

    /// Updates the configured work length.
    ///
    /// Returns true if the remaining time changed, which only happens
    /// while idle.
    pub fn set_work_seconds(&mut self, seconds: u32) -> bool {
        self.work_seconds = seconds.max(1);
        self.recompute_if_idle()
    }

    /// Updates the configured break length.
    ///
    /// Returns true if the remaining time changed. An idle session is
    /// always in work mode, so this only records the new length.
    pub fn set_break_seconds(&mut self, seconds: u32) -> bool {
        self.break_seconds = seconds.max(1);
        self.recompute_if_idle()
    }

    fn recompute_if_idle(&mut self) -> bool {
        if !self.is_idle() {
            return false;
        }
        let seconds = self.configured_seconds(self.mode);
        let changed = seconds != self.remaining_seconds;
        self.remaining_seconds = seconds;
        self.interval_seconds = seconds;
        changed
    }

    /// Fraction of the current interval still remaining, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.interval_seconds == 0 {
            return 1.0;
        }
        f64::from(self.remaining_seconds) / f64::from(self.interval_seconds)
    }

    /// Status label shown to the user.
    pub fn status_label(&self) -> &'static str {
        if self.is_idle() {
            "Idle"
        } else {
            self.mode.label()
        }
    }

    /// Current remaining time as `mm:ss`.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    #[cfg(test)]
    pub(crate) fn set_remaining_for_test(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Read model of the live session, including mirror and sound status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub run_state: RunState,
    pub remaining_seconds: u32,
    pub interval_seconds: u32,
    pub work_seconds: u32,
    pub break_seconds: u32,
    /// Status label ("Idle", "Work Session", "Break Time")
    pub status: String,
    /// Remaining time as `mm:ss`
    pub clock: String,
    /// Fraction of the interval remaining
    pub progress: f64,
    /// Display name of the selected alarm sound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_name: Option<String>,
    pub notification_active: bool,
    pub overlay_active: bool,
}

impl SessionSnapshot {
    /// Creates a snapshot of the countdown alone.
    pub fn from_session(session: &Session) -> Self {
        Self {
            mode: session.mode(),
            run_state: session.run_state(),
            remaining_seconds: session.remaining_seconds(),
            interval_seconds: session.interval_seconds(),
            work_seconds: session.work_seconds(),
            break_seconds: session.break_seconds(),
            status: session.status_label().to_string(),
            clock: session.clock(),
            progress: session.progress(),
            sound_name: None,
            notification_active: false,
            overlay_active: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
