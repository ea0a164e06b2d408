//! Session runtime.
//!
//! - `timer`: the session state machine and its events
//! - `ticker`: the one-second timer source
//! - `handler`: the command surface

pub mod handler;
pub mod ticker;
pub mod timer;

pub use handler::{Command, CommandHandler, CommandResponse};
pub use ticker::Ticker;
pub use timer::{Backends, SessionEvent, SessionMachine, SharedSession};
