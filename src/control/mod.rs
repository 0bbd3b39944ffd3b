//! # Control Surface
//!
//! The tray-menu equivalent: a tokio task reading line commands from stdin
//! and forwarding them to the render loop as [`ControlIntent`]s over an
//! unbounded channel. Both sides also share a [`SharedState`] of atomics.

pub mod console;
pub mod intents;
pub mod state;

pub use console::{run_console, spawn_console};
pub use intents::{parse_command, ControlIntent, UnknownCommand};
pub use state::SharedState;
