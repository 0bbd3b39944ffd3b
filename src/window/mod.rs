//! # Overlay Window
//!
//! The borderless, always-on-top window the overlay draws into, the
//! color-key transparency applied to it, keyboard/mouse mapping and the
//! software-drawn HUD and tolerance prompt.
//!
//! Pixels exactly equal to the key color become invisible and click-through
//! on Windows. Other platforms show them as the key color.

pub mod adapter;
pub mod draw;
pub mod input;
pub mod overlay;
pub mod platform;
pub mod prompt;

pub use adapter::TransparencyWindowAdapter;
pub use input::{command_for_key, DragState, InputCommand, InputGate};
pub use overlay::OverlayWindow;
pub use prompt::{prompt_tolerance, ToleranceEntry};
