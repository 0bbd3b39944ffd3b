//! # Audio
//!
//! Plays the soundtrack of the active media file alongside its frames.
//! Only play/pause is mirrored between video and audio; the two streams are
//! not timestamp-locked, so long clips may drift.
//!
//! [`AudioSync`] holds at most one track at a time and talks to an
//! [`AudioBackend`]. [`RodioBackend`] is the real output device; tests swap
//! in a recording backend.

pub mod rodio_backend;
pub mod sync;

pub use rodio_backend::RodioBackend;
pub use sync::{AudioBackend, AudioSync, AudioTrack};
