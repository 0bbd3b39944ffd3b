//! # Playlist
//!
//! The ordered list of media files and the controller that switches between
//! them, rebuilding the frame source, compositor and audio track on each
//! switch while chroma settings and scale carry over.

pub mod controller;
pub mod state;

pub use controller::{LoadedClip, PlaylistController};
pub use state::PlaylistState;
