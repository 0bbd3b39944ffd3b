//! # Chroma Overlay
//!
//! Play videos as borderless, always-on-top desktop overlays whose background
//! is keyed out, with the soundtrack playing alongside.
//!
//! Each tick the active [`video::FrameSource`] yields a frame, the
//! [`composition::CompositorSurface`] places it on a key-colored canvas,
//! scales it to the window and masks every pixel within tolerance of the key
//! color, and the window's color-key attribute makes those pixels invisible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chroma_overlay::{
//!     app::OverlayApp,
//!     config::Config,
//!     control::SharedState,
//!     video::DefaultMediaOpener,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let shared = Arc::new(SharedState::new(
//!     config.chroma.key_color,
//!     config.chroma.default_tolerance(),
//!     config.chroma.auto_detect,
//! ));
//! let (_intents, intent_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let mut app = OverlayApp::new(&config, shared, intent_rx, Box::new(DefaultMediaOpener::new()))?;
//! app.start(vec!["dancer.gif".into()])?;
//! app.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`chroma`] - Key color masking and auto-detection
//! - [`video`] - Frame sources (FFmpeg, GIF and still images)
//! - [`composition`] - Canvas, scaling and the paused-frame cache
//! - [`audio`] - Soundtrack playback mirrored to play/pause
//! - [`playlist`] - Playlist navigation and per-clip state
//! - [`window`] - Overlay window, color-key transparency and input
//! - [`control`] - Tray-style control console and shared state
//! - [`config`] - Configuration management

pub mod app;
pub mod audio;
pub mod chroma;
pub mod composition;
pub mod config;
pub mod control;
pub mod dialogs;
pub mod error;
pub mod info;
pub mod playback;
pub mod playlist;
pub mod video;
pub mod window;

// Re-export commonly used types for convenience
pub use crate::{
    app::OverlayApp,
    chroma::{ChromaKeyEngine, KeyColor, Tolerance},
    config::Config,
    error::{OverlayError, Result},
    playback::PlaybackState,
};
