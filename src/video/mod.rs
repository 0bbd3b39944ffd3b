//! # Video Module
//!
//! Frame sources and the frame types the compositing pipeline works on.
//!
//! Container formats decode through FFmpeg when the `ffmpeg` feature is
//! enabled; animated GIFs and still images always decode in pure Rust.

pub mod types;
pub mod source;

mod image_source;
#[cfg(feature = "ffmpeg")]
mod ffmpeg_source;

pub use types::{DisplayBuffer, Frame, MediaKind};
pub use source::{read_looping, DefaultMediaOpener, FrameSource, MediaOpener, ReadOutcome};
pub use image_source::ImageFrameSource;
#[cfg(feature = "ffmpeg")]
pub use ffmpeg_source::FfmpegFrameSource;
