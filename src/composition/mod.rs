//! # Composition
//!
//! Turns decoded frames into window-sized, chroma-masked display buffers and
//! tracks the scale factor that decides the window size.

pub mod scale;
pub mod surface;

// Re-exports for convenience
pub use scale::ScaleState;
pub use surface::{CompositorSurface, ResampleFilter};
