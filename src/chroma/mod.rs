//! # Chroma Keying
//!
//! Tolerance-based transparency masking and automatic key-color inference.
//!
//! A pixel is keyed when its Euclidean RGB distance to the key color is at most
//! the tolerance; keyed pixels are rewritten to the exact key color so the
//! window's color-key attribute hides them.
//!
//! ## Usage
//!
//! ```rust
//! use chroma_overlay::chroma::{ChromaKeyEngine, KeyColor, Tolerance};
//! use chroma_overlay::video::Frame;
//!
//! let engine = ChromaKeyEngine::new();
//! let frame = Frame::new_filled(64, 64, [250, 5, 250]);
//! let masked = engine.apply_mask(&frame, KeyColor::MAGENTA, Tolerance(30));
//! assert_eq!(masked.get_pixel(0, 0), [255, 0, 255]);
//! ```

pub mod engine;
pub mod types;

pub use engine::{ChromaKeyEngine, DEFAULT_EDGE_MARGIN};
pub use types::{KeyColor, Tolerance};
