use std::cmp::Reverse;
use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::chroma::types::{KeyColor, Tolerance};
use crate::video::types::{pack_rgb, DisplayBuffer, Frame};

/// Pixels skipped at each end of every border when sampling for auto-detection
pub const DEFAULT_EDGE_MARGIN: u32 = 10;

/// Tolerance-based chroma keying and key-color inference
#[derive(Debug, Clone)]
pub struct ChromaKeyEngine {
    edge_margin: u32,
}

impl ChromaKeyEngine {
    pub fn new() -> Self {
        Self::with_edge_margin(DEFAULT_EDGE_MARGIN)
    }

    pub fn with_edge_margin(edge_margin: u32) -> Self {
        Self { edge_margin }
    }

    /// Returns a copy of `frame` with every pixel within `tolerance` of `key` set to exactly `key`
    pub fn apply_mask(&self, frame: &Frame, key: KeyColor, tolerance: Tolerance) -> Frame {
        let mut masked = frame.clone();
        self.apply_mask_in_place(&mut masked, key, tolerance);
        masked
    }

    /// Snap matching pixels to the exact key color.
    ///
    /// The window's color-key attribute only hides exact matches, so near-key
    /// pixels must be rewritten rather than merely flagged.
    pub fn apply_mask_in_place(&self, frame: &mut Frame, key: KeyColor, tolerance: Tolerance) {
        let row_len = frame.width() as usize * 3;
        if row_len == 0 {
            return;
        }
        let threshold = tolerance.squared();
        let key_rgb = key.0;

        let raw: &mut [u8] = frame.as_image_mut();
        raw.par_chunks_mut(row_len).for_each(|row| {
            for px in row.chunks_exact_mut(3) {
                if key.distance_squared([px[0], px[1], px[2]]) <= threshold {
                    px.copy_from_slice(&key_rgb);
                }
            }
        });
    }

    /// Mask `frame` straight into the packed window buffer `out`.
    ///
    /// `out` is resized to the frame; its allocation is reused when it already fits.
    pub fn mask_into(&self, frame: &Frame, key: KeyColor, tolerance: Tolerance, out: &mut DisplayBuffer) {
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        out.width = width;
        out.height = height;
        out.pixels.resize(width * height, 0);
        if width == 0 {
            return;
        }
        let threshold = tolerance.squared();
        let key_word = key.to_u32();

        let raw: &[u8] = frame.as_image();
        out.pixels
            .par_chunks_mut(width)
            .zip(raw.par_chunks(width * 3))
            .for_each(|(words, row)| {
                for (word, px) in words.iter_mut().zip(row.chunks_exact(3)) {
                    let rgb = [px[0], px[1], px[2]];
                    *word = if key.distance_squared(rgb) <= threshold {
                        key_word
                    } else {
                        pack_rgb(rgb)
                    };
                }
            });
    }

    /// Infer the key color as the most common exact color along the frame borders.
    ///
    /// Scan order is top row, bottom row, left column, right column; ties go to
    /// the color seen first. Returns `None` when the borders yield no samples.
    pub fn auto_detect(&self, frame: &Frame) -> Option<KeyColor> {
        let (width, height) = frame.dimensions();
        let margin = self.edge_margin;
        let mut counts: HashMap<[u8; 3], (usize, usize)> = HashMap::new();
        let mut seen = 0usize;

        let mut sample = |rgb: [u8; 3]| {
            let entry = counts.entry(rgb).or_insert((0, seen));
            entry.0 += 1;
            seen += 1;
        };

        if height > 0 && width > 2 * margin {
            for x in margin..width - margin {
                sample(frame.get_pixel(x, 0));
            }
            for x in margin..width - margin {
                sample(frame.get_pixel(x, height - 1));
            }
        }
        if width > 0 && height > 2 * margin {
            for y in margin..height - margin {
                sample(frame.get_pixel(0, y));
            }
            for y in margin..height - margin {
                sample(frame.get_pixel(width - 1, y));
            }
        }

        let detected = counts
            .into_iter()
            .max_by_key(|&(_, (count, first))| (count, Reverse(first)))
            .map(|(rgb, _)| KeyColor(rgb));

        debug!("Auto-detect sampled {} edge pixels -> {:?}", seen, detected);
        detected
    }

    /// Exact pixel value at (x, y). Callers must bounds-check against the frame first.
    pub fn pick_color_at(&self, frame: &Frame, x: u32, y: u32) -> KeyColor {
        KeyColor(frame.get_pixel(x, y))
    }
}

impl Default for ChromaKeyEngine {
    fn default() -> Self {
        Self::new()
    }
}
