use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chroma::{ChromaKeyEngine, KeyColor, Tolerance};
use crate::video::types::{DisplayBuffer, Frame};

/// Resampling used when scaling the canvas to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
}

impl ResampleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
        }
    }
}

impl Default for ResampleFilter {
    fn default() -> Self {
        Self::Bilinear
    }
}

/// Owns the buffers between a decoded frame and what the window shows
///
/// Pipeline per composite: key-colored native canvas, frame blitted on top,
/// canvas scaled to the window, mask applied at window resolution. Masking
/// after scaling snaps resampled edge pixels back to the key.
pub struct CompositorSurface {
    engine: ChromaKeyEngine,
    filter: ResampleFilter,
    native: (u32, u32),
    canvas: Option<Frame>,
    scaled: Option<Frame>,
    last_frame: Option<DisplayBuffer>,
    composites: u64,
}

impl CompositorSurface {
    pub fn new(engine: ChromaKeyEngine, filter: ResampleFilter) -> Self {
        Self {
            engine,
            filter,
            native: (0, 0),
            canvas: None,
            scaled: None,
            last_frame: None,
            composites: 0,
        }
    }

    /// Composite one decoded frame for a window of `window` (width, height).
    ///
    /// The result is cached and also returned by [`CompositorSurface::last_frame`].
    pub fn composite(
        &mut self,
        frame: &Frame,
        window: (u32, u32),
        key: KeyColor,
        tolerance: Tolerance,
    ) -> &DisplayBuffer {
        let native = if self.native == (0, 0) { frame.dimensions() } else { self.native };

        let mut canvas = match self.canvas.take() {
            Some(mut canvas) if canvas.dimensions() == native => {
                canvas.fill(key.0);
                canvas
            }
            _ => Frame::new_filled(native.0, native.1, key.0),
        };
        canvas.blit(frame);

        let scaled = match self.scaled.take() {
            Some(mut scaled) if window == native && scaled.dimensions() == window => {
                scaled.as_image_mut().copy_from_slice(canvas.as_image());
                scaled
            }
            _ if window == native => canvas.clone(),
            _ => Frame::new(imageops::resize(
                canvas.as_image(),
                window.0,
                window.1,
                self.filter.filter_type(),
            )),
        };
        self.canvas = Some(canvas);

        let mut out = self.last_frame.take().unwrap_or_default();
        if out.dimensions() != (window.0 as usize, window.1 as usize) {
            debug!("Display buffer sized for {}x{}", window.0, window.1);
        }
        self.engine.mask_into(&scaled, key, tolerance, &mut out);
        self.scaled = Some(scaled);
        self.composites += 1;

        self.last_frame.insert(out)
    }

    /// Most recent composited output, shown while paused
    pub fn last_frame(&self) -> Option<&DisplayBuffer> {
        self.last_frame.as_ref()
    }

    /// Most recent scaled canvas before masking, in window coordinates
    pub fn scaled_frame(&self) -> Option<&Frame> {
        self.scaled.as_ref()
    }

    /// New source: drop every buffer and adopt its native size
    pub fn reset(&mut self, native: (u32, u32)) {
        self.native = native;
        self.canvas = None;
        self.scaled = None;
        self.last_frame = None;
    }

    /// Window size or scale factor changed
    pub fn invalidate(&mut self) {
        self.scaled = None;
        self.last_frame = None;
    }

    /// Key color or tolerance changed; cached output no longer matches
    pub fn clear_cache(&mut self) {
        self.invalidate();
    }

    pub fn native_size(&self) -> (u32, u32) {
        self.native
    }

    pub fn engine(&self) -> &ChromaKeyEngine {
        &self.engine
    }

    /// Number of composites performed so far
    pub fn composite_count(&self) -> u64 {
        self.composites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::scale::ScaleState;

    fn surface() -> CompositorSurface {
        CompositorSurface::new(ChromaKeyEngine::new(), ResampleFilter::Nearest)
    }

    #[test]
    fn test_output_matches_window_size() {
        let mut surface = surface();
        surface.reset((100, 80));
        let frame = Frame::new_filled(100, 80, [10, 200, 10]);

        let out = surface.composite(&frame, (50, 40), KeyColor::MAGENTA, Tolerance(30));
        assert_eq!(out.dimensions(), (50, 40));
        assert_eq!(surface.scaled_frame().unwrap().dimensions(), (50, 40));
    }

    #[test]
    fn test_rescale_never_returns_previous_size() {
        let mut surface = surface();
        let native = (120, 90);
        surface.reset(native);
        let frame = Frame::new_filled(native.0, native.1, [40, 40, 40]);
        let mut scale = ScaleState::new(0.1, 0.1, 50);

        for _ in 0..5 {
            scale.decrease();
        }
        let small = scale.window_size(native);
        let first = surface.composite(&frame, small, KeyColor::MAGENTA, Tolerance(0)).dimensions();

        for _ in 0..15 {
            scale.increase();
        }
        assert!((scale.factor() - 2.0).abs() < 1e-6);
        let large = scale.window_size(native);
        surface.invalidate();
        let second = surface.composite(&frame, large, KeyColor::MAGENTA, Tolerance(0)).dimensions();

        assert_eq!(first, (60, 50));
        assert_eq!(second, (240, 180));
        assert_ne!(first, second);
    }

    #[test]
    fn test_background_is_key_color_and_masked() {
        let mut surface = surface();
        surface.reset((4, 4));
        // Smaller frame leaves the canvas background exposed
        let frame = Frame::new_filled(2, 2, [0, 0, 0]);

        let out = surface.composite(&frame, (4, 4), KeyColor::MAGENTA, Tolerance(0));
        assert_eq!(out.pixel(0, 0), 0);
        assert_eq!(out.pixel(3, 3), KeyColor::MAGENTA.to_u32());
    }

    #[test]
    fn test_near_key_pixels_snap_after_scaling() {
        let mut surface = surface();
        surface.reset((8, 8));
        let frame = Frame::new_filled(8, 8, [250, 4, 250]);

        let out = surface.composite(&frame, (16, 16), KeyColor::MAGENTA, Tolerance(10));
        assert!(out.pixels.iter().all(|&p| p == KeyColor::MAGENTA.to_u32()));
        // The unmasked scaled buffer keeps the original colors for picking
        assert_eq!(surface.scaled_frame().unwrap().get_pixel(0, 0), [250, 4, 250]);
    }

    #[test]
    fn test_same_size_composites_reuse_buffers() {
        let mut surface = surface();
        surface.reset((12, 8));
        let first = Frame::new_filled(12, 8, [255, 0, 255]);
        let second = Frame::new_filled(12, 8, [9, 9, 9]);

        surface.composite(&first, (12, 8), KeyColor::MAGENTA, Tolerance(0));
        let display_ptr = surface.last_frame().unwrap().pixels.as_ptr();
        let scaled_ptr = surface.scaled_frame().unwrap().as_image().as_ptr();

        let out = surface.composite(&second, (12, 8), KeyColor::MAGENTA, Tolerance(0));
        assert_eq!(out.pixels.as_ptr(), display_ptr);
        assert!(out.pixels.iter().all(|&p| p == 0x0009_0909));
        let scaled = surface.scaled_frame().unwrap();
        assert_eq!(scaled.as_image().as_ptr(), scaled_ptr);
        assert_eq!(scaled.get_pixel(11, 7), [9, 9, 9]);
    }

    #[test]
    fn test_reset_and_invalidate_drop_cache() {
        let mut surface = surface();
        surface.reset((10, 10));
        let frame = Frame::new_filled(10, 10, [1, 2, 3]);
        surface.composite(&frame, (10, 10), KeyColor::MAGENTA, Tolerance(0));
        assert!(surface.last_frame().is_some());

        surface.invalidate();
        assert!(surface.last_frame().is_none());
        assert!(surface.scaled_frame().is_none());

        surface.composite(&frame, (10, 10), KeyColor::MAGENTA, Tolerance(0));
        surface.reset((20, 20));
        assert!(surface.last_frame().is_none());
        assert_eq!(surface.native_size(), (20, 20));
        assert_eq!(surface.composite_count(), 2);
    }
}
