use image::{imageops, ImageBuffer, Rgb, RgbImage};
use std::path::Path;

/// Represents a single decoded video frame at native resolution
///
/// This is a thin wrapper around an RGB image buffer that provides
/// the pixel access the keying and compositing stages need.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Overwrite every pixel with one color, keeping the allocation
    pub fn fill(&mut self, color: [u8; 3]) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = Rgb(color);
        }
    }

    /// Copy `src` onto this frame with its top-left corner at the origin.
    /// Parts of `src` outside this frame are clipped.
    pub fn blit(&mut self, src: &Frame) {
        imageops::replace(&mut self.buffer, &src.buffer, 0, 0);
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Create a frame from tightly packed RGB bytes
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Pack into the 0x00RRGGBB layout the overlay window presents
    pub fn to_display_buffer(&self) -> DisplayBuffer {
        let pixels = self.buffer.pixels().map(|p| pack_rgb(p.0)).collect();

        DisplayBuffer {
            width: self.width() as usize,
            height: self.height() as usize,
            pixels,
        }
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Pack an RGB triple as 0x00RRGGBB
pub fn pack_rgb(rgb: [u8; 3]) -> u32 {
    ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32
}

/// Composited output ready for the window, one 0x00RRGGBB word per pixel
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl DisplayBuffer {
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

/// Kinds of media a file extension maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Container formats that need the FFmpeg decoder
    Video,
    /// Animated GIF, decoded in pure Rust
    Animation,
    /// Single still image, shown as a one-frame looping clip
    Still,
}

impl MediaKind {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "webm" | "mp4" | "avi" | "mov" | "mkv" | "m4v" => Some(Self::Video),
            "gif" => Some(Self::Animation),
            "png" | "jpg" | "jpeg" | "bmp" => Some(Self::Still),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blit_clips_to_canvas() {
        let mut canvas = Frame::new_filled(4, 4, [255, 0, 255]);
        let src = Frame::new_filled(6, 2, [1, 2, 3]);
        canvas.blit(&src);

        assert_eq!(canvas.get_pixel(3, 1), [1, 2, 3]);
        assert_eq!(canvas.get_pixel(0, 2), [255, 0, 255]);
    }

    #[test]
    fn test_display_buffer_packing() {
        let mut frame = Frame::new_filled(2, 1, [0, 0, 0]);
        frame.set_pixel(1, 0, [0x12, 0x34, 0x56]);

        let display = frame.to_display_buffer();
        assert_eq!(display.dimensions(), (2, 1));
        assert_eq!(display.pixel(0, 0), 0);
        assert_eq!(display.pixel(1, 0), 0x00_12_34_56);
    }

    #[test]
    fn test_media_kind_from_extension() {
        assert_eq!(MediaKind::from_path("clip.WEBM"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path("loop.gif"), Some(MediaKind::Animation));
        assert_eq!(MediaKind::from_path("still.png"), Some(MediaKind::Still));
        assert_eq!(MediaKind::from_path("notes.txt"), None);
        assert_eq!(MediaKind::from_path("no_extension"), None);
    }
}
