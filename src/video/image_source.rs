use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage};
use tracing::{debug, info};

use crate::error::MediaError;
use crate::video::source::{FrameSource, ReadOutcome};
use crate::video::types::{Frame, MediaKind};

/// Pure Rust frame source for animated GIFs and still images
///
/// All frames are decoded up front; a still image is a one-frame clip that
/// loops forever through the normal rewind path.
pub struct ImageFrameSource {
    frames: Vec<Frame>,
    cursor: usize,
    width: u32,
    height: u32,
    closed: bool,
}

impl ImageFrameSource {
    pub fn open<P: AsRef<Path>>(path: P, kind: MediaKind) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let frames = match kind {
            MediaKind::Animation => Self::decode_gif(path)?,
            MediaKind::Still => vec![Self::decode_still(path)?],
            MediaKind::Video => {
                return Err(MediaError::UnsupportedFormat {
                    format: path.extension().and_then(|e| e.to_str()).unwrap_or("").to_string(),
                })
            }
        };

        let (width, height) = frames
            .first()
            .map(Frame::dimensions)
            .ok_or_else(|| MediaError::unreadable(path, "no frames in file"))?;

        info!("Opened {:?}: {} frame(s) at {}x{}", path, frames.len(), width, height);

        Ok(Self {
            frames,
            cursor: 0,
            width,
            height,
            closed: false,
        })
    }

    fn decode_still(path: &Path) -> Result<Frame, MediaError> {
        let image = image::open(path).map_err(|e| MediaError::unreadable(path, e.to_string()))?;

        let rgb_image = match image {
            DynamicImage::ImageRgb8(img) => img,
            _ => image.to_rgb8(),
        };

        Ok(Frame::new(rgb_image))
    }

    fn decode_gif(path: &Path) -> Result<Vec<Frame>, MediaError> {
        let file = File::open(path).map_err(|e| MediaError::unreadable(path, e.to_string()))?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .map_err(|e| MediaError::unreadable(path, e.to_string()))?;

        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| MediaError::unreadable(path, e.to_string()))?;

        debug!("Decoded {} GIF frames from {:?}", frames.len(), path);

        Ok(frames
            .into_iter()
            .map(|f| Frame::new(DynamicImage::ImageRgba8(f.into_buffer()).to_rgb8()))
            .collect())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ImageFrameSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_next_frame(&mut self) -> Result<ReadOutcome, MediaError> {
        if self.closed {
            return Err(MediaError::DecodingFailed {
                reason: "source is closed".to_string(),
            });
        }

        match self.frames.get(self.cursor) {
            Some(frame) => {
                self.cursor += 1;
                Ok(ReadOutcome::Frame(frame.clone()))
            }
            None => Ok(ReadOutcome::EndOfStream),
        }
    }

    fn rewind(&mut self) -> Result<(), MediaError> {
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.frames.clear();
            self.closed = true;
        }
    }
}
