use std::path::Path;

use tracing::{debug, warn};

use crate::error::MediaError;
use crate::video::image_source::ImageFrameSource;
use crate::video::types::{Frame, MediaKind};

/// Outcome of a single sequential read
#[derive(Debug)]
pub enum ReadOutcome {
    Frame(Frame),
    EndOfStream,
}

/// A decodable video stream read front to back
///
/// Reads advance an internal cursor; the only seek is [`FrameSource::rewind`],
/// which the render loop uses to loop playback.
pub trait FrameSource {
    /// Native frame dimensions (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Decode the next frame
    fn read_next_frame(&mut self) -> Result<ReadOutcome, MediaError>;

    /// Seek back to the first frame
    fn rewind(&mut self) -> Result<(), MediaError>;

    /// Release decoder resources. Safe to call more than once.
    fn close(&mut self);
}

/// Read the next frame, looping back to the start once on end of stream.
///
/// `Ok(None)` means the source produced nothing even after rewinding.
pub fn read_looping(source: &mut dyn FrameSource) -> Result<Option<Frame>, MediaError> {
    if let ReadOutcome::Frame(frame) = source.read_next_frame()? {
        return Ok(Some(frame));
    }

    debug!("End of stream, rewinding to first frame");
    source.rewind()?;
    match source.read_next_frame()? {
        ReadOutcome::Frame(frame) => Ok(Some(frame)),
        ReadOutcome::EndOfStream => {
            warn!("Source yielded no frame after rewinding");
            Ok(None)
        }
    }
}

/// Opens a frame source for a path; the playlist's seam for decoding backends
pub trait MediaOpener {
    fn open(&mut self, path: &Path) -> Result<Box<dyn FrameSource>, MediaError>;
}

/// Picks the decoder from the file extension
#[derive(Debug, Default)]
pub struct DefaultMediaOpener;

impl DefaultMediaOpener {
    pub fn new() -> Self {
        Self
    }
}

impl MediaOpener for DefaultMediaOpener {
    fn open(&mut self, path: &Path) -> Result<Box<dyn FrameSource>, MediaError> {
        if !path.is_file() {
            return Err(MediaError::unreadable(path, "file does not exist"));
        }

        match MediaKind::from_path(path) {
            Some(MediaKind::Video) => open_video(path),
            Some(kind) => Ok(Box::new(ImageFrameSource::open(path, kind)?)),
            None => Err(MediaError::unreadable(path, "unrecognized file extension")),
        }
    }
}

#[cfg(feature = "ffmpeg")]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>, MediaError> {
    let source = crate::video::ffmpeg_source::FfmpegFrameSource::open(path)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "ffmpeg"))]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>, MediaError> {
    Err(MediaError::unreadable(
        path,
        "built without the 'ffmpeg' feature; only GIF and still images are supported",
    ))
}
