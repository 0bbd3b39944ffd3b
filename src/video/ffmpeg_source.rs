//! FFmpeg-backed frame source for container formats (webm, mp4, avi, mov, mkv).

use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::format;
use ffmpeg::media::Type;
use ffmpeg::software::scaling;
use ffmpeg::util::frame::video::Video as FfmpegFrame;
use tracing::{debug, info};

use crate::error::MediaError;
use crate::video::source::{FrameSource, ReadOutcome};
use crate::video::types::Frame;

struct Decoding {
    input_ctx: format::context::Input,
    video_stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: scaling::Context,
    eof_sent: bool,
}

pub struct FfmpegFrameSource {
    inner: Option<Decoding>,
    width: u32,
    height: u32,
}

impl FfmpegFrameSource {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        ffmpeg::init().map_err(|e| MediaError::unreadable(path, format!("FFmpeg init: {e}")))?;

        let input_ctx = format::input(&path)
            .map_err(|e| MediaError::unreadable(path, format!("Open input: {e}")))?;

        let stream = input_ctx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| MediaError::unreadable(path, "no video stream"))?;
        let video_stream_index = stream.index();

        let decoder_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| MediaError::unreadable(path, format!("Decoder context: {e}")))?;
        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| MediaError::unreadable(path, format!("Open decoder: {e}")))?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(MediaError::unreadable(path, "stream reports zero dimensions"));
        }

        // Colorspace conversion happens here: whatever the codec emits becomes packed RGB24
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| MediaError::unreadable(path, format!("Scaler init: {e}")))?;

        info!("Opened {:?} with FFmpeg: {}x{} ({:?})", path, width, height, decoder.format());

        Ok(Self {
            inner: Some(Decoding {
                input_ctx,
                video_stream_index,
                decoder,
                scaler,
                eof_sent: false,
            }),
            width,
            height,
        })
    }

    fn decoding(&mut self) -> Result<&mut Decoding, MediaError> {
        self.inner.as_mut().ok_or_else(|| MediaError::DecodingFailed {
            reason: "source is closed".to_string(),
        })
    }
}

impl Decoding {
    fn next_video_packet(&mut self) -> Option<ffmpeg::Packet> {
        let index = self.video_stream_index;
        for (stream, packet) in self.input_ctx.packets() {
            if stream.index() == index {
                return Some(packet);
            }
        }
        None
    }

    fn decode_next(&mut self) -> Result<Option<FfmpegFrame>, MediaError> {
        let mut decoded = FfmpegFrame::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }
            if self.eof_sent {
                return Ok(None);
            }

            match self.next_video_packet() {
                Some(packet) => {
                    self.decoder.send_packet(&packet).map_err(|e| MediaError::DecodingFailed {
                        reason: format!("Send packet: {e}"),
                    })?;
                }
                None => {
                    // Drain whatever the decoder still buffers
                    self.decoder.send_eof().ok();
                    self.eof_sent = true;
                }
            }
        }
    }

    fn to_rgb_frame(&mut self, decoded: &FfmpegFrame, width: u32, height: u32) -> Result<Frame, MediaError> {
        let mut rgb_frame = FfmpegFrame::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| MediaError::DecodingFailed { reason: format!("Scale frame: {e}") })?;

        let row_bytes = width as usize * 3;
        let src_stride = rgb_frame.stride(0);
        let src_data = rgb_frame.data(0);

        let data = if src_stride == row_bytes {
            src_data[..row_bytes * height as usize].to_vec()
        } else {
            let mut buf = vec![0u8; row_bytes * height as usize];
            for y in 0..height as usize {
                let src_offset = y * src_stride;
                buf[y * row_bytes..(y + 1) * row_bytes]
                    .copy_from_slice(&src_data[src_offset..src_offset + row_bytes]);
            }
            buf
        };

        Frame::from_rgb_bytes(width, height, data).ok_or_else(|| MediaError::DecodingFailed {
            reason: "RGB buffer size mismatch".to_string(),
        })
    }
}

impl FrameSource for FfmpegFrameSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_next_frame(&mut self) -> Result<ReadOutcome, MediaError> {
        let (width, height) = (self.width, self.height);
        let decoding = self.decoding()?;

        match decoding.decode_next()? {
            Some(decoded) => Ok(ReadOutcome::Frame(decoding.to_rgb_frame(&decoded, width, height)?)),
            None => Ok(ReadOutcome::EndOfStream),
        }
    }

    fn rewind(&mut self) -> Result<(), MediaError> {
        let decoding = self.decoding()?;
        decoding
            .input_ctx
            .seek(0, ..0i64)
            .map_err(|e| MediaError::SeekFailed { reason: e.to_string() })?;
        decoding.decoder.flush();
        decoding.eof_sent = false;
        debug!("Rewound FFmpeg source to start");
        Ok(())
    }

    fn close(&mut self) {
        if self.inner.take().is_some() {
            debug!("Released FFmpeg decoder");
        }
    }
}
