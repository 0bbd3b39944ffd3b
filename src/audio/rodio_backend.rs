use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use crate::audio::sync::{AudioBackend, AudioTrack};
use crate::error::AudioError;

/// Plays media audio on the default output device through rodio
pub struct RodioBackend {
    // Dropping the stream silences every sink created from its handle
    _stream: OutputStream,
    handle: OutputStreamHandle,
    volume: f32,
    loop_track: bool,
}

impl RodioBackend {
    pub fn new(volume: f32, loop_track: bool) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| AudioError::NoOutputDevice {
            reason: e.to_string(),
        })?;
        debug!("Opened default audio output (volume {:.2}, loop {})", volume, loop_track);

        Ok(Self {
            _stream: stream,
            handle,
            volume,
            loop_track,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn open_track(&mut self, path: &Path) -> Result<Box<dyn AudioTrack>, AudioError> {
        let load_failed = |reason: String| AudioError::LoadFailed {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| load_failed(e.to_string()))?;
        let reader = BufReader::new(file);
        let sink = Sink::try_new(&self.handle).map_err(|e| load_failed(e.to_string()))?;

        // Hold the sink until the caller decides to start it
        sink.pause();
        sink.set_volume(self.volume);

        if self.loop_track {
            let source = Decoder::new_looped(reader).map_err(|e| load_failed(e.to_string()))?;
            sink.append(source);
        } else {
            let source = Decoder::new(reader).map_err(|e| load_failed(e.to_string()))?;
            sink.append(source);
        }

        Ok(Box::new(RodioTrack { sink }))
    }
}

struct RodioTrack {
    sink: Sink,
}

impl AudioTrack for RodioTrack {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}
