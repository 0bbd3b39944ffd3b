use std::path::Path;

use tracing::{debug, info};

use crate::error::AudioError;
use crate::playback::PlaybackState;

/// A loaded audio track that can be started and held
pub trait AudioTrack {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
}

/// Opens the audio of a media file on some output device
pub trait AudioBackend {
    fn open_track(&mut self, path: &Path) -> Result<Box<dyn AudioTrack>, AudioError>;
}

/// Keeps the active file's audio in step with play/pause
///
/// Only user-level play/pause is mirrored; there is no timestamp sync.
pub struct AudioSync {
    backend: Option<Box<dyn AudioBackend>>,
    track: Option<Box<dyn AudioTrack>>,
    state: PlaybackState,
}

impl AudioSync {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend: Some(backend),
            track: None,
            state: PlaybackState::Playing,
        }
    }

    /// Audio switched off by configuration or missing output device
    pub fn disabled() -> Self {
        Self {
            backend: None,
            track: None,
            state: PlaybackState::Playing,
        }
    }

    /// Replace the active track with the audio of `path`.
    ///
    /// Playback starts immediately unless `state` is paused. On failure the
    /// previous track is already released and the video continues silently.
    pub fn load_track(&mut self, path: &Path, state: PlaybackState) -> Result<(), AudioError> {
        self.stop();
        self.state = state;

        let Some(backend) = self.backend.as_mut() else {
            debug!("Audio disabled, skipping track for {:?}", path);
            return Ok(());
        };

        let mut track = backend.open_track(path)?;
        if state.is_playing() {
            track.play();
        } else {
            track.pause();
        }
        info!("Loaded audio from {:?} ({})", path, state);
        self.track = Some(track);
        Ok(())
    }

    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
        if let Some(track) = self.track.as_mut() {
            track.play();
        }
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
        if let Some(track) = self.track.as_mut() {
            track.pause();
        }
    }

    pub fn set_state(&mut self, state: PlaybackState) {
        match state {
            PlaybackState::Playing => self.play(),
            PlaybackState::Paused => self.pause(),
        }
    }

    /// Release the active track. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut track) = self.track.take() {
            track.stop();
            debug!("Audio track released");
        }
    }

    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }
}

impl Drop for AudioSync {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub type EventLog = Rc<RefCell<Vec<String>>>;

    pub struct RecordingTrack {
        name: String,
        log: EventLog,
    }

    impl AudioTrack for RecordingTrack {
        fn play(&mut self) {
            self.log.borrow_mut().push(format!("play {}", self.name));
        }

        fn pause(&mut self) {
            self.log.borrow_mut().push(format!("pause {}", self.name));
        }

        fn stop(&mut self) {
            self.log.borrow_mut().push(format!("stop {}", self.name));
        }
    }

    /// Backend that records calls and fails for paths containing "silent"
    pub struct RecordingBackend {
        pub log: EventLog,
    }

    impl AudioBackend for RecordingBackend {
        fn open_track(&mut self, path: &Path) -> Result<Box<dyn AudioTrack>, AudioError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
            if name.contains("silent") {
                return Err(AudioError::LoadFailed { path: name, reason: "no audio stream".into() });
            }
            self.log.borrow_mut().push(format!("open {}", name));
            Ok(Box::new(RecordingTrack { name, log: self.log.clone() }))
        }
    }

    pub fn recording_sync() -> (AudioSync, EventLog) {
        let log = EventLog::default();
        let sync = AudioSync::new(Box::new(RecordingBackend { log: log.clone() }));
        (sync, log)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::recording_sync;
    use super::*;

    #[test]
    fn test_load_starts_playback_when_playing() {
        let (mut sync, log) = recording_sync();
        sync.load_track(Path::new("a.mp4"), PlaybackState::Playing).unwrap();

        assert!(sync.has_track());
        assert_eq!(*log.borrow(), vec!["open a.mp4", "play a.mp4"]);
    }

    #[test]
    fn test_load_while_paused_holds_track() {
        let (mut sync, log) = recording_sync();
        sync.load_track(Path::new("a.mp4"), PlaybackState::Paused).unwrap();
        sync.play();

        assert_eq!(*log.borrow(), vec!["open a.mp4", "pause a.mp4", "play a.mp4"]);
    }

    #[test]
    fn test_new_track_releases_previous() {
        let (mut sync, log) = recording_sync();
        sync.load_track(Path::new("a.mp4"), PlaybackState::Playing).unwrap();
        sync.load_track(Path::new("b.mp4"), PlaybackState::Playing).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["open a.mp4", "play a.mp4", "stop a.mp4", "open b.mp4", "play b.mp4"]
        );
    }

    #[test]
    fn test_failed_load_leaves_no_track() {
        let (mut sync, log) = recording_sync();
        sync.load_track(Path::new("a.mp4"), PlaybackState::Playing).unwrap();

        assert!(sync.load_track(Path::new("silent.mp4"), PlaybackState::Playing).is_err());
        assert!(!sync.has_track());
        // Play/pause without a track are no-ops
        sync.pause();
        assert_eq!(log.borrow().last().map(String::as_str), Some("stop a.mp4"));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut sync, log) = recording_sync();
        sync.load_track(Path::new("a.mp4"), PlaybackState::Playing).unwrap();
        sync.stop();
        sync.stop();

        let stops = log.borrow().iter().filter(|e| e.starts_with("stop")).count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn test_disabled_sync_accepts_loads() {
        let mut sync = AudioSync::disabled();
        sync.load_track(Path::new("a.mp4"), PlaybackState::Playing).unwrap();
        assert!(!sync.has_track());
    }
}
