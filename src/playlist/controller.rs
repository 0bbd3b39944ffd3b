use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::audio::AudioSync;
use crate::chroma::{KeyColor, Tolerance};
use crate::composition::CompositorSurface;
use crate::control::SharedState;
use crate::error::{MediaError, PlaylistError};
use crate::playback::PlaybackState;
use crate::playlist::state::PlaylistState;
use crate::video::{read_looping, DisplayBuffer, Frame, FrameSource, MediaOpener};

/// The clip that became active after a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedClip {
    pub path: PathBuf,
    pub index: usize,
    pub native: (u32, u32),
}

impl LoadedClip {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Owns the playlist and the per-clip decoding, compositing and audio state
///
/// Exactly one frame source and one audio track are live at a time, both
/// bound to the current playlist entry.
pub struct PlaylistController {
    playlist: PlaylistState,
    opener: Box<dyn MediaOpener>,
    source: Option<Box<dyn FrameSource>>,
    audio: AudioSync,
    surface: CompositorSurface,
    playback: PlaybackState,
    last_decoded: Option<Frame>,
    composited_with: Option<(KeyColor, Tolerance, (u32, u32))>,
}

impl PlaylistController {
    pub fn new(opener: Box<dyn MediaOpener>, audio: AudioSync, surface: CompositorSurface) -> Self {
        Self {
            playlist: PlaylistState::Empty,
            opener,
            source: None,
            audio,
            surface,
            playback: PlaybackState::Playing,
            last_decoded: None,
            composited_with: None,
        }
    }

    /// Replace the playlist with `paths` and load the first playable entry
    pub fn select_files(
        &mut self,
        paths: Vec<PathBuf>,
        shared: &SharedState,
    ) -> Result<LoadedClip, PlaylistError> {
        self.playlist.select(paths)?;
        info!("🎞️  Playlist selected with {} entries", self.playlist.len());
        self.load_current(shared)
    }

    pub fn next(&mut self, shared: &SharedState) -> Result<LoadedClip, PlaylistError> {
        self.playlist.advance()?;
        self.load_current(shared)
    }

    pub fn previous(&mut self, shared: &SharedState) -> Result<LoadedClip, PlaylistError> {
        self.playlist.retreat()?;
        self.load_current(shared)
    }

    /// Load the current entry, skipping forward past unreadable ones.
    ///
    /// Gives up with `NoPlayableMedia` after trying every entry once.
    pub fn load_current(&mut self, shared: &SharedState) -> Result<LoadedClip, PlaylistError> {
        let count = self.playlist.len();
        if count == 0 {
            return Err(PlaylistError::NotLoaded);
        }

        for _ in 0..count {
            let (path, index) = match (self.playlist.current(), self.playlist.index()) {
                (Some(path), Some(index)) => (path.to_path_buf(), index),
                _ => return Err(PlaylistError::NotLoaded),
            };

            match self.load_entry(&path, shared) {
                Ok(native) => {
                    info!(
                        "🎬 Loaded {:?} ({}/{}, {}x{})",
                        path,
                        index + 1,
                        count,
                        native.0,
                        native.1
                    );
                    return Ok(LoadedClip { path, index, native });
                }
                Err(e) => {
                    warn!("Skipping playlist entry {}: {}", index + 1, e);
                    self.playlist.advance()?;
                }
            }
        }

        self.release_source();
        self.audio.stop();
        Err(PlaylistError::NoPlayableMedia { count })
    }

    fn load_entry(&mut self, path: &Path, shared: &SharedState) -> Result<(u32, u32), MediaError> {
        self.release_source();
        self.last_decoded = None;
        self.composited_with = None;

        let mut source = self.opener.open(path)?;
        let native = source.dimensions();
        self.surface.reset(native);

        if shared.auto_chroma() {
            if let Some(frame) = read_looping(source.as_mut())? {
                match self.surface.engine().auto_detect(&frame) {
                    Some(key) => {
                        info!("Auto-detected key color {}", key);
                        shared.set_key_color(key);
                    }
                    None => debug!("Frame too small for auto-detection, keeping key color"),
                }
            }
            source.rewind()?;
        }
        self.source = Some(source);

        self.playback = PlaybackState::Playing;
        shared.set_playing(true);
        if let Err(e) = self.audio.load_track(path, self.playback) {
            warn!("Playing {:?} without sound: {}", path, e);
        }

        Ok(native)
    }

    pub fn toggle_playback(&mut self, shared: &SharedState) -> PlaybackState {
        let next = self.playback.toggled();
        self.set_playback(next, shared);
        next
    }

    pub fn set_playback(&mut self, state: PlaybackState, shared: &SharedState) {
        if state != self.playback {
            info!("Playback {}", state);
        }
        self.playback = state;
        self.audio.set_state(state);
        shared.set_playing(state.is_playing());
    }

    /// Produce the display buffer for this tick.
    ///
    /// While playing, one frame is decoded (looping at end of stream) and
    /// composited. While paused, the cached frame is returned as long as the
    /// window size and chroma settings are unchanged; otherwise the last
    /// decoded frame is composited again.
    pub fn frame_tick(
        &mut self,
        window: (u32, u32),
        key: KeyColor,
        tolerance: Tolerance,
    ) -> Result<Option<&DisplayBuffer>, MediaError> {
        let params = (key, tolerance, window);

        if !self.playback.is_playing() {
            if self.composited_with == Some(params) && self.surface.last_frame().is_some() {
                return Ok(self.surface.last_frame());
            }
            let Some(frame) = self.last_decoded.as_ref() else {
                return Ok(None);
            };
            self.composited_with = Some(params);
            return Ok(Some(self.surface.composite(frame, window, key, tolerance)));
        }

        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        let Some(frame) = read_looping(source.as_mut())? else {
            return Ok(self.surface.last_frame());
        };

        self.composited_with = Some(params);
        let out = self.surface.composite(&frame, window, key, tolerance);
        self.last_decoded = Some(frame);
        Ok(Some(out))
    }

    /// What the last tick showed
    pub fn last_frame(&self) -> Option<&DisplayBuffer> {
        self.surface.last_frame()
    }

    /// Key color under a window coordinate of the last scaled canvas
    pub fn pick_color(&self, x: u32, y: u32) -> Option<KeyColor> {
        let scaled = self.surface.scaled_frame()?;
        if x >= scaled.width() || y >= scaled.height() {
            return None;
        }
        Some(self.surface.engine().pick_color_at(scaled, x, y))
    }

    /// Run edge detection against the most recently decoded frame
    pub fn auto_detect_now(&self) -> Option<KeyColor> {
        self.last_decoded
            .as_ref()
            .and_then(|frame| self.surface.engine().auto_detect(frame))
    }

    /// Window size or scale changed
    pub fn invalidate_surface(&mut self) {
        self.surface.invalidate();
    }

    /// Chroma settings were reset; drop the cached output
    pub fn clear_chroma_cache(&mut self) {
        self.surface.clear_cache();
        self.composited_with = None;
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playlist.index()
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn native_size(&self) -> (u32, u32) {
        self.surface.native_size()
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn composite_count(&self) -> u64 {
        self.surface.composite_count()
    }

    fn release_source(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }

    /// Release decoder and audio. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.source.is_some() || self.audio.has_track() {
            debug!("Releasing decoder and audio");
        }
        self.release_source();
        self.audio.stop();
        self.last_decoded = None;
    }
}

impl Drop for PlaylistController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sync::testing::recording_sync;
    use crate::chroma::ChromaKeyEngine;
    use crate::composition::ResampleFilter;
    use crate::video::{DefaultMediaOpener, ReadOutcome};
    use tempfile::TempDir;

    /// Clip whose n-th frame has red channel n
    struct NumberedSource {
        frames: u8,
        cursor: u8,
    }

    impl FrameSource for NumberedSource {
        fn dimensions(&self) -> (u32, u32) {
            (40, 30)
        }

        fn read_next_frame(&mut self) -> Result<ReadOutcome, MediaError> {
            if self.cursor >= self.frames {
                return Ok(ReadOutcome::EndOfStream);
            }
            let frame = Frame::new_filled(40, 30, [self.cursor, 0, 0]);
            self.cursor += 1;
            Ok(ReadOutcome::Frame(frame))
        }

        fn rewind(&mut self) -> Result<(), MediaError> {
            self.cursor = 0;
            Ok(())
        }

        fn close(&mut self) {}
    }

    /// Opens numbered clips; paths containing "broken" are unreadable
    struct NumberedOpener;

    impl MediaOpener for NumberedOpener {
        fn open(&mut self, path: &Path) -> Result<Box<dyn FrameSource>, MediaError> {
            if path.to_string_lossy().contains("broken") {
                return Err(MediaError::unreadable(path, "corrupt container"));
            }
            Ok(Box::new(NumberedSource { frames: 5, cursor: 0 }))
        }
    }

    fn controller(opener: Box<dyn MediaOpener>) -> PlaylistController {
        let (audio, _log) = recording_sync();
        let surface = CompositorSurface::new(ChromaKeyEngine::new(), ResampleFilter::Nearest);
        PlaylistController::new(opener, audio, surface)
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn red_of(buffer: &DisplayBuffer) -> u32 {
        (buffer.pixel(0, 0) >> 16) & 0xff
    }

    #[test]
    fn test_empty_selection_is_fatal() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        assert!(matches!(
            ctl.select_files(Vec::new(), &shared),
            Err(PlaylistError::EmptySelection)
        ));
    }

    #[test]
    fn test_next_len_times_returns_to_start() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.gif", "b.gif", "c.gif"]), &shared).unwrap();

        for _ in 0..3 {
            ctl.next(&shared).unwrap();
        }
        assert_eq!(ctl.current_index(), Some(0));

        let forward = ctl.next(&shared).unwrap();
        let back = ctl.previous(&shared).unwrap();
        assert_eq!(forward.index, 1);
        assert_eq!(back.index, 0);
    }

    #[test]
    fn test_unreadable_entry_auto_advances() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.png");
        let third = dir.path().join("third.png");
        Frame::new_filled(16, 12, [0, 255, 0]).save_png(&first).unwrap();
        Frame::new_filled(20, 10, [0, 0, 255]).save_png(&third).unwrap();
        let missing = dir.path().join("second.png");

        let mut ctl = controller(Box::new(DefaultMediaOpener::new()));
        let shared = SharedState::default();
        ctl.select_files(vec![first, missing, third.clone()], &shared).unwrap();

        let clip = ctl.next(&shared).unwrap();
        assert_eq!(clip.index, 2);
        assert_eq!(clip.path, third);
        assert_eq!(clip.native, (20, 10));
    }

    #[test]
    fn test_all_entries_unreadable() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        let result = ctl.select_files(paths(&["broken1.mp4", "broken2.mp4"]), &shared);
        assert!(matches!(result, Err(PlaylistError::NoPlayableMedia { count: 2 })));
    }

    #[test]
    fn test_pause_shows_cached_frame_then_resumes() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();
        let window = (40, 30);
        let (key, tol) = (KeyColor::MAGENTA, Tolerance(0));

        ctl.frame_tick(window, key, tol).unwrap();
        let shown = red_of(ctl.frame_tick(window, key, tol).unwrap().unwrap());
        assert_eq!(shown, 1);
        let composites = ctl.composite_count();

        ctl.toggle_playback(&shared);
        assert!(!shared.is_playing());
        for _ in 0..3 {
            let paused = ctl.frame_tick(window, key, tol).unwrap().unwrap();
            assert_eq!(red_of(paused), 1);
        }
        assert_eq!(ctl.composite_count(), composites);

        ctl.toggle_playback(&shared);
        let resumed = red_of(ctl.frame_tick(window, key, tol).unwrap().unwrap());
        assert_eq!(resumed, 2);
    }

    #[test]
    fn test_paused_recomposites_after_resize() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();
        ctl.frame_tick((40, 30), KeyColor::MAGENTA, Tolerance(0)).unwrap();
        ctl.set_playback(PlaybackState::Paused, &shared);

        ctl.invalidate_surface();
        let out = ctl.frame_tick((80, 60), KeyColor::MAGENTA, Tolerance(0)).unwrap().unwrap();
        assert_eq!(out.dimensions(), (80, 60));
        assert_eq!(red_of(out), 0);
    }

    #[test]
    fn test_paused_recomposites_once_for_new_key() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();
        let window = (40, 30);
        ctl.frame_tick(window, KeyColor::MAGENTA, Tolerance(0)).unwrap();
        let shown = red_of(ctl.frame_tick(window, KeyColor::MAGENTA, Tolerance(0)).unwrap().unwrap());
        assert_eq!(shown, 1);
        ctl.set_playback(PlaybackState::Paused, &shared);
        let before = ctl.composite_count();

        // Frame 1 is (1, 0, 0); a key 4 away with tolerance 10 snaps it
        let key = KeyColor::new(5, 0, 0);
        let out = ctl.frame_tick(window, key, Tolerance(10)).unwrap().unwrap();
        assert!(out.pixels.iter().all(|&p| p == key.to_u32()));
        assert_eq!(ctl.composite_count(), before + 1);

        ctl.frame_tick(window, key, Tolerance(10)).unwrap();
        assert_eq!(ctl.composite_count(), before + 1);
    }

    #[test]
    fn test_chroma_reset_rebuilds_paused_frame() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();
        let window = (40, 30);
        let (key, tol) = (KeyColor::new(5, 0, 0), Tolerance(10));
        ctl.frame_tick(window, key, tol).unwrap();
        ctl.set_playback(PlaybackState::Paused, &shared);
        let before = ctl.composite_count();

        ctl.clear_chroma_cache();
        assert!(ctl.last_frame().is_none());

        let out = ctl
            .frame_tick(window, KeyColor::MAGENTA, Tolerance(0))
            .unwrap()
            .unwrap();
        assert_eq!(red_of(out), 0);
        assert!(out.pixels.iter().all(|&p| p == 0));
        assert_eq!(ctl.composite_count(), before + 1);
    }

    #[test]
    fn test_playback_loops_at_end_of_stream() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();

        let reds: Vec<u32> = (0..7)
            .map(|_| red_of(ctl.frame_tick((40, 30), KeyColor::MAGENTA, Tolerance(0)).unwrap().unwrap()))
            .collect();
        assert_eq!(reds, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn test_auto_chroma_on_load_keeps_first_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("green.png");
        Frame::new_filled(64, 48, [0, 200, 0]).save_png(&path).unwrap();

        let mut ctl = controller(Box::new(DefaultMediaOpener::new()));
        let shared = SharedState::new(KeyColor::MAGENTA, Tolerance(30), true);
        ctl.select_files(vec![path], &shared).unwrap();

        assert_eq!(shared.key_color(), KeyColor::new(0, 200, 0));
        let out = ctl
            .frame_tick((64, 48), shared.key_color(), shared.tolerance())
            .unwrap();
        assert!(out.is_some());
    }

    #[test]
    fn test_pick_color_bounds_checked() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();
        assert_eq!(ctl.pick_color(0, 0), None);

        ctl.frame_tick((40, 30), KeyColor::MAGENTA, Tolerance(0)).unwrap();
        assert_eq!(ctl.pick_color(5, 5), Some(KeyColor::new(0, 0, 0)));
        assert_eq!(ctl.pick_color(40, 5), None);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut ctl = controller(Box::new(NumberedOpener));
        let shared = SharedState::default();
        ctl.select_files(paths(&["a.mp4"]), &shared).unwrap();
        ctl.teardown();
        ctl.teardown();
        assert_eq!(ctl.frame_tick((40, 30), KeyColor::MAGENTA, Tolerance(0)).unwrap(), None);
    }
}
