use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::chroma::{KeyColor, Tolerance};

/// State shared between the render loop and the control task
///
/// Every field is its own atomic; no field is read together with another
/// under a lock, so readers may observe a mix of old and new values for one tick.
#[derive(Debug)]
pub struct SharedState {
    running: AtomicBool,
    playing: AtomicBool,
    key_color: AtomicU32,
    tolerance: AtomicU8,
    auto_chroma: AtomicBool,
    default_key: KeyColor,
    default_tolerance: Tolerance,
}

impl SharedState {
    pub fn new(default_key: KeyColor, default_tolerance: Tolerance, auto_chroma: bool) -> Self {
        Self {
            running: AtomicBool::new(true),
            playing: AtomicBool::new(true),
            key_color: AtomicU32::new(default_key.to_u32()),
            tolerance: AtomicU8::new(default_tolerance.value()),
            auto_chroma: AtomicBool::new(auto_chroma),
            default_key,
            default_tolerance,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Observed by the render loop on its next tick
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }

    pub fn key_color(&self) -> KeyColor {
        KeyColor::from_u32(self.key_color.load(Ordering::Relaxed))
    }

    pub fn set_key_color(&self, key: KeyColor) {
        self.key_color.store(key.to_u32(), Ordering::Relaxed);
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance(self.tolerance.load(Ordering::Relaxed))
    }

    pub fn set_tolerance(&self, tolerance: Tolerance) {
        self.tolerance.store(tolerance.value(), Ordering::Relaxed);
    }

    pub fn auto_chroma(&self) -> bool {
        self.auto_chroma.load(Ordering::Relaxed)
    }

    pub fn set_auto_chroma(&self, enabled: bool) {
        self.auto_chroma.store(enabled, Ordering::Relaxed);
    }

    /// Restore the configured key color and tolerance and turn auto-detect off
    pub fn reset_chroma(&self) {
        self.set_key_color(self.default_key);
        self.set_tolerance(self.default_tolerance);
        self.set_auto_chroma(false);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(KeyColor::MAGENTA, Tolerance::DEFAULT, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_key_color_round_trips_through_atomic() {
        let state = SharedState::default();
        state.set_key_color(KeyColor::new(0, 177, 64));
        assert_eq!(state.key_color(), KeyColor::new(0, 177, 64));
    }

    #[test]
    fn test_reset_chroma_restores_defaults() {
        let state = SharedState::new(KeyColor::new(0, 255, 0), Tolerance(40), true);
        state.set_key_color(KeyColor::new(1, 2, 3));
        state.set_tolerance(Tolerance(200));

        state.reset_chroma();

        assert_eq!(state.key_color(), KeyColor::new(0, 255, 0));
        assert_eq!(state.tolerance(), Tolerance(40));
        assert!(!state.auto_chroma());
    }

    #[test]
    fn test_shutdown_visible_across_threads() {
        let state = Arc::new(SharedState::default());
        let remote = Arc::clone(&state);

        std::thread::spawn(move || remote.request_shutdown())
            .join()
            .unwrap();

        assert!(!state.is_running());
    }
}
