//! The render/event loop tying playlist, compositor, window and control
//! surface together.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use crate::audio::{AudioSync, RodioBackend};
use crate::chroma::{ChromaKeyEngine, KeyColor, Tolerance};
use crate::composition::{CompositorSurface, ScaleState};
use crate::config::Config;
use crate::control::{ControlIntent, SharedState};
use crate::dialogs;
use crate::error::{OverlayError, PlaylistError, Result};
use crate::info::InfoSummary;
use crate::playlist::{LoadedClip, PlaylistController};
use crate::video::{DisplayBuffer, MediaOpener};
use crate::window::draw::{avoid_key, draw_crosshair, draw_ring, draw_text_5x7};
use crate::window::{
    prompt_tolerance, DragState, InputCommand, InputGate, OverlayWindow, TransparencyWindowAdapter,
};

const PICK_RING_RADIUS: i32 = 10;
const PICK_COLOR: u32 = 0x00FF_FF00;

/// Desktop overlay session: one window, one playlist, one control channel
pub struct OverlayApp {
    shared: Arc<SharedState>,
    intents: UnboundedReceiver<ControlIntent>,
    controller: PlaylistController,
    window: OverlayWindow,
    scale: ScaleState,
    drag: DragState,
    input: InputGate,
    picking: bool,
    mouse_was_down: bool,
    clip: Option<LoadedClip>,
    torn_down: bool,
}

impl OverlayApp {
    pub fn new(
        config: &Config,
        shared: Arc<SharedState>,
        intents: UnboundedReceiver<ControlIntent>,
        opener: Box<dyn MediaOpener>,
    ) -> Result<Self> {
        let audio = if config.audio.enabled {
            match RodioBackend::new(config.audio.volume, config.audio.loop_track) {
                Ok(backend) => AudioSync::new(Box::new(backend)),
                Err(e) => {
                    warn!("Audio unavailable, playing silently: {}", e);
                    AudioSync::disabled()
                }
            }
        } else {
            debug!("Audio disabled by configuration");
            AudioSync::disabled()
        };

        let engine = ChromaKeyEngine::with_edge_margin(config.chroma.edge_margin);
        let surface = CompositorSurface::new(engine, config.playback.filter);
        let controller = PlaylistController::new(opener, audio, surface);

        let window = OverlayWindow::open(
            &config.window.title,
            (config.window.initial_width, config.window.initial_height),
            config.playback.tick_rate as usize,
        )?;

        Ok(Self {
            shared,
            intents,
            controller,
            window,
            scale: config.scale_state(),
            drag: DragState::default(),
            input: InputGate::default(),
            picking: false,
            mouse_was_down: false,
            clip: None,
            torn_down: false,
        })
    }

    /// Load the initial playlist; with no paths the file dialog is shown.
    ///
    /// An empty selection is returned as `EmptySelection`.
    pub fn start(&mut self, files: Vec<PathBuf>) -> Result<()> {
        let files = if files.is_empty() {
            dialogs::pick_media_files()
        } else {
            files
        };

        let clip = self.controller.select_files(files, &self.shared)?;
        self.on_loaded(clip)
    }

    /// Run until quit, window close or a fatal error, then tear down.
    pub fn run(&mut self) -> Result<()> {
        info!("▶️  Overlay running");
        let result = self.run_loop();
        if let Err(e) = &result {
            error!("Overlay stopped: {}", e.user_message());
        }
        self.teardown();
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.shared.is_running() && self.window.is_open() {
            if let Err(e) = self.tick() {
                if !e.is_recoverable() {
                    return Err(e);
                }
                warn!("{}", e);
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        self.drain_intents()?;
        for command in self.input.admit(self.window.pressed_commands()) {
            self.handle_command(command)?;
        }
        self.handle_mouse()?;
        if !self.shared.is_running() {
            return Ok(());
        }

        self.sync_window_size()?;
        let key = self.shared.key_color();
        if self.window.color_key() != Some(key) {
            self.window.set_color_key(key)?;
        }

        let size = self.window.size();
        let ticked = self
            .controller
            .frame_tick(size, key, self.shared.tolerance())
            .map(|frame| frame.is_some());
        if let Err(e) = ticked {
            warn!("Decoding failed, moving to the next file: {}", e);
            return self.next_clip();
        }

        match self.controller.last_frame() {
            Some(frame) if self.picking => {
                let mut hud = frame.clone();
                draw_pick_overlay(&mut hud, self.window.mouse_pos(), key);
                self.window.present(&hud)?;
            }
            Some(frame) => self.window.present(frame)?,
            None => self.window.pump(),
        }
        self.input.pumped();
        Ok(())
    }

    fn drain_intents(&mut self) -> Result<()> {
        while let Ok(intent) = self.intents.try_recv() {
            debug!("Applying control intent {:?}", intent);
            match intent {
                ControlIntent::ShowInfo => self.show_info(),
                ControlIntent::PromptTolerance => self.prompt_tolerance()?,
                ControlIntent::SetTolerance(value) => {
                    self.shared.set_tolerance(Tolerance(value));
                    info!("Tolerance set to {}", value);
                }
                ControlIntent::ResetChroma => self.reset_chroma(),
                ControlIntent::EnableAutoChroma => self.enable_auto_chroma()?,
                ControlIntent::TogglePlayback => {
                    self.controller.toggle_playback(&self.shared);
                }
                ControlIntent::Next => self.next_clip()?,
                ControlIntent::Previous => self.previous_clip()?,
                ControlIntent::Quit => self.shared.request_shutdown(),
            }
        }
        Ok(())
    }

    fn handle_command(&mut self, command: InputCommand) -> Result<()> {
        match command {
            InputCommand::Cancel if self.picking => {
                self.picking = false;
                info!("Color pick cancelled");
            }
            InputCommand::Cancel => self.shared.request_shutdown(),
            InputCommand::TogglePlayback => {
                self.controller.toggle_playback(&self.shared);
            }
            InputCommand::SelectFiles => {
                let files = dialogs::pick_media_files();
                if files.is_empty() {
                    info!("Selection cancelled, keeping the current playlist");
                } else {
                    let loaded = self.controller.select_files(files, &self.shared);
                    self.after_switch(loaded)?;
                }
            }
            InputCommand::PickColor => {
                self.picking = true;
                info!("Color pick mode: click a pixel to use as the key color");
            }
            InputCommand::ResetChroma => self.reset_chroma(),
            InputCommand::AutoChroma => self.enable_auto_chroma()?,
            InputCommand::ResetScale => {
                self.scale.reset();
                debug!("Scale reset to {:.2}", self.scale.factor());
            }
            InputCommand::ScaleUp => {
                self.scale.increase();
                debug!("Scale {:.2}", self.scale.factor());
            }
            InputCommand::ScaleDown => {
                self.scale.decrease();
                debug!("Scale {:.2}", self.scale.factor());
            }
            InputCommand::Previous => self.previous_clip()?,
            InputCommand::Next => self.next_clip()?,
        }
        Ok(())
    }

    fn handle_mouse(&mut self) -> Result<()> {
        let down = self.window.left_mouse_down();
        let cursor = self.window.mouse_pos();
        let pressed = down && !self.mouse_was_down;
        self.mouse_was_down = down;

        if pressed && self.picking {
            if let Some((x, y)) = cursor.filter(|&(x, y)| x >= 0.0 && y >= 0.0) {
                if let Some(color) = self.controller.pick_color(x as u32, y as u32) {
                    self.picking = false;
                    self.shared.set_key_color(color);
                    self.shared.set_auto_chroma(false);
                    info!("Key color picked at ({}, {}): {}", x as u32, y as u32, color);
                    self.prompt_tolerance()?;
                }
            }
        } else if pressed {
            if let Some(cursor) = cursor {
                self.drag.begin(cursor);
            }
        } else if down {
            if let Some(cursor) = cursor {
                if let Some((x, y)) = self.drag.target(self.window.position(), cursor) {
                    self.window.move_to(x, y)?;
                }
            }
        } else {
            self.drag.end();
        }
        Ok(())
    }

    /// Match the window to the scaled source size
    fn sync_window_size(&mut self) -> Result<()> {
        let native = self.controller.native_size();
        if native == (0, 0) {
            return Ok(());
        }
        let target = self.scale.window_size(native);
        if target != self.window.size() {
            self.window.resize(target.0, target.1)?;
            self.controller.invalidate_surface();
            debug!("Window resized to {}x{}", target.0, target.1);
        }
        Ok(())
    }

    fn on_loaded(&mut self, clip: LoadedClip) -> Result<()> {
        self.drag.end();
        self.clip = Some(clip);
        self.sync_window_size()
    }

    fn next_clip(&mut self) -> Result<()> {
        let loaded = self.controller.next(&self.shared);
        self.after_switch(loaded)
    }

    fn previous_clip(&mut self) -> Result<()> {
        let loaded = self.controller.previous(&self.shared);
        self.after_switch(loaded)
    }

    fn after_switch(&mut self, loaded: std::result::Result<LoadedClip, PlaylistError>) -> Result<()> {
        match loaded {
            Ok(clip) => self.on_loaded(clip),
            Err(PlaylistError::NoPlayableMedia { count }) => {
                error!("None of the {} playlist entries can be played, shutting down", count);
                self.shared.request_shutdown();
                Ok(())
            }
            Err(e) => Err(OverlayError::from(e)),
        }
    }

    fn reset_chroma(&mut self) {
        self.shared.reset_chroma();
        self.controller.clear_chroma_cache();
        info!(
            "Chroma reset to {} with tolerance {}",
            self.shared.key_color(),
            self.shared.tolerance()
        );
    }

    fn enable_auto_chroma(&mut self) -> Result<()> {
        self.shared.set_auto_chroma(true);
        match self.controller.auto_detect_now() {
            Some(key) => {
                self.shared.set_key_color(key);
                info!("Auto-detected key color {}", key);
            }
            None => info!("Auto-chroma enabled; no frame to sample yet"),
        }
        self.prompt_tolerance()
    }

    fn prompt_tolerance(&mut self) -> Result<()> {
        let size = self.window.size();
        let current = self.shared.tolerance();
        let key = self.shared.key_color();
        let background = self.controller.last_frame();

        if let Some(tolerance) = prompt_tolerance(&mut self.window, background, size, current, key)? {
            self.shared.set_tolerance(tolerance);
            info!("Tolerance set to {}", tolerance);
        }
        self.input.modal_closed();
        // The click that opened the prompt must not start a drag
        self.mouse_was_down = self.window.left_mouse_down();
        Ok(())
    }

    pub fn info_summary(&self) -> InfoSummary {
        let (file_name, index) = match &self.clip {
            Some(clip) => (clip.file_name(), clip.index),
            None => ("None".to_string(), 0),
        };
        InfoSummary {
            file_name,
            position: (index + 1, self.controller.len()),
            window_size: self.window.size(),
            scale: self.scale.factor(),
            key_color: self.shared.key_color(),
            tolerance: self.shared.tolerance(),
            auto_chroma: self.shared.auto_chroma(),
        }
    }

    fn show_info(&self) {
        let summary = self.info_summary();
        info!("Overlay info:\n{}", summary);
        dialogs::show_info(&summary);
    }

    /// Stop the control surface, decoder and audio. Safe to call more than once.
    pub fn teardown(&mut self) {
        if std::mem::replace(&mut self.torn_down, true) {
            return;
        }
        self.shared.request_shutdown();
        self.controller.teardown();
        info!("👋 Overlay shut down");
    }
}

impl Drop for OverlayApp {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Cursor ring, crosshair and hint line shown while picking a key color
fn draw_pick_overlay(frame: &mut DisplayBuffer, cursor: Option<(f32, f32)>, key: KeyColor) {
    let key = key.to_u32();
    let color = avoid_key(PICK_COLOR, key);
    let shadow = avoid_key(0, key);

    draw_text_5x7(frame, 4, 4, "PICK: CLICK A PIXEL", color, shadow);
    draw_text_5x7(frame, 4, 14, "ESC CANCELS", color, shadow);
    if let Some((x, y)) = cursor {
        let (x, y) = (x as i32, y as i32);
        draw_ring(frame, x, y, PICK_RING_RADIUS, color);
        draw_crosshair(frame, x, y, PICK_RING_RADIUS - 3, color);
    }
}
