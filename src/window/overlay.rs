use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tracing::debug;

use crate::chroma::KeyColor;
use crate::error::WindowError;
use crate::video::DisplayBuffer;
use crate::window::adapter::TransparencyWindowAdapter;
use crate::window::input::{command_for_key, InputCommand, COMMAND_KEYS};
use crate::window::platform;

/// Borderless, topmost minifb window showing the composited frames
pub struct OverlayWindow {
    window: Window,
    title: String,
    size: (u32, u32),
    target_fps: usize,
    color_key: Option<KeyColor>,
}

impl OverlayWindow {
    pub fn open(title: &str, size: (u32, u32), target_fps: usize) -> Result<Self, WindowError> {
        let window = Self::create(title, size, target_fps)?;
        debug!("Overlay window created at {}x{}", size.0, size.1);
        Ok(Self {
            window,
            title: title.to_string(),
            size,
            target_fps,
            color_key: None,
        })
    }

    fn create(title: &str, size: (u32, u32), target_fps: usize) -> Result<Window, WindowError> {
        let options = WindowOptions {
            borderless: true,
            title: false,
            resize: false,
            topmost: true,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, size.0 as usize, size.1 as usize, options)
            .map_err(|e| WindowError::CreateFailed { reason: e.to_string() })?;
        window.set_target_fps(target_fps);
        Ok(window)
    }

    /// Show `frame`; also pumps window events and paces to the target rate
    pub fn present(&mut self, frame: &DisplayBuffer) -> Result<(), WindowError> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| WindowError::UpdateFailed { reason: e.to_string() })
    }

    /// Pump events without drawing, for ticks with nothing to show
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// False once the OS closed the window
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Commands for keys pressed since the last update, in binding order
    pub fn pressed_commands(&self) -> Vec<InputCommand> {
        COMMAND_KEYS
            .iter()
            .filter(|&&key| self.window.is_key_pressed(key, KeyRepeat::No))
            .filter_map(|&key| command_for_key(key))
            .collect()
    }

    pub fn pressed_keys(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::Yes)
    }

    /// Cursor in window coordinates, also reported outside the window while dragging
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Pass)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    pub fn color_key(&self) -> Option<KeyColor> {
        self.color_key
    }
}

impl TransparencyWindowAdapter for OverlayWindow {
    fn set_color_key(&mut self, key: KeyColor) -> Result<(), WindowError> {
        platform::apply_color_key(self.window.get_window_handle(), key)?;
        self.window.topmost(true);
        if self.color_key != Some(key) {
            debug!("Window color key set to {}", key);
        }
        self.color_key = Some(key);
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), WindowError> {
        self.window.set_position(x as isize, y as isize);
        platform::keep_topmost(self.window.get_window_handle(), Some((x, y)))
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), WindowError> {
        if (width, height) == self.size {
            return Ok(());
        }
        let (x, y) = self.position();
        self.window = Self::create(&self.title, (width, height), self.target_fps)?;
        self.size = (width, height);
        self.window.set_position(x as isize, y as isize);
        debug!("Overlay window recreated at {}x{}", width, height);

        if let Some(key) = self.color_key {
            self.set_color_key(key)?;
        }
        Ok(())
    }

    fn position(&self) -> (i32, i32) {
        let (x, y) = self.window.get_position();
        (x as i32, y as i32)
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}
