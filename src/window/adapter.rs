use crate::chroma::KeyColor;
use crate::error::WindowError;

/// Window operations the overlay needs from the platform
pub trait TransparencyWindowAdapter {
    /// Make pixels exactly equal to `key` invisible and click-through, and
    /// keep the window topmost. Replaces any previous key.
    fn set_color_key(&mut self, key: KeyColor) -> Result<(), WindowError>;

    /// Reposition without resizing
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), WindowError>;

    /// Recreate the drawable surface at the new size, keeping the position.
    /// The current color key is applied again afterwards.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), WindowError>;

    fn position(&self) -> (i32, i32);

    fn size(&self) -> (u32, u32);
}
