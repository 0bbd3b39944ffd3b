use std::fmt;

use crate::chroma::{KeyColor, Tolerance};

/// Read-only snapshot shown by the info dialog and written to the log
#[derive(Debug, Clone, PartialEq)]
pub struct InfoSummary {
    pub file_name: String,
    /// 1-based playlist position and playlist length
    pub position: (usize, usize),
    pub window_size: (u32, u32),
    pub scale: f32,
    pub key_color: KeyColor,
    pub tolerance: Tolerance,
    pub auto_chroma: bool,
}

impl fmt::Display for InfoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Current Video: {} ({}/{})",
            self.file_name, self.position.0, self.position.1
        )?;
        writeln!(f, "Dimensions: {}x{}", self.window_size.0, self.window_size.1)?;
        writeln!(f, "Scale Factor: {:.2}", self.scale)?;
        writeln!(f, "Transparency Color: {}", self.key_color)?;
        writeln!(f, "Color Tolerance: {}", self.tolerance)?;
        write!(f, "Auto-Chroma Enabled: {}", self.auto_chroma)
    }
}
