use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    chroma::{KeyColor, Tolerance, DEFAULT_EDGE_MARGIN},
    composition::{ResampleFilter, ScaleState},
    error::{ConfigError, Result},
};

/// Main configuration for the chroma overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Key color and auto-detection settings
    pub chroma: ChromaConfig,

    /// Frame pacing, scaling and masking settings
    pub playback: PlaybackConfig,

    /// Overlay window settings
    pub window: WindowConfig,

    /// Audio output settings
    pub audio: AudioConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.chroma.validate()?;
        self.playback.validate()?;
        self.window.validate()?;
        self.audio.validate()?;
        Ok(())
    }

    /// Scale state seeded from the playback settings
    pub fn scale_state(&self) -> ScaleState {
        ScaleState::new(
            self.playback.min_scale,
            self.playback.scale_step,
            self.playback.min_window_dimension,
        )
    }
}

/// Chroma key configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaConfig {
    /// Key color restored by a chroma reset, as [r, g, b]
    pub key_color: KeyColor,

    /// Tolerance restored by a chroma reset (0-255)
    pub tolerance: u8,

    /// Run auto-detection on every media load from the start
    pub auto_detect: bool,

    /// Border pixels skipped at each end when sampling for auto-detection
    pub edge_margin: u32,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            key_color: KeyColor::MAGENTA,
            tolerance: Tolerance::DEFAULT.value(),
            auto_detect: false,
            edge_margin: DEFAULT_EDGE_MARGIN,
        }
    }
}

impl ChromaConfig {
    pub fn default_tolerance(&self) -> Tolerance {
        Tolerance(self.tolerance)
    }

    fn validate(&self) -> Result<()> {
        if self.edge_margin > 4096 {
            return Err(ConfigError::InvalidValue {
                key: "chroma.edge_margin".to_string(),
                value: self.edge_margin.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Playback and compositing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Render loop ticks per second
    pub tick_rate: u32,

    /// Scale factor change per +/- key press
    pub scale_step: f32,

    /// Smallest allowed scale factor
    pub min_scale: f32,

    /// Smallest window width or height in pixels
    pub min_window_dimension: u32,

    /// Resampling used when scaling frames to the window
    pub filter: ResampleFilter,

    /// Worker threads for the per-pixel mask
    pub mask_threads: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            scale_step: 0.1,
            min_scale: 0.1,
            min_window_dimension: 50,
            filter: ResampleFilter::default(),
            mask_threads: num_cpus::get(),
        }
    }
}

impl PlaybackConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=240).contains(&self.tick_rate) {
            return Err(ConfigError::InvalidValue {
                key: "playback.tick_rate".to_string(),
                value: self.tick_rate.to_string()
            }.into());
        }

        if !(self.scale_step > 0.0 && self.scale_step <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "playback.scale_step".to_string(),
                value: self.scale_step.to_string()
            }.into());
        }

        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "playback.min_scale".to_string(),
                value: self.min_scale.to_string()
            }.into());
        }

        if self.min_window_dimension == 0 {
            return Err(ConfigError::InvalidValue {
                key: "playback.min_window_dimension".to_string(),
                value: self.min_window_dimension.to_string()
            }.into());
        }

        if self.mask_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "playback.mask_threads".to_string(),
                value: self.mask_threads.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Overlay window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title, shown in the task bar
    pub title: String,

    /// Size of the window before the first media loads
    pub initial_width: u32,
    pub initial_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Desktop Video Overlay".to_string(),
            initial_width: 400,
            initial_height: 600,
        }
    }
}

impl WindowConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_width == 0 || self.initial_height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "window.initial_size".to_string(),
                value: format!("{}x{}", self.initial_width, self.initial_height)
            }.into());
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Play the soundtrack of the active file
    pub enabled: bool,

    /// Output volume (0.0-2.0, 1.0 is unchanged)
    pub volume: f32,

    /// Restart the soundtrack when it ends
    pub loop_track: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
            loop_track: true,
        }
    }
}

impl AudioConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.volume) {
            return Err(ConfigError::InvalidValue {
                key: "audio.volume".to_string(),
                value: self.volume.to_string()
            }.into());
        }

        Ok(())
    }
}
