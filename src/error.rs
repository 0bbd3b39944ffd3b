use thiserror::Error;

/// Main error type for the chroma overlay
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Video decoding errors
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Unreadable media: {path} ({reason})")]
    UnreadableMedia { path: String, reason: String },

    #[error("Unsupported media format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Frame decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("Seek to start failed: {reason}")]
    SeekFailed { reason: String },
}

/// Audio playback errors; never fatal, the video keeps playing silently
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device available: {reason}")]
    NoOutputDevice { reason: String },

    #[error("Failed to load audio track: {path} ({reason})")]
    LoadFailed { path: String, reason: String },
}

/// Overlay window errors
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Window creation failed: {reason}")]
    CreateFailed { reason: String },

    #[error("Window update failed: {reason}")]
    UpdateFailed { reason: String },

    #[error("Color key could not be applied: {reason}")]
    ColorKeyFailed { reason: String },
}

/// Playlist state machine errors
#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("No files selected")]
    EmptySelection,

    #[error("None of the {count} playlist entries could be loaded")]
    NoPlayableMedia { count: usize },

    #[error("Playlist has no active entry")]
    NotLoaded,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using OverlayError
pub type Result<T> = std::result::Result<T, OverlayError>;

impl MediaError {
    pub fn unreadable<P: AsRef<std::path::Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::UnreadableMedia {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }
}

impl OverlayError {
    /// Whether the render loop can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Media(MediaError::UnreadableMedia { .. }) => true,
            Self::Audio(_) => true,
            _ => false,
        }
    }

    /// Whether this is the user cancelling the initial file selection
    pub fn is_empty_selection(&self) -> bool {
        matches!(self, Self::Playlist(PlaylistError::EmptySelection))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Media(MediaError::UnreadableMedia { path, .. }) => {
                format!("Could not open '{}'. Please check the file exists and is a supported video format.", path)
            }
            Self::Playlist(PlaylistError::EmptySelection) => {
                "No video selected. Exiting.".to_string()
            }
            Self::Playlist(PlaylistError::NoPlayableMedia { count }) => {
                format!("None of the {} selected files could be played.", count)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
