use std::path::{Path, PathBuf};

use crate::error::PlaylistError;

/// Ordered media paths and the active entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaylistState {
    #[default]
    Empty,
    Loaded { paths: Vec<PathBuf>, index: usize },
}

impl PlaylistState {
    /// Replace the playlist; an empty selection is rejected and leaves it untouched
    pub fn select(&mut self, paths: Vec<PathBuf>) -> Result<(), PlaylistError> {
        if paths.is_empty() {
            return Err(PlaylistError::EmptySelection);
        }
        *self = Self::Loaded { paths, index: 0 };
        Ok(())
    }

    pub fn current(&self) -> Option<&Path> {
        match self {
            Self::Empty => None,
            Self::Loaded { paths, index } => paths.get(*index).map(PathBuf::as_path),
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Loaded { index, .. } => Some(*index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Loaded { paths, .. } => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Step forward, wrapping to the first entry
    pub fn advance(&mut self) -> Result<usize, PlaylistError> {
        match self {
            Self::Empty => Err(PlaylistError::NotLoaded),
            Self::Loaded { paths, index } => {
                *index = (*index + 1) % paths.len();
                Ok(*index)
            }
        }
    }

    /// Step back, wrapping to the last entry
    pub fn retreat(&mut self) -> Result<usize, PlaylistError> {
        match self {
            Self::Empty => Err(PlaylistError::NotLoaded),
            Self::Loaded { paths, index } => {
                *index = (*index + paths.len() - 1) % paths.len();
                Ok(*index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(n: usize) -> PlaylistState {
        let mut state = PlaylistState::default();
        state
            .select((0..n).map(|i| PathBuf::from(format!("clip{}.mp4", i))).collect())
            .unwrap();
        state
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut state = playlist(2);
        assert!(matches!(state.select(Vec::new()), Err(PlaylistError::EmptySelection)));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_advance_wraps_after_len_steps() {
        let mut state = playlist(3);
        for _ in 0..3 {
            state.advance().unwrap();
        }
        assert_eq!(state.index(), Some(0));
    }

    #[test]
    fn test_retreat_inverts_advance() {
        let mut state = playlist(4);
        assert_eq!(state.retreat().unwrap(), 3);
        state.advance().unwrap();
        assert_eq!(state.current(), Some(Path::new("clip0.mp4")));
    }

    #[test]
    fn test_single_entry_stays_put() {
        let mut state = playlist(1);
        assert_eq!(state.advance().unwrap(), 0);
        assert_eq!(state.retreat().unwrap(), 0);
    }

    #[test]
    fn test_unloaded_navigation_fails() {
        let mut state = PlaylistState::Empty;
        assert!(matches!(state.advance(), Err(PlaylistError::NotLoaded)));
        assert!(state.current().is_none());
    }
}
