//! Native dialogs: media file selection and the info box

use std::path::PathBuf;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use crate::info::InfoSummary;

pub const VIDEO_EXTENSIONS: [&str; 5] = ["webm", "mp4", "avi", "mov", "mkv"];
pub const IMAGE_EXTENSIONS: [&str; 5] = ["gif", "png", "jpg", "jpeg", "bmp"];

/// Blocking multi-select; an empty list means the user cancelled
pub fn pick_media_files() -> Vec<PathBuf> {
    let all: Vec<&str> = VIDEO_EXTENSIONS.iter().chain(IMAGE_EXTENSIONS.iter()).copied().collect();

    FileDialog::new()
        .set_title("Select Videos")
        .add_filter("Media files", &all)
        .add_filter("Video files", &VIDEO_EXTENSIONS)
        .add_filter("Images and GIFs", &IMAGE_EXTENSIONS)
        .pick_files()
        .unwrap_or_default()
}

pub fn show_info(summary: &InfoSummary) {
    MessageDialog::new()
        .set_title("Video Information")
        .set_description(summary.to_string())
        .set_level(MessageLevel::Info)
        .set_buttons(MessageButtons::Ok)
        .show();
}
