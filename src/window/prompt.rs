use minifb::Key;
use tracing::debug;

use crate::chroma::{KeyColor, Tolerance};
use crate::error::WindowError;
use crate::video::DisplayBuffer;
use crate::window::draw::{avoid_key, draw_text_5x7, fill_rect, text_width, GLYPH_HEIGHT};
use crate::window::overlay::OverlayWindow;

const PANEL_COLOR: u32 = 0x0020_2020;
const TEXT_COLOR: u32 = 0x00FF_FFFF;
const HINT_COLOR: u32 = 0x00A0_A0A0;

/// Editing keys understood by the tolerance prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    Digit(u8),
    Backspace,
    Confirm,
    Cancel,
}

pub fn entry_key(key: Key) -> Option<EntryKey> {
    let digit = match key {
        Key::Key0 | Key::NumPad0 => 0,
        Key::Key1 | Key::NumPad1 => 1,
        Key::Key2 | Key::NumPad2 => 2,
        Key::Key3 | Key::NumPad3 => 3,
        Key::Key4 | Key::NumPad4 => 4,
        Key::Key5 | Key::NumPad5 => 5,
        Key::Key6 | Key::NumPad6 => 6,
        Key::Key7 | Key::NumPad7 => 7,
        Key::Key8 | Key::NumPad8 => 8,
        Key::Key9 | Key::NumPad9 => 9,
        Key::Backspace => return Some(EntryKey::Backspace),
        Key::Enter | Key::NumPadEnter => return Some(EntryKey::Confirm),
        Key::Escape => return Some(EntryKey::Cancel),
        _ => return None,
    };
    Some(EntryKey::Digit(digit))
}

/// What the prompt should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Editing,
    /// `None` when the field was left empty; the tolerance stays unchanged
    Done(Option<Tolerance>),
}

/// Integer entry bounded to 0..=255, prefilled with the current tolerance
///
/// The first digit typed replaces the prefilled value. Digits that would
/// push the value past 255 are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToleranceEntry {
    text: String,
    prefilled: bool,
}

impl ToleranceEntry {
    pub fn new(current: Tolerance) -> Self {
        Self {
            text: current.value().to_string(),
            prefilled: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<Tolerance> {
        self.text.parse::<u8>().ok().map(Tolerance)
    }

    pub fn handle(&mut self, key: EntryKey) -> EntryState {
        match key {
            EntryKey::Digit(d) => {
                if std::mem::take(&mut self.prefilled) || self.text == "0" {
                    self.text.clear();
                }
                let candidate = format!("{}{}", self.text, d);
                if candidate.parse::<u16>().map_or(false, |v| v <= 255) {
                    self.text = candidate;
                }
                EntryState::Editing
            }
            EntryKey::Backspace => {
                self.prefilled = false;
                self.text.pop();
                EntryState::Editing
            }
            EntryKey::Confirm => EntryState::Done(self.value()),
            EntryKey::Cancel => EntryState::Done(None),
        }
    }
}

/// Modal tolerance prompt drawn over `background` inside the overlay window.
///
/// Blocks the render loop until Enter or Esc. Returns `None` on cancel or
/// when the window closes.
pub fn prompt_tolerance(
    window: &mut OverlayWindow,
    background: Option<&DisplayBuffer>,
    size: (u32, u32),
    current: Tolerance,
    key: KeyColor,
) -> Result<Option<Tolerance>, WindowError> {
    let mut entry = ToleranceEntry::new(current);
    debug!("Tolerance prompt opened at {}", current);

    while window.is_open() {
        for pressed in window.pressed_keys() {
            if let Some(EntryState::Done(result)) = entry_key(pressed).map(|k| entry.handle(k)) {
                debug!("Tolerance prompt closed with {:?}", result);
                return Ok(result);
            }
        }

        let frame = render_prompt(background, size, &entry, key);
        window.present(&frame)?;
    }
    Ok(None)
}

fn render_prompt(
    background: Option<&DisplayBuffer>,
    size: (u32, u32),
    entry: &ToleranceEntry,
    key: KeyColor,
) -> DisplayBuffer {
    let (w, h) = (size.0 as usize, size.1 as usize);
    let key = key.to_u32();
    let mut frame = match background {
        Some(bg) if bg.dimensions() == (w, h) => bg.clone(),
        _ => DisplayBuffer {
            width: w,
            height: h,
            pixels: vec![key; w * h],
        },
    };

    let label = if text_width("TOLERANCE 0-255") + 8 <= w as i32 {
        "TOLERANCE 0-255"
    } else {
        "TOL"
    };
    let hint = "ENTER OK  ESC CANCEL";
    let value = format!("{}_", entry.text());

    let line = GLYPH_HEIGHT + 4;
    let panel_h = line * 3 + 4;
    let panel_y = (h as i32 - panel_h) / 2;
    fill_rect(&mut frame, 0, panel_y, w as i32, panel_h, avoid_key(PANEL_COLOR, key));

    let shadow = avoid_key(0, key);
    draw_text_5x7(&mut frame, 4, panel_y + 4, label, avoid_key(TEXT_COLOR, key), shadow);
    draw_text_5x7(&mut frame, 4, panel_y + 4 + line, &value, avoid_key(TEXT_COLOR, key), shadow);
    if text_width(hint) + 8 <= w as i32 {
        draw_text_5x7(&mut frame, 4, panel_y + 4 + line * 2, hint, avoid_key(HINT_COLOR, key), shadow);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(entry: &mut ToleranceEntry, keys: &[EntryKey]) -> EntryState {
        keys.iter().fold(EntryState::Editing, |_, &k| entry.handle(k))
    }

    #[test]
    fn test_prefilled_value_confirms_unchanged() {
        let mut entry = ToleranceEntry::new(Tolerance(30));
        assert_eq!(entry.text(), "30");
        assert_eq!(entry.handle(EntryKey::Confirm), EntryState::Done(Some(Tolerance(30))));
    }

    #[test]
    fn test_first_digit_replaces_prefill() {
        let mut entry = ToleranceEntry::new(Tolerance(30));
        let state = type_keys(
            &mut entry,
            &[EntryKey::Digit(7), EntryKey::Digit(5), EntryKey::Confirm],
        );
        assert_eq!(state, EntryState::Done(Some(Tolerance(75))));
    }

    #[test]
    fn test_value_bounded_to_255() {
        let mut entry = ToleranceEntry::new(Tolerance(0));
        type_keys(
            &mut entry,
            &[EntryKey::Digit(2), EntryKey::Digit(5), EntryKey::Digit(6)],
        );
        assert_eq!(entry.text(), "25");
        entry.handle(EntryKey::Digit(5));
        entry.handle(EntryKey::Digit(9));
        assert_eq!(entry.text(), "255");
    }

    #[test]
    fn test_backspace_edits_prefill() {
        let mut entry = ToleranceEntry::new(Tolerance(128));
        let state = type_keys(
            &mut entry,
            &[EntryKey::Backspace, EntryKey::Digit(0), EntryKey::Confirm],
        );
        assert_eq!(state, EntryState::Done(Some(Tolerance(120))));
    }

    #[test]
    fn test_cancel_and_empty_leave_unchanged() {
        let mut entry = ToleranceEntry::new(Tolerance(40));
        assert_eq!(entry.handle(EntryKey::Cancel), EntryState::Done(None));

        let mut entry = ToleranceEntry::new(Tolerance(4));
        let state = type_keys(&mut entry, &[EntryKey::Backspace, EntryKey::Confirm]);
        assert_eq!(state, EntryState::Done(None));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(entry_key(Key::NumPad7), Some(EntryKey::Digit(7)));
        assert_eq!(entry_key(Key::Key0), Some(EntryKey::Digit(0)));
        assert_eq!(entry_key(Key::NumPadEnter), Some(EntryKey::Confirm));
        assert_eq!(entry_key(Key::A), None);
    }

    #[test]
    fn test_prompt_renders_over_transparent_background() {
        let entry = ToleranceEntry::new(Tolerance(30));
        let frame = render_prompt(None, (200, 60), &entry, KeyColor::MAGENTA);
        assert_eq!(frame.dimensions(), (200, 60));
        assert_eq!(frame.pixel(0, 0), KeyColor::MAGENTA.to_u32());
        assert!(frame.pixels.iter().any(|&p| p == TEXT_COLOR));
    }
}
