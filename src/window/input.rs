use minifb::Key;

/// What a key press asks the overlay to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Leave color-pick mode, or quit when not picking
    Cancel,
    TogglePlayback,
    SelectFiles,
    PickColor,
    ResetChroma,
    AutoChroma,
    ResetScale,
    ScaleUp,
    ScaleDown,
    Previous,
    Next,
}

/// Keys polled every tick
pub const COMMAND_KEYS: [Key; 13] = [
    Key::Escape,
    Key::Space,
    Key::O,
    Key::P,
    Key::C,
    Key::A,
    Key::R,
    Key::Equal,
    Key::NumPadPlus,
    Key::Minus,
    Key::NumPadMinus,
    Key::Left,
    Key::Right,
];

pub fn command_for_key(key: Key) -> Option<InputCommand> {
    let command = match key {
        Key::Escape => InputCommand::Cancel,
        Key::Space => InputCommand::TogglePlayback,
        Key::O => InputCommand::SelectFiles,
        Key::P => InputCommand::PickColor,
        Key::C => InputCommand::ResetChroma,
        Key::A => InputCommand::AutoChroma,
        Key::R => InputCommand::ResetScale,
        Key::Equal | Key::NumPadPlus => InputCommand::ScaleUp,
        Key::Minus | Key::NumPadMinus => InputCommand::ScaleDown,
        Key::Left => InputCommand::Previous,
        Key::Right => InputCommand::Next,
        _ => return None,
    };
    Some(command)
}

/// Holds back key presses a modal prompt already consumed
///
/// minifb reports a key as pressed until the next window update, so the Esc
/// or Enter that closed a prompt would otherwise be read again by the main
/// loop on the same tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputGate {
    stale: bool,
}

impl InputGate {
    /// A modal loop returned without the window being updated since
    pub fn modal_closed(&mut self) {
        self.stale = true;
    }

    /// The window was updated; key state is fresh again
    pub fn pumped(&mut self) {
        self.stale = false;
    }

    pub fn admit(&self, commands: Vec<InputCommand>) -> Vec<InputCommand> {
        if self.stale {
            Vec::new()
        } else {
            commands
        }
    }
}

/// Click-and-drag window movement
///
/// Keeps the cursor offset captured at press time; every move places the
/// window so the cursor sits at that same offset again.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DragState {
    grab: Option<(f32, f32)>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn begin(&mut self, cursor: (f32, f32)) {
        self.grab = Some(cursor);
    }

    pub fn end(&mut self) {
        self.grab = None;
    }

    /// New window position for a cursor at window-local `cursor`, or `None` when it has not moved
    pub fn target(&self, window_pos: (i32, i32), cursor: (f32, f32)) -> Option<(i32, i32)> {
        let (gx, gy) = self.grab?;
        let dx = (cursor.0 - gx).round() as i32;
        let dy = (cursor.1 - gy).round() as i32;
        if dx == 0 && dy == 0 {
            return None;
        }
        Some((window_pos.0 + dx, window_pos.1 + dy))
    }
}
