use std::fmt;

/// A request from the control surface, applied by the render loop on its next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlIntent {
    ShowInfo,
    /// Open the in-window tolerance prompt
    PromptTolerance,
    SetTolerance(u8),
    ResetChroma,
    EnableAutoChroma,
    TogglePlayback,
    Next,
    Previous,
    Quit,
}

/// A console line that is not a known command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command '{}' (try: {})", self.0, COMMANDS)
    }
}

impl std::error::Error for UnknownCommand {}

pub const COMMANDS: &str = "info, tolerance [0-255], reset, auto, pause, next, prev, quit";

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ControlIntent>, UnknownCommand> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    let unknown = || UnknownCommand(line.trim().to_string());

    let intent = match (command.to_lowercase().as_str(), argument) {
        ("info", None) => ControlIntent::ShowInfo,
        ("tolerance", None) => ControlIntent::PromptTolerance,
        ("tolerance", Some(value)) => {
            ControlIntent::SetTolerance(value.parse::<u8>().map_err(|_| unknown())?)
        }
        ("reset", None) => ControlIntent::ResetChroma,
        ("auto", None) => ControlIntent::EnableAutoChroma,
        ("pause" | "play", None) => ControlIntent::TogglePlayback,
        ("next", None) => ControlIntent::Next,
        ("prev" | "previous", None) => ControlIntent::Previous,
        ("quit" | "exit", None) => ControlIntent::Quit,
        _ => return Err(unknown()),
    };
    Ok(Some(intent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_commands() {
        assert_eq!(parse_command("info"), Ok(Some(ControlIntent::ShowInfo)));
        assert_eq!(parse_command("  RESET "), Ok(Some(ControlIntent::ResetChroma)));
        assert_eq!(parse_command("auto"), Ok(Some(ControlIntent::EnableAutoChroma)));
        assert_eq!(parse_command("prev"), Ok(Some(ControlIntent::Previous)));
        assert_eq!(parse_command("quit"), Ok(Some(ControlIntent::Quit)));
    }

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse_command("tolerance"), Ok(Some(ControlIntent::PromptTolerance)));
        assert_eq!(parse_command("tolerance 45"), Ok(Some(ControlIntent::SetTolerance(45))));
        assert!(parse_command("tolerance 256").is_err());
        assert!(parse_command("tolerance -1").is_err());
    }

    #[test]
    fn test_blank_and_unknown() {
        assert_eq!(parse_command("   "), Ok(None));
        let err = parse_command("dance").unwrap_err();
        assert!(err.to_string().contains("dance"));
        assert!(parse_command("next 3").is_err());
    }
}
