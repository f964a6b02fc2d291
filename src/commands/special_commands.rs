//! Special commands for the interactive chat
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything else
//! is a question for the assistant.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Commands handled by the REPL itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Narrow the tips given as context; `None` clears the filter
    Search(Option<String>),
    /// List the tips currently given as context
    ShowTips,
    /// Print the transcript so far
    History,
    Help,
    Exit,
    /// Not a command; send to the assistant
    None,
}

/// Parse a line of chat input
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] for an unrecognised `/` command
///
/// # Examples
///
/// ```
/// use fairfare::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(
///     parse_special_command("/search metro").unwrap(),
///     SpecialCommand::Search(Some("metro".to_string()))
/// );
/// assert_eq!(parse_special_command("Is the bus safe?").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    match command.to_lowercase().as_str() {
        "/search" | "/filter" => Ok(SpecialCommand::Search(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "/tips" => Ok(SpecialCommand::ShowTips),
        "/history" => Ok(SpecialCommand::History),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(command.to_string())),
    }
}

/// Print the special command reference
pub fn print_help() {
    println!(
        r#"
Special Commands for FareGuide Chat
===================================

  /search <term>  - Only give FareGuide tips matching <term>
  /search         - Give FareGuide every tip again
  /tips           - List the tips FareGuide can see
  /history        - Show the conversation so far
  /help           - Show this help
  /exit, /quit    - Leave the chat

Anything else is sent to FareGuide as a question.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("how much is an auto to CP?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!(parse_special_command("/EXIT").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_special_command(" /Help ").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/tips").unwrap(), SpecialCommand::ShowTips);
        assert_eq!(parse_special_command("/history").unwrap(), SpecialCommand::History);
    }

    #[test]
    fn test_search_without_term_clears() {
        assert_eq!(
            parse_special_command("/search").unwrap(),
            SpecialCommand::Search(None)
        );
        assert_eq!(
            parse_special_command("/filter   Chandni Chowk ").unwrap(),
            SpecialCommand::Search(Some("Chandni Chowk".to_string()))
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_special_command("/teleport").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/teleport".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
