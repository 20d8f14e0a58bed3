// Slash command handling

use crate::chat::Role;
use crate::client::ChatPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    History,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            "/history" => Some(Command::History),
            _ => None,
        }
    }
}

pub fn handle_command(command: Command, panel: &ChatPanel) -> String {
    match command {
        Command::Help => format_help(),
        Command::Quit => "またね！".to_string(),
        Command::History => format_history(panel),
    }
}

fn format_help() -> String {
    r#"Available commands:
  /help      - Show this help message
  /history   - Show the conversation sent with each question
  /quit      - Exit

Type any question about the current unit to ask the tutor."#
        .to_string()
}

fn format_history(panel: &ChatPanel) -> String {
    if panel.conversation().is_empty() {
        return "(no conversation yet)".to_string();
    }
    panel
        .conversation()
        .iter()
        .map(|message| {
            let speaker = match message.role {
                Role::User => "you",
                Role::Assistant => "tutor",
                Role::System => "system",
            };
            format!("[{speaker}] {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse(" /exit "), Some(Command::Quit));
        assert_eq!(Command::parse("/history"), Some(Command::History));
        assert_eq!(Command::parse("what is /help"), None);
    }

    #[test]
    fn test_empty_history() {
        let panel = ChatPanel::new("math", "fractions");
        assert_eq!(
            handle_command(Command::History, &panel),
            "(no conversation yet)"
        );
    }
}
