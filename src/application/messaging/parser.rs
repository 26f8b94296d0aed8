//! Message parser - Parses raw messages into structured messages

use crate::domain::entities::{Content, Message, MessageType, User};

/// Parses incoming messages into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message
    pub fn parse(
        &self,
        chat_id: impl Into<String>,
        text: impl Into<String>,
        sender: Option<User>,
    ) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        // Check if it's a command
        if text.starts_with(&self.command_prefix) {
            return self.parse_command(chat_id, text, sender);
        }

        // Regular text message
        Message::new(chat_id, Content::Text(text))
            .with_message_type(MessageType::Text)
            .with_sender_opt(sender)
    }

    /// Parse a command message
    fn parse_command(&self, chat_id: String, text: String, sender: Option<User>) -> Message {
        let cmd_text = text.trim_start_matches(&self.command_prefix);

        // Split command and arguments
        let parts: Vec<&str> = cmd_text.split_whitespace().collect();
        let name = parts.first().unwrap_or(&"").to_string();
        let args = parts
            .get(1..)
            .map(|s| s.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        Message::new(chat_id, Content::Command { name, args })
            .with_message_type(MessageType::Command)
            .with_sender_opt(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_args() {
        let parser = MessageParser::new("/");
        let msg = parser.parse("chat", "/instantcmd delete foo", None);

        assert_eq!(
            msg.content,
            Content::Command {
                name: "instantcmd".to_string(),
                args: vec!["delete".to_string(), "foo".to_string()],
            }
        );
        assert_eq!(msg.message_type, MessageType::Command);
    }

    #[test]
    fn parses_bare_command() {
        let parser = MessageParser::new("!");
        let msg = parser.parse("chat", "!help", None);

        assert_eq!(
            msg.content,
            Content::Command {
                name: "help".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn plain_text_stays_text() {
        let parser = MessageParser::new("/");
        let msg = parser.parse("chat", "fn hello(args) { \"hi\" }", None);

        assert!(!msg.content.is_command());
        assert_eq!(msg.content.text(), Some("fn hello(args) { \"hi\" }"));
    }
}
