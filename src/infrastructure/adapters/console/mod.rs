//! Console adapter for local operation and development

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::traits::{Bot, BotInfo};

/// Console bot adapter: replies go to stdout.
pub struct ConsoleAdapter {
    info: BotInfo,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
                username: "console".to_string(),
            },
        }
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[bot] {}", text);
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
