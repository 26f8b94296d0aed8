//! Message dispatcher - Routes messages to handlers

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::errors::BotError;
use crate::domain::entities::{CommandContext, CommandRegistry, Content, Message, User};
use crate::domain::traits::Bot;

use super::followup::FollowUpRouter;
use super::pagination::paginate;
use super::parser::MessageParser;

/// Message dispatcher - delivers follow-ups to waiting flows, then routes
/// commands to their handlers.
pub struct MessageDispatcher {
    parser: MessageParser,
    registry: Arc<RwLock<CommandRegistry>>,
    followups: Arc<FollowUpRouter>,
    owners: Vec<String>,
    message_limit: usize,
}

impl MessageDispatcher {
    pub fn new(
        prefix: impl Into<String>,
        registry: Arc<RwLock<CommandRegistry>>,
        followups: Arc<FollowUpRouter>,
        owners: Vec<String>,
        message_limit: usize,
    ) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            registry,
            followups,
            owners,
            message_limit,
        }
    }

    /// Parse and dispatch a raw text message
    pub async fn dispatch_text(
        &self,
        bot: &Arc<dyn Bot>,
        chat_id: impl Into<String>,
        text: impl Into<String>,
        sender: Option<User>,
    ) -> Result<(), BotError> {
        let chat_id = chat_id.into();
        let text = text.into();

        // A waiting flow gets the text exactly as typed, before any command
        // parsing; a snippet may well start with the command prefix.
        let raw = Message::from_text(&chat_id, &text).with_sender_opt(sender.clone());
        if self.followups.try_deliver(&raw) {
            return Ok(());
        }

        let message = self.parser.parse(chat_id, text, sender);
        self.dispatch(bot, message).await
    }

    /// Dispatch a structured message. Handler errors are converted into chat
    /// replies; only transport failures propagate.
    pub async fn dispatch(&self, bot: &Arc<dyn Bot>, message: Message) -> Result<(), BotError> {
        // A flow waiting on this operator gets the message first.
        if self.followups.try_deliver(&message) {
            return Ok(());
        }

        let Content::Command { name, args } = message.content.clone() else {
            tracing::debug!(chat = %message.chat_id, "ignoring non-command message");
            return Ok(());
        };

        // Clone the command out so no registry lock is held while the
        // handler runs; flows like `instantcmd create` re-acquire it.
        let command = {
            let registry = self.registry.read().await;
            registry.find(&name).cloned()
        };
        let Some(command) = command else {
            bot.send_message(&message.chat_id, &format!("Unknown command: {}", name))
                .await?;
            return Ok(());
        };

        if command.owner_only && !self.is_owner(message.sender.as_ref()) {
            bot.send_message(
                &message.chat_id,
                "This command is reserved for the bot owner.",
            )
            .await?;
            return Ok(());
        }

        let chat_id = message.chat_id.clone();
        let ctx = CommandContext {
            message,
            args,
            bot: bot.clone(),
        };

        match command.handler.run(ctx).await {
            Ok(Some(reply)) => self.send_paginated(bot, &chat_id, &reply).await?,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(command = %command.name, error = %e, "command failed");
                self.send_paginated(bot, &chat_id, &format!("Error: {}", e))
                    .await?;
            }
        }
        Ok(())
    }

    /// Send a reply in chunks that fit the platform's message size limit
    pub async fn send_paginated(
        &self,
        bot: &Arc<dyn Bot>,
        chat_id: &str,
        text: &str,
    ) -> Result<(), BotError> {
        for page in paginate(text, self.message_limit) {
            bot.send_message(chat_id, &page).await?;
        }
        Ok(())
    }

    fn is_owner(&self, sender: Option<&User>) -> bool {
        sender.is_some_and(|user| self.owners.iter().any(|id| id == &user.id))
    }
}
