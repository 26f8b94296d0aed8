//! Dynamic command registry: turns operator-submitted script snippets into
//! live commands and keeps a durable record of them.
//!
//! Chat surface (owner-only):
//! - `instantcmd` - show usage
//! - `instantcmd create` - define a new command from the next message
//! - `instantcmd delete <name>` (aliases `del`, `remove`)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;

use crate::application::errors::{BotError, CommandError, SnippetError};
use crate::application::messaging::{paginate, FollowUpRouter};
use crate::domain::entities::{Command, CommandContext, CommandRegistry, Handler};
use crate::domain::traits::{Bot, SnippetStore};
use crate::infrastructure::config::RegistryConfig;
use crate::infrastructure::script::ScriptEngine;

const CREATE_PROMPT: &str = "You're about to create a new command.\n\
Your next message will be its script: a single public function whose name \
becomes the command name, taking the invocation arguments as one array \
parameter, e.g.\n\
```\nfn hello(args) { \"Hello, world!\" }\n```";

const USAGE: &str = "Manage commands defined at runtime.\n\n\
instantcmd create - define a new command from a script snippet\n\
instantcmd delete <name> - remove a command created here";

/// Runtime settings of the registry, derived from [`RegistryConfig`].
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub response_timeout: Duration,
    pub persist_on_registration_error: bool,
    pub message_limit: usize,
}

impl From<&RegistryConfig> for RegistrySettings {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            response_timeout: Duration::from_secs(config.response_timeout_secs),
            persist_on_registration_error: config.persist_on_registration_error,
            message_limit: config.message_limit,
        }
    }
}

/// The dynamic command registry service.
pub struct InstantCmd {
    engine: Arc<ScriptEngine>,
    registry: Arc<RwLock<CommandRegistry>>,
    store: Arc<dyn SnippetStore>,
    followups: Arc<FollowUpRouter>,
    settings: RegistrySettings,
    /// Single-writer guard over persisted-list read-modify-write sequences.
    mutation: Mutex<()>,
}

impl InstantCmd {
    pub fn new(
        engine: Arc<ScriptEngine>,
        registry: Arc<RwLock<CommandRegistry>>,
        store: Arc<dyn SnippetStore>,
        followups: Arc<FollowUpRouter>,
        settings: RegistrySettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            registry,
            store,
            followups,
            settings,
            mutation: Mutex::new(()),
        })
    }

    /// The management command to register with the dispatcher.
    pub fn command(self: Arc<Self>) -> Command {
        Command::new("instantcmd", self)
            .with_description("Manage commands defined at runtime")
            .with_aliases(vec!["instacmd".to_string(), "instantcommand".to_string()])
            .with_category("core")
            .owner_only()
    }

    /// Re-register every persisted snippet, in stored order. Run as a
    /// deferred background task at startup. A snippet that no longer
    /// compiles or registers is logged and skipped.
    pub async fn load_all(self: Arc<Self>) {
        let snippets = match self.store.all().await {
            Ok(snippets) => snippets,
            Err(e) => {
                tracing::error!(error = %e, "could not read persisted commands");
                return;
            }
        };

        for (index, snippet) in snippets.iter().enumerate() {
            match self.engine.extract(snippet) {
                Ok(func) => {
                    let name = func.name.clone();
                    let command = self.script_command(func);
                    match self.registry.write().await.register(command) {
                        Ok(()) => tracing::info!(command = %name, "restored instant command"),
                        Err(e) => {
                            tracing::error!(command = %name, error = %e, "could not restore instant command")
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(index, error = %e, "persisted snippet no longer compiles, skipping")
                }
            }
        }
    }

    /// The create flow: prompt, await the operator's follow-up, compile,
    /// register, persist.
    async fn create(&self, ctx: &CommandContext) -> Result<(), BotError> {
        let chat_id = ctx.message.chat_id.clone();
        let Some(operator) = ctx.message.sender.clone() else {
            ctx.bot
                .send_message(&chat_id, "I can't tell who is asking; no sender on the message.")
                .await?;
            return Ok(());
        };

        ctx.bot.send_message(&chat_id, CREATE_PROMPT).await?;

        let receiver = self.followups.subscribe(&chat_id, &operator.id);
        let response = match timeout(self.settings.response_timeout, receiver).await {
            Ok(Ok(message)) => message,
            Ok(Err(_)) => {
                // Subscription superseded by a newer create; that flow owns
                // the operator's next message now.
                return Ok(());
            }
            Err(_) => {
                self.followups.cancel(&chat_id, &operator.id);
                self.report(&ctx.bot, &chat_id, &SnippetError::Timeout).await?;
                return Ok(());
            }
        };

        let Some(raw) = response.content.text().map(str::to_owned) else {
            ctx.bot
                .send_message(&chat_id, "I expected a script snippet, not a command.")
                .await?;
            return Ok(());
        };
        let source = strip_code_fence(&raw);

        let func = match self.engine.extract(&source) {
            Ok(func) => func,
            Err(e) => {
                self.report(&ctx.bot, &chat_id, &e).await?;
                return Ok(());
            }
        };
        let name = func.name.clone();

        let registered = self.registry.write().await.register(self.script_command(func));
        if let Err(e) = registered {
            self.report(&ctx.bot, &chat_id, &SnippetError::Registration(e))
                .await?;
            if !self.settings.persist_on_registration_error {
                return Ok(());
            }
            self.persist(&source).await?;
            ctx.bot
                .send_message(
                    &chat_id,
                    "The snippet was stored anyway and will be retried on the next start.",
                )
                .await?;
            return Ok(());
        }

        self.persist(&source).await?;
        ctx.bot
            .send_message(
                &chat_id,
                &format!(
                    "The command `{}` was successfully added. \
                     It will appear under `No category` in the help message.",
                    name
                ),
            )
            .await?;
        Ok(())
    }

    /// The delete flow: resolve the target, drop every persisted snippet
    /// deriving the same name, unregister.
    async fn delete(&self, ctx: &CommandContext, name: &str) -> Result<(), BotError> {
        let chat_id = ctx.message.chat_id.clone();

        let target = {
            let registry = self.registry.read().await;
            registry
                .find(name)
                .map(|c| (c.name.clone(), c.category.clone()))
        };
        let Some((target_name, category)) = target else {
            self.report(&ctx.bot, &chat_id, &SnippetError::NotFound(name.to_string()))
                .await?;
            return Ok(());
        };
        if category.is_some() || target_name == "help" {
            self.report(&ctx.bot, &chat_id, &SnippetError::NotOwned(target_name))
                .await?;
            return Ok(());
        }

        // Exhaustive scan: every persisted snippet deriving the target name
        // is removed, duplicates included.
        let removed = {
            let _guard = self.mutation.lock().await;
            let snippets = self.store.all().await?;
            let mut kept = Vec::with_capacity(snippets.len());
            let mut removed = 0usize;
            for snippet in snippets {
                match self.engine.extract(&snippet) {
                    Ok(func) if func.name == target_name => removed += 1,
                    Ok(_) => kept.push(snippet),
                    Err(e) => {
                        tracing::warn!(error = %e, "persisted snippet no longer compiles, keeping it");
                        kept.push(snippet);
                    }
                }
            }
            if removed > 0 {
                self.store.replace(kept).await?;
            }
            removed
        };

        self.registry.write().await.unregister(&target_name);
        tracing::info!(command = %target_name, removed, "instant command deleted");
        ctx.bot
            .send_message(
                &chat_id,
                &format!("The command `{}` was successfully removed.", target_name),
            )
            .await?;
        Ok(())
    }

    fn script_command(&self, func: crate::infrastructure::script::ScriptFn) -> Command {
        let name = func.name.clone();
        Command::new(name, func.into_handler(self.engine.clone()))
            .with_description("Defined at runtime through instantcmd")
    }

    async fn persist(&self, source: &str) -> Result<(), BotError> {
        let _guard = self.mutation.lock().await;
        self.store.append(source).await?;
        Ok(())
    }

    /// Convert a flow error into chat messages, chunked to the platform's
    /// message size limit.
    async fn report(
        &self,
        bot: &Arc<dyn Bot>,
        chat_id: &str,
        error: &SnippetError,
    ) -> Result<(), BotError> {
        let text = match error {
            SnippetError::Compile(detail) => format!(
                "An error occurred while compiling your snippet:\n```\n{}\n```",
                detail
            ),
            SnippetError::Timeout => "Question timed out.".to_string(),
            other => format!("Error: {}", other),
        };
        for page in paginate(&text, self.settings.message_limit) {
            bot.send_message(chat_id, &page).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Handler for InstantCmd {
    async fn run(&self, ctx: CommandContext) -> Result<Option<String>, CommandError> {
        let flow = match ctx.args.first().map(String::as_str) {
            None => return Ok(Some(USAGE.to_string())),
            Some("create") => self.create(&ctx).await,
            Some("delete") | Some("del") | Some("remove") => {
                let Some(name) = ctx.args.get(1) else {
                    return Err(CommandError::InvalidArgs(
                        "usage: instantcmd delete <name>".to_string(),
                    ));
                };
                self.delete(&ctx, name).await
            }
            Some(other) => {
                return Err(CommandError::InvalidArgs(format!(
                    "unknown subcommand `{}`",
                    other
                )))
            }
        };
        flow.map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
        Ok(None)
    }
}

/// Remove code-fence markup from an operator-submitted snippet: a
/// triple-backtick block (optional language tag on the first line), or
/// single-backtick / whitespace wrapping. Idempotent on clean text.
pub fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6 {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() >= 2 {
            return lines[1..lines.len() - 1].join("\n");
        }
    }
    trimmed
        .trim_matches(|c: char| c == '`' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_block_with_language_tag() {
        assert_eq!(
            strip_code_fence("```rhai\nfn f(args) { 1 }\n```"),
            "fn f(args) { 1 }"
        );
    }

    #[test]
    fn strips_fenced_block_without_tag() {
        assert_eq!(
            strip_code_fence("```\nfn f(args) { 1 }\n```"),
            "fn f(args) { 1 }"
        );
    }

    #[test]
    fn strips_single_backticks_and_whitespace() {
        assert_eq!(strip_code_fence("  `fn f(args) { 1 }`  "), "fn f(args) { 1 }");
    }

    #[test]
    fn idempotent_on_clean_text() {
        let clean = "fn f(args) { 1 }";
        assert_eq!(strip_code_fence(clean), clean);
        assert_eq!(strip_code_fence(&strip_code_fence(clean)), clean);
    }

    #[test]
    fn keeps_inner_lines_of_multiline_block() {
        let fenced = "```\nfn f(args) {\n    1\n}\n```";
        assert_eq!(strip_code_fence(fenced), "fn f(args) {\n    1\n}");
    }
}
