//! Built-in commands: help and version

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, CommandRegistry, FnHandler, Handler};

/// `help [command]` - list commands grouped by category, or show one
/// command's details.
pub struct HelpCommand {
    registry: Arc<RwLock<CommandRegistry>>,
}

impl HelpCommand {
    pub fn new(registry: Arc<RwLock<CommandRegistry>>) -> Self {
        Self { registry }
    }

    pub fn command(registry: Arc<RwLock<CommandRegistry>>) -> Command {
        Command::new("help", Arc::new(Self::new(registry)))
            .with_description("Show help message")
            .with_category("core")
    }
}

#[async_trait]
impl Handler for HelpCommand {
    async fn run(&self, ctx: CommandContext) -> Result<Option<String>, CommandError> {
        let registry = self.registry.read().await;

        if let Some(name) = ctx.args.first() {
            let Some(cmd) = registry.find(name) else {
                return Ok(Some(format!("Command `{}` not found", name)));
            };
            let mut help = format!(
                "{} - {}",
                cmd.name,
                cmd.description.as_deref().unwrap_or("No description")
            );
            if !cmd.aliases.is_empty() {
                help.push_str(&format!("\nAliases: {}", cmd.aliases.join(", ")));
            }
            return Ok(Some(help));
        }

        // Group by category; runtime-defined commands have none.
        let mut groups: BTreeMap<String, Vec<&Command>> = BTreeMap::new();
        for cmd in registry.all() {
            groups
                .entry(cmd.category.clone().unwrap_or_else(|| "No category".to_string()))
                .or_default()
                .push(cmd);
        }

        let mut help = "Available commands:\n".to_string();
        for (category, mut commands) in groups {
            commands.sort_by(|a, b| a.name.cmp(&b.name));
            help.push_str(&format!("\n{}:\n", category));
            for cmd in commands {
                help.push_str(&format!(
                    "  {} - {}\n",
                    cmd.name,
                    cmd.description.as_deref().unwrap_or("")
                ));
            }
        }
        Ok(Some(help))
    }
}

/// `version` - show the bot version.
pub fn version_command() -> Command {
    let handler = FnHandler(
        |_ctx: CommandContext| -> Result<Option<String>, CommandError> {
            Ok(Some(format!("instantcmd v{}", env!("CARGO_PKG_VERSION"))))
        },
    );
    Command::new("version", Arc::new(handler))
        .with_description("Show bot version")
        .with_category("core")
}
