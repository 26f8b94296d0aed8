use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::Message;
use crate::domain::traits::Bot;

/// Everything a command handler needs for one invocation.
#[derive(Clone)]
pub struct CommandContext {
    pub message: Message,
    pub args: Vec<String>,
    pub bot: Arc<dyn Bot>,
}

/// Command handler. Returns `Some(reply)` to have the dispatcher send the
/// reply, or `None` when the handler already sent everything itself.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn run(&self, ctx: CommandContext) -> Result<Option<String>, CommandError>;
}

/// Adapter so plain closures can serve as handlers.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(CommandContext) -> Result<Option<String>, CommandError> + Send + Sync,
{
    async fn run(&self, ctx: CommandContext) -> Result<Option<String>, CommandError> {
        (self.0)(ctx)
    }
}

/// Represents a bot command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    /// Owning category. Commands created at runtime have none; that absence
    /// is what marks them as deletable through `instantcmd delete`.
    pub category: Option<String>,
    pub owner_only: bool,
    pub handler: Arc<dyn Handler>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            category: None,
            owner_only: false,
            handler,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name.to_lowercase() == input_lower
            || self.aliases.iter().any(|a| a.to_lowercase() == input_lower)
    }
}

/// Command registry - the dispatcher's table of live commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Fails when the name or one of the aliases
    /// collides with an already registered command.
    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        let taken = std::iter::once(&command.name)
            .chain(command.aliases.iter())
            .any(|n| self.find(n).is_some());
        if taken {
            return Err(CommandError::Duplicate(command.name.clone()));
        }
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Option<Command> {
        self.commands.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Look a command up by name or alias.
    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands.values().find(|c| c.matches(input))
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Command {
        let handler = FnHandler(
            |_ctx: CommandContext| -> Result<Option<String>, CommandError> { Ok(None) },
        );
        Command::new(name, Arc::new(handler))
    }

    #[test]
    fn register_then_find_by_alias() {
        let mut registry = CommandRegistry::new();
        registry
            .register(noop("instantcmd").with_aliases(vec!["instacmd".into()]))
            .unwrap();

        assert!(registry.find("instantcmd").is_some());
        assert!(registry.find("INSTACMD").is_some());
        assert!(registry.find("other").is_none());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("ping")).unwrap();

        let err = registry.register(noop("ping")).unwrap_err();
        assert!(matches!(err, CommandError::Duplicate(name) if name == "ping"));
    }

    #[test]
    fn alias_collision_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry
            .register(noop("ping").with_aliases(vec!["p".into()]))
            .unwrap();

        let err = registry.register(noop("p")).unwrap_err();
        assert!(matches!(err, CommandError::Duplicate(_)));
    }

    #[test]
    fn unregister_removes_command() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("ping")).unwrap();

        assert!(registry.unregister("ping").is_some());
        assert!(registry.find("ping").is_none());
        assert!(registry.unregister("ping").is_none());
    }
}
