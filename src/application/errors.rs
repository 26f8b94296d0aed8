//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Snippet error: {0}")]
    Snippet(#[from] SnippetError),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("A command named `{0}` is already registered")]
    Duplicate(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,
}

/// Errors raised while turning an operator-submitted snippet into a command
#[derive(Error, Debug)]
pub enum SnippetError {
    /// The snippet failed to compile, or its top-level statements failed to
    /// run. Carries the formatted engine error.
    #[error("the snippet failed to compile:\n{0}")]
    Compile(String),

    #[error("the snippet must define exactly one function, found {count}")]
    AmbiguousDefinition { count: usize },

    #[error("invalid definition: {0}")]
    InvalidKind(String),

    /// The dispatcher rejected the extracted command (e.g. name collision).
    #[error("the command could not be registered: {0}")]
    Registration(#[from] CommandError),

    #[error("no command named `{0}` is registered")]
    NotFound(String),

    #[error("`{0}` was not created through instantcmd")]
    NotOwned(String),

    #[error("timed out waiting for a response")]
    Timeout,
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
