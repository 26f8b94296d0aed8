use async_trait::async_trait;

use crate::application::errors::StorageError;

/// Durable ordered list of snippet sources. Stored order is the order the
/// commands are re-registered in on startup.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Full snapshot of the persisted list.
    async fn all(&self) -> Result<Vec<String>, StorageError>;

    /// Append one snippet to the end of the list.
    async fn append(&self, snippet: &str) -> Result<(), StorageError>;

    /// Replace the whole list.
    async fn replace(&self, snippets: Vec<String>) -> Result<(), StorageError>;
}
