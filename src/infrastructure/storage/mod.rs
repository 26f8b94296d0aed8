//! File-based snippet persistence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::SnippetStore;

/// The single persisted record: an ordered list of snippet sources.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnippetRecord {
    #[serde(default)]
    commands: Vec<String>,
}

/// JSON file-backed store. The file is read fully on open and rewritten on
/// every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    record: RwLock<SnippetRecord>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let record = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => SnippetRecord::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            record: RwLock::new(record),
        })
    }

    async fn flush(&self, record: &SnippetRecord) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl SnippetStore for FileStore {
    async fn all(&self) -> Result<Vec<String>, StorageError> {
        let record = self.record.read().await;
        Ok(record.commands.clone())
    }

    async fn append(&self, snippet: &str) -> Result<(), StorageError> {
        let mut record = self.record.write().await;
        record.commands.push(snippet.to_string());
        self.flush(&record).await
    }

    async fn replace(&self, snippets: Vec<String>) -> Result<(), StorageError> {
        let mut record = self.record.write().await;
        record.commands = snippets;
        self.flush(&record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("instantcmd-test-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn starts_empty_when_file_is_missing() {
        let store = FileStore::open(temp_path()).await.unwrap();
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_survives_reopen() {
        let path = temp_path();

        let store = FileStore::open(&path).await.unwrap();
        store.append("fn a(args) { 1 }").await.unwrap();
        store.append("fn b(args) { 2 }").await.unwrap();

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.all().await.unwrap(),
            vec!["fn a(args) { 1 }", "fn b(args) { 2 }"]
        );

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn replace_overwrites_the_list() {
        let path = temp_path();

        let store = FileStore::open(&path).await.unwrap();
        store.append("fn a(args) { 1 }").await.unwrap();
        store.replace(vec!["fn c(args) { 3 }".to_string()]).await.unwrap();

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.all().await.unwrap(), vec!["fn c(args) { 3 }"]);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let path = temp_path();
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
