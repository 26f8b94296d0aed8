//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub owner: OwnerConfig,
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

/// Operators allowed to use the management commands
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OwnerConfig {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub path: PathBuf,
}

/// Tunables of the dynamic command registry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// How long `create` waits for the operator's follow-up message
    pub response_timeout_secs: u64,
    /// Whether a snippet is still persisted when the dispatcher rejects its
    /// command (the reference behavior; off by default)
    pub persist_on_registration_error: bool,
    /// Re-register persisted snippets on startup
    pub load_on_start: bool,
    /// Per-message size limit used when chunking long replies
    pub message_limit: usize,
    /// Operation budget for a single script evaluation; unset means unbounded
    pub max_script_operations: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "instantcmd".to_string(),
                prefix: "/".to_string(),
            },
            owner: OwnerConfig { ids: Vec::new() },
            storage: StorageConfig {
                path: PathBuf::from("instantcmd.json"),
            },
            registry: RegistryConfig {
                response_timeout_secs: 900,
                persist_on_registration_error: false,
                load_on_start: true,
                message_limit: 4096,
                max_script_operations: Some(1_000_000),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();

        if let Ok(owners) = std::env::var("INSTANTCMD_OWNER") {
            config.owner.ids = owners
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }
        if let Ok(path) = std::env::var("INSTANTCMD_STORE") {
            config.storage.path = PathBuf::from(path);
        }

        config
    }

    /// Check if a user id belongs to the bot owner
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner.ids.iter().any(|id| id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_settings() {
        let config = Config::default();
        assert_eq!(config.registry.response_timeout_secs, 900);
        assert!(!config.registry.persist_on_registration_error);
        assert!(config.registry.load_on_start);
    }

    #[test]
    fn round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.bot.prefix, config.bot.prefix);
        assert_eq!(
            parsed.registry.response_timeout_secs,
            config.registry.response_timeout_secs
        );
    }

    #[test]
    fn owner_check() {
        let mut config = Config::default();
        config.owner.ids = vec!["42".to_string()];
        assert!(config.is_owner("42"));
        assert!(!config.is_owner("43"));
    }
}
