//! # Configuration Management Module
//!
//! TOML configuration for the bot, loaded once at startup.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - command prefix, dialog timeout, page size and limits
//! - [`StorageConfig`] - where the catalog database lives
//! - [`LoggingConfig`] - log level and optional log file
//! - [`ConsoleConfig`] - identity used by the console front-end
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "Recipe Ranger"
//! command_prefix = "!"
//! session_timeout = 5
//! page_size = 5
//! max_collected_lines = 50
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "reciperanger.log"
//!
//! [console]
//! user = "console"
//! channel = "local"
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Prefix that marks a message as a command, e.g. `!add-item`.
    pub command_prefix: String,
    /// Minutes an open dialog may sit idle before it is cancelled. Must be > 0.
    pub session_timeout: u32,
    /// Entries per page in the ingredient price list.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Upper bound on ingredient lines collected for one item.
    #[serde(default = "default_max_collected_lines")]
    pub max_collected_lines: usize,
}

fn default_page_size() -> usize {
    5
}

fn default_max_collected_lines() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the sled database path; defaults to `<data_dir>/catalog`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn catalog_path(&self) -> PathBuf {
        match &self.db_path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.data_dir).join("catalog"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub user: String,
    pub channel: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user: "console".to_string(),
            channel: "local".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config
            .validate()
            .map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject settings the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.bot.command_prefix;
        if prefix.is_empty() {
            return Err(anyhow!("bot.command_prefix must not be empty"));
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(anyhow!("bot.command_prefix must not contain whitespace"));
        }
        if self.bot.session_timeout == 0 {
            return Err(anyhow!("bot.session_timeout must be at least 1 minute"));
        }
        if self.bot.page_size == 0 {
            return Err(anyhow!("bot.page_size must be at least 1"));
        }
        if self.bot.max_collected_lines == 0 {
            return Err(anyhow!("bot.max_collected_lines must be at least 1"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "Recipe Ranger".to_string(),
                command_prefix: "!".to_string(),
                session_timeout: 5,
                page_size: default_page_size(),
                max_collected_lines: default_max_collected_lines(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("reciperanger.log".to_string()),
            },
            console: ConsoleConfig::default(),
        }
    }
}
