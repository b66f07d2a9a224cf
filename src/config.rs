//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables (a `.env` file is loaded first when present)
//! 3. `.nl-sql-gateway.toml` in current directory
//! 4. `~/.config/nl-sql-gateway/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [llm]
//! provider = "openai"          # openai, anthropic, ollama
//! model = "gpt-4.1"
//! api_key = "sk-..."           # or use LLM_API_KEY env var
//! base_url = "https://api.openai.com/v1"
//! timeout_secs = 120
//!
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [database]
//! path = "customers.db"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `LLM_API_KEY` | API key for OpenAI/Anthropic |
//! | `OPENAI_API_KEY` | Fallback when `LLM_API_KEY` is unset |
//! | `LLM_PROVIDER` | Provider name |
//! | `LLM_MODEL` | Model identifier |
//! | `LLM_BASE_URL` | OpenAI-compatible API root or Ollama URL |
//! | `DATABASE_PATH` | SQLite database file |
//! | `BIND_ADDRESS` | HTTP listen address |

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = ".nl-sql-gateway.toml";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm:      LlmConfig,
    #[serde(default)]
    pub server:   ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig
}

/// Text-generation provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider:     Option<String>,
    pub api_key:      Option<String>,
    pub model:        Option<String>,
    pub base_url:     Option<String>,
    pub timeout_secs: u64
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider:     None,
            api_key:      None,
            model:        None,
            base_url:     None,
            timeout_secs: crate::llm::DEFAULT_TIMEOUT_SECS
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: String::from("127.0.0.1:5000")
        }
    }
}

/// Relational store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("customers.db")
        }
    }
}

impl Config {
    /// Load configuration from files and environment
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("nl-sql-gateway")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    fn from_file(path: &PathBuf) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Override values from environment variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = lookup("LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.llm.api_key = Some(api_key);
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = Some(provider);
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(bind) = lookup("BIND_ADDRESS") {
            self.server.bind = bind;
        }
    }
}
