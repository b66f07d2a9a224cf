use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Natural-language SQL gateway with a read-only safety firewall
#[derive(Parser, Debug)]
#[command(name = "nl-sql-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP query endpoint
    Serve {
        #[command(flatten)]
        llm: LlmArgs,

        /// Listen address (e.g. 127.0.0.1:5000)
        #[arg(short, long)]
        bind: Option<String>
    },
    /// Answer one question through the full pipeline
    Ask {
        /// Question in natural language
        message: String,

        #[command(flatten)]
        llm: LlmArgs,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },
    /// Run only the safety validator on a SQL statement
    Check {
        /// Candidate SQL statement
        sql: String,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

/// Provider and store options shared by `serve` and `ask`
#[derive(Args, Debug, Clone, Default)]
pub struct LlmArgs {
    /// LLM provider to use
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// API key for OpenAI or Anthropic
    #[arg(short, long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// OpenAI-compatible API root or Ollama base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// SQLite database file
    #[arg(short, long)]
    pub database: Option<PathBuf>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4.1",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }

    /// Get default API root for provider
    pub fn default_base_url(&self) -> &str {
        match self {
            Self::OpenAI => crate::llm::OPENAI_BASE_URL,
            Self::Anthropic => "https://api.anthropic.com",
            Self::Ollama => "http://localhost:11434"
        }
    }

    /// Parse a provider name from configuration
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
