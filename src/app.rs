//! Application logic for the CLI commands.
//!
//! This module contains the command logic separated from the main entry
//! point to enable testing. Collaborators are built here from configuration
//! and handed to the [`Gateway`] explicitly.

use std::{path::PathBuf, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    cli::{Format, LlmArgs, Provider},
    config::Config,
    error::{AppResult, config_error},
    executor::SqliteExecutor,
    gateway::Gateway,
    llm::{LlmClient, LlmProvider},
    output::{OutputFormat, OutputOptions, format_envelope, format_verdict},
    server,
    translate::Translator,
    types::UserRequest,
    validator::{KeywordFirewall, Policy, SqlValidator}
};

/// Exit code for a rejected statement in `check`
pub const EXIT_REJECTED: i32 = 2;

/// Fully resolved settings for building a gateway
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub provider:     LlmProvider,
    pub database:     PathBuf,
    pub timeout_secs: u64
}

/// Merge CLI arguments over configuration
///
/// # Errors
///
/// Fails when the provider name is unknown or a hosted provider has no API
/// key.
pub fn resolve_settings(config: &Config, args: LlmArgs) -> AppResult<GatewaySettings> {
    let provider = match args.provider {
        Some(provider) => provider,
        None => match config.llm.provider.as_deref() {
            Some(name) => Provider::from_name(name)
                .ok_or_else(|| config_error(format!("Unknown LLM provider '{}'", name)))?,
            None => Provider::OpenAI
        }
    };
    let api_key = args.api_key.or_else(|| config.llm.api_key.clone());
    let model = args
        .model
        .or_else(|| config.llm.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());
    let base_url = args
        .base_url
        .or_else(|| config.llm.base_url.clone())
        .unwrap_or_else(|| provider.default_base_url().to_string());

    let llm_provider = match provider {
        Provider::OpenAI => LlmProvider::OpenAI {
            api_key: api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?,
            model,
            base_url
        },
        Provider::Anthropic => LlmProvider::Anthropic {
            api_key: api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?,
            model,
            base_url
        },
        Provider::Ollama => LlmProvider::Ollama {
            base_url,
            model
        }
    };

    Ok(GatewaySettings {
        provider:     llm_provider,
        database:     args.database.unwrap_or_else(|| config.database.path.clone()),
        timeout_secs: config.llm.timeout_secs
    })
}

/// Wire the production collaborators into a gateway
pub fn build_gateway(settings: GatewaySettings) -> Gateway {
    let policy = Policy::default();
    let client = LlmClient::with_timeout(
        settings.provider,
        Duration::from_secs(settings.timeout_secs)
    );
    let translator = Translator::for_policy(Arc::new(client), &policy);
    let executor = SqliteExecutor::new(settings.database, policy.max_rows as usize);
    tracing::info!(database = %executor.path().display(), "Using store");
    Gateway::new(
        translator,
        Arc::new(KeywordFirewall::new(policy)),
        Arc::new(executor)
    )
}

/// `serve` command
pub async fn run_serve(config: Config, args: LlmArgs, bind: Option<String>) -> AppResult<i32> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let settings = resolve_settings(&config, args)?;
    tracing::info!(bind = %addr, "Starting gateway");
    server::serve(build_gateway(settings), &addr).await?;
    Ok(0)
}

/// `ask` command; exit code 0 on success, 1 on an error envelope
pub async fn run_ask(
    config: Config,
    args: LlmArgs,
    message: String,
    output_format: Format,
    colored: bool
) -> AppResult<i32> {
    let gateway = build_gateway(resolve_settings(&config, args)?);

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Asking the model...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let envelope = gateway.handle(UserRequest::new(message)).await;
    pb.finish_and_clear();

    let opts = OutputOptions {
        format: convert_format(output_format),
        colored
    };
    println!("{}", format_envelope(&envelope, &opts));
    Ok(if envelope.is_success() { 0 } else { 1 })
}

/// `check` command; exit code 0 when accepted, [`EXIT_REJECTED`] otherwise
pub fn run_check(sql: &str, colored: bool) -> i32 {
    let firewall = KeywordFirewall::default();
    let verdict = firewall.validate(sql);
    println!("{}", format_verdict(&verdict, colored));
    if verdict.is_accepted() { 0 } else { EXIT_REJECTED }
}

fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
