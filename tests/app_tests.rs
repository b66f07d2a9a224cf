use std::path::PathBuf;

use nl_sql_gateway::{
    app::{EXIT_REJECTED, resolve_settings, run_check},
    cli::{LlmArgs, Provider},
    config::Config,
    llm::LlmProvider
};

fn config(toml: &str) -> Config {
    Config::from_toml_str(toml).unwrap()
}

#[test]
fn test_openai_is_the_default_provider() {
    let settings = resolve_settings(
        &config("[llm]\napi_key = \"sk-config\""),
        LlmArgs::default()
    )
    .unwrap();

    match settings.provider {
        LlmProvider::OpenAI {
            api_key,
            model,
            base_url
        } => {
            assert_eq!(api_key, "sk-config");
            assert_eq!(model, "gpt-4.1");
            assert_eq!(base_url, "https://api.openai.com/v1");
        }
        other => panic!("unexpected provider {other:?}")
    }
    assert_eq!(settings.database, PathBuf::from("customers.db"));
    assert_eq!(settings.timeout_secs, 120);
}

#[test]
fn test_arguments_override_config() {
    let args = LlmArgs {
        provider: Some(Provider::Anthropic),
        api_key:  Some("sk-arg".into()),
        model:    Some("claude-opus-4".into()),
        base_url: None,
        database: Some(PathBuf::from("other.db"))
    };
    let settings = resolve_settings(
        &config("[llm]\nprovider = \"openai\"\napi_key = \"sk-config\"\nmodel = \"gpt-4.1\""),
        args
    )
    .unwrap();

    match settings.provider {
        LlmProvider::Anthropic {
            api_key,
            model,
            base_url
        } => {
            assert_eq!(api_key, "sk-arg");
            assert_eq!(model, "claude-opus-4");
            assert_eq!(base_url, "https://api.anthropic.com");
        }
        other => panic!("unexpected provider {other:?}")
    }
    assert_eq!(settings.database, PathBuf::from("other.db"));
}

#[test]
fn test_hosted_provider_requires_key() {
    assert!(resolve_settings(&Config::default(), LlmArgs::default()).is_err());

    let args = LlmArgs {
        provider: Some(Provider::Anthropic),
        ..LlmArgs::default()
    };
    assert!(resolve_settings(&Config::default(), args).is_err());
}

#[test]
fn test_ollama_needs_no_key() {
    let settings = resolve_settings(
        &config("[llm]\nprovider = \"ollama\"\nbase_url = \"http://gpu-box:11434\""),
        LlmArgs::default()
    )
    .unwrap();

    match settings.provider {
        LlmProvider::Ollama {
            base_url,
            model
        } => {
            assert_eq!(base_url, "http://gpu-box:11434");
            assert_eq!(model, "llama3.2");
        }
        other => panic!("unexpected provider {other:?}")
    }
}

#[test]
fn test_unknown_configured_provider_is_an_error() {
    assert!(resolve_settings(&config("[llm]\nprovider = \"gemini\""), LlmArgs::default()).is_err());
}

#[test]
fn test_run_check_exit_codes() {
    assert_eq!(run_check("SELECT * FROM customers", false), 0);
    assert_eq!(run_check("DROP TABLE customers", false), EXIT_REJECTED);
}

#[test]
fn test_anthropic_base_url_is_honoured() {
    let args = LlmArgs {
        provider: Some(Provider::Anthropic),
        api_key:  Some("sk-arg".into()),
        base_url: Some("https://llm-proxy.local".into()),
        ..LlmArgs::default()
    };
    let settings = resolve_settings(&Config::default(), args).unwrap();

    match settings.provider {
        LlmProvider::Anthropic {
            base_url, ..
        } => assert_eq!(base_url, "https://llm-proxy.local"),
        other => panic!("unexpected provider {other:?}")
    }
}
