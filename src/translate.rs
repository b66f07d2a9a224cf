//! Natural language to candidate SQL.
//!
//! The [`Translator`] sends the policy prompt on the instruction channel and
//! the user's text on the input channel of a [`TextGenerator`], then parses
//! the reply. The reply must be a JSON object of the form
//! `{"query": "<SQL>"}`; anything else is a [`TranslationFailure`]. No retry
//! is attempted here.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::TranslationFailure, types::CandidateQuery, validator::Policy};

/// Schema description handed to the model
pub const CUSTOMERS_SCHEMA: &str = "customers(id, name, email, favorite_genre, created_at)";

/// Opaque text-generation service.
///
/// Implementations map provider-specific failures onto
/// [`TranslationFailure::ServiceRejected`] and
/// [`TranslationFailure::RateLimited`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, instructions: &str, input: &str) -> Result<String, TranslationFailure>;
}

/// Turns user text into a [`CandidateQuery`] through a [`TextGenerator`]
pub struct Translator {
    generator:     Arc<dyn TextGenerator>,
    policy_prompt: String
}

impl Translator {
    pub fn new(generator: Arc<dyn TextGenerator>, policy_prompt: impl Into<String>) -> Self {
        Self {
            generator,
            policy_prompt: policy_prompt.into()
        }
    }

    /// Translator whose prompt states the rules of `policy`
    pub fn for_policy(generator: Arc<dyn TextGenerator>, policy: &Policy) -> Self {
        Self::new(generator, render_policy_prompt(policy))
    }

    pub fn policy_prompt(&self) -> &str {
        &self.policy_prompt
    }

    pub async fn translate(&self, user_text: &str) -> Result<CandidateQuery, TranslationFailure> {
        let output = self
            .generator
            .generate(&self.policy_prompt, user_text)
            .await?;
        parse_model_output(&output)
    }
}

/// Parse the model reply into a candidate statement.
///
/// # Errors
///
/// - [`TranslationFailure::EmptyOutput`] when the reply is blank
/// - [`TranslationFailure::MalformedOutput`] when it is not JSON or has no
///   string `query` field
pub fn parse_model_output(output: &str) -> Result<CandidateQuery, TranslationFailure> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(TranslationFailure::EmptyOutput);
    }
    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|_| TranslationFailure::MalformedOutput)?;
    match value.get("query") {
        Some(serde_json::Value::String(sql)) => Ok(CandidateQuery::from_model(sql.as_str())),
        _ => Err(TranslationFailure::MalformedOutput)
    }
}

/// Render the instruction prompt for `policy`
pub fn render_policy_prompt(policy: &Policy) -> String {
    let statements = join_words(&policy.allowed_statements, "or");
    let forbidden = join_words(&policy.forbidden_keywords, "or");
    let tables = policy
        .allowed_tables
        .iter()
        .map(|t| format!("`{}`", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are an assistant that generates safe, read-only SQL queries for a marketing team.\n\n\
         Rules:\n\
         - Only use {statements} statements.\n\
         - Never use {forbidden}.\n\
         - Always include a LIMIT clause (default {max_rows}, never more than {max_rows}).\n\
         - Only query from the {tables} table.\n\
         - Use standard SQL syntax (SQLite compatible).\n\
         - Return exactly one statement, without comments.\n\n\
         Schema:\n\
         {schema}\n\n\
         Example:\n\
         User: Show all sci-fi readers\n\
         SQL: SELECT * FROM customers WHERE favorite_genre = 'Sci-Fi' LIMIT {max_rows};\n\n\
         Return the query in JSON format, like this:\n    \
         {{\"query\": \"SELECT ...\"}}\n\
         Only provide the JSON response, not explanations.",
        max_rows = policy.max_rows,
        schema = CUSTOMERS_SCHEMA
    )
}

fn join_words(words: &[compact_str::CompactString], conjunction: &str) -> String {
    match words {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} {} {}", first, conjunction, second),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|w| w.as_str()).collect();
            format!("{}, {} {}", head.join(", "), conjunction, last)
        }
    }
}
