//! Error types and constructors.
//!
//! Two families live here:
//!
//! - Pipeline failures ([`TranslationFailure`], [`ValidationFailure`],
//!   [`ExecutionFailure`], wrapped by [`PipelineError`]). Every one of them
//!   ends up in a response envelope, never as an unhandled fault.
//! - Startup and CLI failures, expressed as [`AppError`] through the
//!   constructor functions below.

pub use masterror::{AppError, AppResult};
use thiserror::Error;

/// Failures while turning user text into a candidate statement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationFailure {
    #[error("Model returned no output")]
    EmptyOutput,
    #[error("Model output is not a JSON object with a \"query\" string")]
    MalformedOutput,
    #[error("Text-generation service rejected the request: {0}")]
    ServiceRejected(String),
    #[error("Text-generation service rate limit exceeded")]
    RateLimited
}

/// Reasons the safety validator refuses a candidate statement.
///
/// Display strings name the category only. The offending SQL is never part
/// of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("Query rejected: only read-only SELECT statements are allowed")]
    DisallowedStatement,
    #[error("Query rejected: query references a table that is not allowed")]
    TableNotAllowed,
    #[error("Query rejected: requested row limit exceeds the allowed maximum")]
    LimitExceeded,
    #[error("Query rejected: multiple statements are not allowed")]
    MultiStatementRejected
}

impl ValidationFailure {
    /// Stable identifier for logs and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            Self::DisallowedStatement => "disallowed_statement",
            Self::TableNotAllowed => "table_not_allowed",
            Self::LimitExceeded => "limit_exceeded",
            Self::MultiStatementRejected => "multi_statement_rejected"
        }
    }
}

/// Failures raised by the relational store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    #[error("Query execution failed: {0}")]
    StoreError(String)
}

/// Any failure a request can end in
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("No query provided")]
    EmptyRequest,
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Translation(#[from] TranslationFailure),
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Execution(#[from] ExecutionFailure)
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create server error (bind or serve failure)
pub fn server_error(message: impl Into<String>) -> AppError {
    AppError::internal(message.into())
}

/// Describe a transport-level HTTP failure
pub fn describe_http_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_decode() {
        format!("Unreadable response: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else {
        err.to_string()
    }
}
