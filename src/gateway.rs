//! Per-request orchestration.
//!
//! ```text
//! Received ──▶ Translating ──▶ Validating ──▶ Executing ──▶ Formatted
//!     │             │              │              │
//!     └─────────────┴──────────────┴──────────────┴──▶ Formatted(error)
//! ```
//!
//! The first failing stage ends the request. The gateway holds only shared
//! references to its collaborators, which are injected at construction, so
//! concurrent requests share no mutable state.

use std::{fmt, sync::Arc};

use crate::{
    error::PipelineError,
    executor::QueryExecutor,
    output::{ResponseEnvelope, format_response},
    translate::Translator,
    types::{QueryResult, UserRequest},
    validator::SqlValidator
};

/// Pipeline stage a request is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Translating,
    Validating,
    Executing,
    Formatted
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Translating => "translating",
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Formatted => "formatted"
        };
        f.write_str(name)
    }
}

/// Translate, validate, execute and format one request at a time
#[derive(Clone)]
pub struct Gateway {
    translator: Arc<Translator>,
    validator:  Arc<dyn SqlValidator>,
    executor:   Arc<dyn QueryExecutor>
}

impl Gateway {
    pub fn new(
        translator: Translator,
        validator: Arc<dyn SqlValidator>,
        executor: Arc<dyn QueryExecutor>
    ) -> Self {
        Self {
            translator: Arc::new(translator),
            validator,
            executor
        }
    }

    /// Run `request` through the pipeline; always yields an envelope
    pub async fn handle(&self, request: UserRequest) -> ResponseEnvelope {
        let result = self.run(&request).await;
        match &result {
            Ok(rows) => tracing::info!(stage = %Stage::Formatted, rows = rows.len(), "request answered"),
            Err(PipelineError::Execution(e)) => {
                tracing::error!(stage = %Stage::Formatted, error = %e, "request failed in store")
            }
            Err(e) => tracing::warn!(stage = %Stage::Formatted, error = %e, "request failed")
        }
        format_response(result)
    }

    async fn run(&self, request: &UserRequest) -> Result<QueryResult, PipelineError> {
        tracing::debug!(stage = %Stage::Received);
        let text = request.text.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyRequest);
        }

        tracing::debug!(stage = %Stage::Translating);
        let candidate = self.translator.translate(text).await?;

        tracing::debug!(stage = %Stage::Validating, sql = %candidate.raw_sql);
        let sql = self.validator.validate(&candidate.raw_sql).into_result()?;

        tracing::debug!(stage = %Stage::Executing, sql = %sql);
        Ok(self.executor.execute(&sql).await?)
    }
}
