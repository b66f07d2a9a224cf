//! Response envelopes and their rendering.
//!
//! [`format_response`] is the single place where pipeline outcomes become
//! status codes and caller-visible messages. Messages name the failure
//! category; model-supplied SQL, store error details and upstream service
//! errors are never included.

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, TranslationFailure},
    types::QueryResult,
    validator::ValidationVerdict
};

/// Body of a response: rows or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Rows { rows: QueryResult },
    Error { error: String }
}

/// Response body paired with its HTTP status code
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body:   ResponseBody
}

impl ResponseEnvelope {
    pub fn rows(rows: QueryResult) -> Self {
        Self {
            status: 200,
            body:   ResponseBody::Rows {
                rows
            }
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Error {
                error: message.into()
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Output format for CLI rendering
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

/// Turn a pipeline outcome into an envelope
pub fn format_response(result: Result<QueryResult, PipelineError>) -> ResponseEnvelope {
    match result {
        Ok(rows) => ResponseEnvelope::rows(rows),
        Err(error) => ResponseEnvelope::error(status_for(&error), public_message(&error))
    }
}

/// HTTP status code for a failure
pub fn status_for(error: &PipelineError) -> u16 {
    match error {
        PipelineError::Translation(TranslationFailure::RateLimited) => 429,
        PipelineError::Execution(_) => 500,
        PipelineError::EmptyRequest
        | PipelineError::InvalidRequest(_)
        | PipelineError::Translation(_)
        | PipelineError::Validation(_) => 400
    }
}

/// Caller-visible message for a failure
pub fn public_message(error: &PipelineError) -> String {
    match error {
        PipelineError::Execution(_) => String::from("Query execution failed"),
        PipelineError::Translation(TranslationFailure::ServiceRejected(_)) => {
            String::from("Text-generation service rejected the request")
        }
        other => other.to_string()
    }
}

/// Render an envelope for the terminal
pub fn format_envelope(envelope: &ResponseEnvelope, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&envelope.body).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&envelope.body).unwrap_or_default(),
        OutputFormat::Text => format_text_envelope(envelope, opts)
    }
}

fn format_text_envelope(envelope: &ResponseEnvelope, opts: &OutputOptions) -> String {
    let mut output = String::new();
    match &envelope.body {
        ResponseBody::Rows {
            rows
        } => {
            let header = format!("{} row(s)", rows.len());
            if opts.colored {
                output.push_str(&header.green().bold().to_string());
            } else {
                output.push_str(&header);
            }
            output.push('\n');
            for (i, row) in rows.iter().enumerate() {
                let fields: Vec<String> = row
                    .iter()
                    .map(|(column, value)| format!("{}={}", column, scalar_text(value)))
                    .collect();
                output.push_str(&format!("#{} {}\n", i + 1, fields.join(", ")));
            }
        }
        ResponseBody::Error {
            error
        } => {
            let header = format!("Error ({})", envelope.status);
            if opts.colored {
                output.push_str(&header.red().bold().to_string());
            } else {
                output.push_str(&header);
            }
            output.push_str(&format!(": {}\n", error));
        }
    }
    output
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::from("NULL"),
        other => other.to_string()
    }
}

/// Render a validator verdict for the terminal
pub fn format_verdict(verdict: &ValidationVerdict, colored: bool) -> String {
    match verdict {
        ValidationVerdict::Accepted {
            sql
        } => {
            let label = if colored {
                "ACCEPTED".green().bold().to_string()
            } else {
                String::from("ACCEPTED")
            };
            format!("{}\n{}", label, sql)
        }
        ValidationVerdict::Rejected {
            reason
        } => {
            let label = if colored {
                "REJECTED".red().bold().to_string()
            } else {
                String::from("REJECTED")
            };
            format!("{} [{}]\n{}", label, reason.code(), reason)
        }
    }
}
