//! Per-request data model shared by the pipeline stages.
//!
//! Nothing here outlives a single request: a [`UserRequest`] enters the
//! gateway, the translator turns it into a [`CandidateQuery`], and the
//! executor answers with a [`QueryResult`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Single result row: column name to scalar value, in result-set column order
pub type Row = IndexMap<String, serde_json::Value>;

/// Ordered rows returned by the executor, bounded by the policy row limit
pub type QueryResult = Vec<Row>;

/// Inbound natural-language request.
///
/// On the wire the text travels as `{"message": "..."}`. A missing field
/// deserializes to an empty string so the gateway can answer it with a
/// regular error envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(rename = "message", default)]
    pub text: String
}

impl UserRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into()
        }
    }
}

/// Where a candidate statement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    Model
}

/// Untrusted SQL produced by the text-generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateQuery {
    pub raw_sql: String,
    pub source:  QuerySource
}

impl CandidateQuery {
    pub fn from_model(raw_sql: impl Into<String>) -> Self {
        Self {
            raw_sql: raw_sql.into(),
            source:  QuerySource::Model
        }
    }
}
