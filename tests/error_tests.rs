// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl_sql_gateway::error::{
    ExecutionFailure, PipelineError, TranslationFailure, ValidationFailure, config_error,
    server_error
};

#[test]
fn test_config_error() {
    let error = config_error("Invalid configuration value");
    assert!(!error.to_string().is_empty());
}

#[test]
fn test_server_error() {
    let error = server_error("Failed to bind to 127.0.0.1:5000");
    let _msg = error.to_string();
}

#[test]
fn test_validation_messages_share_prefix() {
    for failure in [
        ValidationFailure::DisallowedStatement,
        ValidationFailure::TableNotAllowed,
        ValidationFailure::LimitExceeded,
        ValidationFailure::MultiStatementRejected
    ] {
        assert!(failure.to_string().starts_with("Query rejected: "));
    }
}

#[test]
fn test_validation_codes_are_distinct() {
    let codes = [
        ValidationFailure::DisallowedStatement.code(),
        ValidationFailure::TableNotAllowed.code(),
        ValidationFailure::LimitExceeded.code(),
        ValidationFailure::MultiStatementRejected.code()
    ];
    for (i, a) in codes.iter().enumerate() {
        for b in &codes[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_pipeline_error_is_transparent() {
    let error: PipelineError = TranslationFailure::RateLimited.into();
    assert_eq!(
        error.to_string(),
        "Text-generation service rate limit exceeded"
    );

    let error: PipelineError = ValidationFailure::LimitExceeded.into();
    assert_eq!(
        error.to_string(),
        "Query rejected: requested row limit exceeds the allowed maximum"
    );
}

#[test]
fn test_empty_request_message() {
    assert_eq!(PipelineError::EmptyRequest.to_string(), "No query provided");
}

#[test]
fn test_store_error_keeps_detail_for_logs() {
    let error = ExecutionFailure::StoreError("database is locked".into());
    assert!(error.to_string().contains("database is locked"));
}
