//! Safety validation for model-generated SQL.
//!
//! The validator is a policy firewall that sits between the untrusted
//! statement produced by the text-generation service and the database. It
//! works on the token stream produced by [`sqlparser`]'s tokenizer, so
//! keyword matching respects token boundaries and ignores string literals,
//! and finally requires the statement to parse as exactly one query.
//!
//! # Checks
//!
//! | Order | Check | Rejection |
//! |-------|-------|-----------|
//! | 1 | Statement tokenizes and carries no comments | `DisallowedStatement` |
//! | 2 | Nothing follows a `;` | `MultiStatementRejected` |
//! | 3 | Starts with an allowed statement keyword | `DisallowedStatement` |
//! | 4 | No forbidden keyword as a whole word | `DisallowedStatement` |
//! | 5 | Every `FROM`/`JOIN` target is allow-listed | `TableNotAllowed` |
//! | 6 | Top-level `LIMIT` is a literal within `max_rows` | `LimitExceeded` |
//! | 7 | Parses as a single query statement | `DisallowedStatement` |
//!
//! When no top-level `LIMIT` is present, `LIMIT <max_rows>` is appended.
//! Validating an accepted statement again yields the same statement.
//!
//! # Example
//!
//! ```
//! use nl_sql_gateway::validator::{Policy, ValidationVerdict, validate};
//!
//! let verdict = validate("SELECT name FROM customers", &Policy::default());
//! assert_eq!(
//!     verdict,
//!     ValidationVerdict::Accepted {
//!         sql: "SELECT name FROM customers LIMIT 100".into()
//!     }
//! );
//! ```

mod limit;
mod tables;
mod tokens;

use compact_str::CompactString;
use smallvec::{SmallVec, smallvec};
use sqlparser::{ast::Statement, dialect::SQLiteDialect, parser::Parser};

use crate::error::ValidationFailure;

/// Keyword and identifier sets (typically < 8 elements)
pub type WordVec = SmallVec<[CompactString; 8]>;

/// Fixed rule set enforced on every candidate statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Keywords a statement may start with
    pub allowed_statements: WordVec,
    /// Keywords that may not appear anywhere as a whole word
    pub forbidden_keywords: WordVec,
    /// Tables that `FROM` and `JOIN` may reference
    pub allowed_tables:     WordVec,
    /// Upper bound on returned rows, also the injected default `LIMIT`
    pub max_rows:           u64
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allowed_statements: smallvec![CompactString::const_new("SELECT")],
            forbidden_keywords: smallvec![
                CompactString::const_new("INSERT"),
                CompactString::const_new("UPDATE"),
                CompactString::const_new("DELETE"),
                CompactString::const_new("DROP"),
                CompactString::const_new("ALTER"),
                CompactString::const_new("ATTACH"),
                CompactString::const_new("PRAGMA"),
            ],
            allowed_tables:     smallvec![CompactString::const_new("customers")],
            max_rows:           100
        }
    }
}

impl Policy {
    pub fn allows_table(&self, name: &str) -> bool {
        self.allowed_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name))
    }

    pub fn is_forbidden(&self, word: &str) -> bool {
        self.forbidden_keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
    }

    pub fn allows_statement(&self, word: &str) -> bool {
        self.allowed_statements
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
    }
}

/// Accept or reject decision for one candidate statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// Safe to execute; `sql` may carry an injected `LIMIT`
    Accepted { sql: String },
    Rejected { reason: ValidationFailure }
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn into_result(self) -> Result<String, ValidationFailure> {
        match self {
            Self::Accepted {
                sql
            } => Ok(sql),
            Self::Rejected {
                reason
            } => Err(reason)
        }
    }
}

impl From<Result<String, ValidationFailure>> for ValidationVerdict {
    fn from(result: Result<String, ValidationFailure>) -> Self {
        match result {
            Ok(sql) => Self::Accepted {
                sql
            },
            Err(reason) => Self::Rejected {
                reason
            }
        }
    }
}

/// Seam for statement policies.
///
/// The gateway only sees this trait, so the token-level firewall can be
/// replaced by an AST-based policy engine without touching the gateway or
/// the executor.
pub trait SqlValidator: Send + Sync {
    /// Policy this validator enforces
    fn policy(&self) -> &Policy;

    /// Decide whether `sql` may reach the executor
    fn validate(&self, sql: &str) -> ValidationVerdict;
}

/// Token-scanning validator enforcing a [`Policy`]
#[derive(Debug, Clone, Default)]
pub struct KeywordFirewall {
    policy: Policy
}

impl KeywordFirewall {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy
        }
    }
}

impl SqlValidator for KeywordFirewall {
    fn policy(&self) -> &Policy {
        &self.policy
    }

    fn validate(&self, sql: &str) -> ValidationVerdict {
        validate(sql, &self.policy)
    }
}

/// Validate a candidate statement against `policy`
pub fn validate(sql: &str, policy: &Policy) -> ValidationVerdict {
    check(sql, policy).into()
}

fn check(sql: &str, policy: &Policy) -> Result<String, ValidationFailure> {
    let statement = sql.trim();
    let words = tokens::single_statement(tokens::significant_tokens(statement)?)?;

    match words.first().and_then(tokens::bare_word) {
        Some(word) if policy.allows_statement(word) => {}
        _ => return Err(ValidationFailure::DisallowedStatement)
    }
    if words
        .iter()
        .filter_map(tokens::bare_word)
        .any(|word| policy.is_forbidden(word))
    {
        return Err(ValidationFailure::DisallowedStatement);
    }

    tables::check_tables(&words, policy)?;

    let mut accepted = strip_terminator(statement).to_string();
    match limit::top_level_limit(&words)? {
        None => accepted.push_str(&format!(" LIMIT {}", policy.max_rows)),
        Some(rows) if rows > policy.max_rows => return Err(ValidationFailure::LimitExceeded),
        Some(_) => {}
    }

    ensure_single_query(&accepted)?;
    Ok(accepted)
}

/// Drop the optional trailing `;`; anything after it was rejected earlier
fn strip_terminator(statement: &str) -> &str {
    statement
        .strip_suffix(';')
        .map(str::trim_end)
        .unwrap_or(statement)
}

fn ensure_single_query(sql: &str) -> Result<(), ValidationFailure> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql)
        .map_err(|_| ValidationFailure::DisallowedStatement)?;
    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        _ => Err(ValidationFailure::DisallowedStatement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_terminator_keeps_inner_semicolons() {
        assert_eq!(
            strip_terminator("SELECT ';' FROM customers ;"),
            "SELECT ';' FROM customers"
        );
        assert_eq!(strip_terminator("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn default_policy_matches_customer_table() {
        let policy = Policy::default();
        assert!(policy.allows_table("CUSTOMERS"));
        assert!(!policy.allows_table("orders"));
        assert!(policy.is_forbidden("pragma"));
        assert_eq!(policy.max_rows, 100);
    }
}
