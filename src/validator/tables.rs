use sqlparser::tokenizer::Token;

use super::{Policy, tokens::{bare_word, is_keyword}};
use crate::error::ValidationFailure;

/// Keywords that close a `FROM` list at the current nesting depth
const FROM_LIST_TERMINATORS: &[&str] = &[
    "WHERE", "GROUP", "HAVING", "ORDER", "LIMIT", "WINDOW", "UNION", "EXCEPT", "INTERSECT",
    "SELECT", "VALUES"
];

/// Scan state for one parenthesis level
#[derive(Default)]
struct Frame {
    in_from_list:  bool,
    expect_target: bool
}

/// Check every `FROM`/`JOIN` target against the table allow-list.
///
/// Targets are the first item after `FROM`, after `JOIN`, and after each
/// comma of a `FROM` list. A parenthesised target must open a subquery; the
/// subquery's own targets are checked as the scan descends into it.
pub fn check_tables(tokens: &[Token], policy: &Policy) -> Result<(), ValidationFailure> {
    let mut frames = vec![Frame::default()];
    let mut idx = 0;
    while idx < tokens.len() {
        let token = &tokens[idx];
        let Some(frame) = frames.last_mut() else {
            return Err(ValidationFailure::DisallowedStatement);
        };

        if frame.expect_target {
            frame.expect_target = false;
            match token {
                Token::LParen => {
                    if !is_keyword(tokens.get(idx + 1), "SELECT") {
                        return Err(ValidationFailure::TableNotAllowed);
                    }
                    frames.push(Frame::default());
                    idx += 1;
                }
                Token::Word(_) => {
                    let (name, next) = qualified_name(tokens, idx);
                    if !policy.allows_table(&name) {
                        return Err(ValidationFailure::TableNotAllowed);
                    }
                    idx = next;
                }
                _ => return Err(ValidationFailure::TableNotAllowed)
            }
            continue;
        }

        match token {
            Token::LParen => frames.push(Frame::default()),
            Token::RParen => {
                frames.pop();
            }
            Token::Comma if frame.in_from_list => frame.expect_target = true,
            Token::Word(_) => {
                if starts_table_clause(tokens, idx) {
                    frame.in_from_list = true;
                    frame.expect_target = true;
                } else if bare_word(token).is_some_and(|w| {
                    FROM_LIST_TERMINATORS
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(w))
                }) {
                    frame.in_from_list = false;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    match frames.last() {
        Some(frame) if frame.expect_target => Err(ValidationFailure::TableNotAllowed),
        _ => Ok(())
    }
}

/// `FROM` (except in `IS [NOT] DISTINCT FROM`) or any `JOIN`
fn starts_table_clause(tokens: &[Token], idx: usize) -> bool {
    let current = tokens.get(idx);
    if is_keyword(current, "JOIN") {
        return true;
    }
    is_keyword(current, "FROM") && !(idx > 0 && is_keyword(tokens.get(idx - 1), "DISTINCT"))
}

/// Read `name` or `schema.name` starting at `idx`; returns the dotted name
/// and the index just past it
fn qualified_name(tokens: &[Token], idx: usize) -> (String, usize) {
    let mut parts = Vec::new();
    let mut next = idx;
    while let Some(Token::Word(word)) = tokens.get(next) {
        parts.push(word.value.as_str());
        next += 1;
        if matches!(tokens.get(next), Some(Token::Period)) {
            next += 1;
        } else {
            break;
        }
    }
    (parts.join("."), next)
}
