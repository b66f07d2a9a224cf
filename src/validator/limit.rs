use sqlparser::tokenizer::Token;

use super::tokens::is_keyword;
use crate::error::ValidationFailure;

/// Row count requested by the outermost `LIMIT`, if any.
///
/// Accepts `LIMIT n`, `LIMIT n OFFSET m` and SQLite's `LIMIT m, n`. Any
/// other shape (expressions, negative values, subqueries) cannot be shown to
/// respect the row bound and is rejected.
pub fn top_level_limit(tokens: &[Token]) -> Result<Option<u64>, ValidationFailure> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ if depth == 0 && is_keyword(Some(token), "LIMIT") => {
                return limit_count(tokens, idx + 1).map(Some);
            }
            _ => {}
        }
    }
    Ok(None)
}

fn limit_count(tokens: &[Token], start: usize) -> Result<u64, ValidationFailure> {
    let first = literal(tokens.get(start))?;
    let (count, rest) = if matches!(tokens.get(start + 1), Some(Token::Comma)) {
        (literal(tokens.get(start + 2))?, start + 3)
    } else {
        (first, start + 1)
    };
    match tokens.get(rest) {
        None => Ok(count),
        Some(token) if is_keyword(Some(token), "OFFSET") => Ok(count),
        Some(_) => Err(ValidationFailure::LimitExceeded)
    }
}

fn literal(token: Option<&Token>) -> Result<u64, ValidationFailure> {
    match token {
        Some(Token::Number(digits, _)) => digits
            .parse()
            .map_err(|_| ValidationFailure::LimitExceeded),
        _ => Err(ValidationFailure::LimitExceeded)
    }
}
