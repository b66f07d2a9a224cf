use sqlparser::{
    dialect::SQLiteDialect,
    tokenizer::{Token, Tokenizer, Whitespace}
};

use crate::error::ValidationFailure;

/// Tokenize `sql` and drop whitespace.
///
/// A comment anywhere rejects the statement.
pub fn significant_tokens(sql: &str) -> Result<Vec<Token>, ValidationFailure> {
    let dialect = SQLiteDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|_| ValidationFailure::DisallowedStatement)?;
    let mut significant = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Whitespace(
                Whitespace::SingleLineComment {
                    ..
                }
                | Whitespace::MultiLineComment(_)
            ) => return Err(ValidationFailure::DisallowedStatement),
            Token::Whitespace(_) | Token::EOF => {}
            other => significant.push(other)
        }
    }
    Ok(significant)
}

/// Allow one trailing `;` and reject anything after it
pub fn single_statement(mut tokens: Vec<Token>) -> Result<Vec<Token>, ValidationFailure> {
    match tokens.iter().position(|t| matches!(t, Token::SemiColon)) {
        None => Ok(tokens),
        Some(pos) if pos + 1 == tokens.len() => {
            tokens.truncate(pos);
            Ok(tokens)
        }
        Some(_) => Err(ValidationFailure::MultiStatementRejected)
    }
}

/// Unquoted word text, the only form a keyword can take
pub fn bare_word(token: &Token) -> Option<&str> {
    match token {
        Token::Word(word) if word.quote_style.is_none() => Some(word.value.as_str()),
        _ => None
    }
}

pub fn is_keyword(token: Option<&Token>, keyword: &str) -> bool {
    token
        .and_then(bare_word)
        .is_some_and(|word| word.eq_ignore_ascii_case(keyword))
}
