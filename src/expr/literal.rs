//! Strict literal grammar for filter arguments.
//!
//! Arguments are data, never code. The accepted forms are:
//!
//! - integers and decimals: `3`, `-2`, `0.5`, `1e3`
//! - single- or double-quoted strings with `\\`, `\'`, `\"`, `\n`, `\t` escapes
//! - `true`/`false` (also `True`/`False`)
//! - `null` (also `none`/`None`)
//!
//! Anything else is rejected with a [`LiteralError`].

use crate::value::Value;
use thiserror::Error;

/// Failure to parse a filter argument list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("unterminated string literal starting at '{0}'")]
    UnterminatedString(String),

    #[error("unknown escape '\\{0}' in string literal")]
    UnknownEscape(char),

    #[error("'{0}' is not a number, string, boolean, or null literal")]
    NotALiteral(String),

    #[error("empty argument in argument list")]
    EmptyArgument,

    #[error("unbalanced parentheses in filter call '{0}'")]
    Unbalanced(String),
}

/// Parse one literal.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LiteralError::EmptyArgument);
    }

    if let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') {
        return parse_quoted(text, quote).map(Value::String);
    }

    match text {
        "true" | "True" => return Ok(Value::Bool(true)),
        "false" | "False" => return Ok(Value::Bool(false)),
        "null" | "none" | "None" => return Ok(Value::Null),
        _ => {}
    }

    if looks_numeric(text) {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Int(n));
        }
        if let Ok(f) = text.parse::<f64>() {
            if f.is_finite() {
                return Ok(Value::Float(f));
            }
        }
    }

    Err(LiteralError::NotALiteral(text.to_string()))
}

/// Parse a comma-separated argument list (the text between the parentheses).
///
/// An empty list is allowed, and so is a single trailing comma.
pub fn parse_args(text: &str) -> Result<Vec<Value>, LiteralError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut pieces = split_unquoted(text, ',');
    if pieces.len() > 1 && pieces.last().is_some_and(|p| p.trim().is_empty()) {
        pieces.pop();
    }

    pieces.into_iter().map(parse_literal).collect()
}

/// Split `text` on `sep`, ignoring separators inside quotes or parentheses.
pub(crate) fn split_unquoted(text: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if c == sep && depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

fn parse_quoted(text: &str, quote: char) -> Result<String, LiteralError> {
    let mut out = String::new();
    let mut chars = text[quote.len_utf8()..].chars();

    loop {
        match chars.next() {
            None => return Err(LiteralError::UnterminatedString(text.to_string())),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                Some(c) => return Err(LiteralError::UnknownEscape(c)),
                None => return Err(LiteralError::UnterminatedString(text.to_string())),
            },
            Some(c) if c == quote => break,
            Some(c) => out.push(c),
        }
    }

    let rest: String = chars.collect();
    if rest.trim().is_empty() {
        Ok(out)
    } else {
        Err(LiteralError::NotALiteral(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(parse_literal("3"), Ok(Value::Int(3)));
        assert_eq!(parse_literal("-2"), Ok(Value::Int(-2)));
        assert_eq!(parse_literal("0.5"), Ok(Value::Float(0.5)));
        assert_eq!(parse_literal(".5"), Ok(Value::Float(0.5)));
        assert_eq!(parse_literal("1e3"), Ok(Value::Float(1000.0)));
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse_literal("'€'"), Ok(Value::from("€")));
        assert_eq!(parse_literal(r#""a, b""#), Ok(Value::from("a, b")));
        assert_eq!(parse_literal(r#"'it\'s'"#), Ok(Value::from("it's")));
        assert_eq!(parse_literal(r#""line\nbreak""#), Ok(Value::from("line\nbreak")));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_literal("true"), Ok(Value::Bool(true)));
        assert_eq!(parse_literal("False"), Ok(Value::Bool(false)));
        assert_eq!(parse_literal("None"), Ok(Value::Null));
    }

    #[test]
    fn test_rejects_code() {
        assert!(matches!(
            parse_literal("__import__('os')"),
            Err(LiteralError::NotALiteral(_))
        ));
        assert!(matches!(parse_literal("1 + 1"), Err(LiteralError::NotALiteral(_))));
        assert!(matches!(parse_literal("user.name"), Err(LiteralError::NotALiteral(_))));
        assert!(matches!(parse_literal("'abc"), Err(LiteralError::UnterminatedString(_))));
        assert!(matches!(parse_literal("'a' 'b'"), Err(LiteralError::NotALiteral(_))));
        assert!(matches!(parse_literal(r"'\q'"), Err(LiteralError::UnknownEscape('q'))));
    }

    #[test]
    fn test_argument_lists() {
        assert_eq!(parse_args(""), Ok(vec![]));
        assert_eq!(
            parse_args("10, '...'"),
            Ok(vec![Value::Int(10), Value::from("...")])
        );
        assert_eq!(parse_args("'a,b',"), Ok(vec![Value::from("a,b")]));
        assert_eq!(parse_args("1,,2"), Err(LiteralError::EmptyArgument));
    }

    #[test]
    fn test_split_respects_quotes_and_parens() {
        assert_eq!(
            split_unquoted("a | f('|') | g(1, 2)", '|'),
            vec!["a ", " f('|') ", " g(1, 2)"]
        );
    }
}
