//! Boolean condition evaluator for `{% if %}` blocks.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or_expr    := and_expr [ "or" or_expr ]
//! and_expr   := not_expr [ "and" and_expr ]
//! not_expr   := "not" not_expr | comparison
//! comparison := "(" or_expr ")" | expr OP literal | expr
//! OP         := "==" | "!=" | ">=" | "<=" | ">" | "<"
//! ```
//!
//! `or` and `and` split on their first top-level occurrence, and operators are
//! tried in the order listed so two-character operators win over their
//! one-character prefixes. Keywords and operators inside quotes or
//! parentheses are ignored when splitting.
//!
//! The left side of a comparison is a full expression (path plus filters); the
//! right side is a literal with surrounding quotes stripped. `==`/`!=`
//! compare text. Relational operators compare numbers and fail with
//! [`StencilError::NumericCoercion`] when either side is not numeric.
//!
//! A bare expression is false when it renders to the empty string or to one of
//! [`FALSY_SPELLINGS`], and true otherwise.

use crate::context::Context;
use crate::error::{Result, StencilError};
use crate::expr::render_expression;
use crate::filters::FilterRegistry;

/// Rendered text that counts as false in a bare truthiness test.
pub const FALSY_SPELLINGS: &[&str] = &["0", "false", "False", "None", "null"];

/// Comparison operators in match order.
const OPERATORS: [&str; 6] = ["==", "!=", ">=", "<=", ">", "<"];

/// Evaluate `expression` against `context`.
///
/// # Examples
///
/// ```
/// use stencil::condition::evaluate;
/// use stencil::context::Context;
/// use stencil::filters::FilterRegistry;
/// use serde_json::json;
///
/// let ctx = Context::from_json(json!({"age": 20, "verified": true})).unwrap();
/// let filters = FilterRegistry::new();
/// assert!(evaluate("age >= 18 and verified", &ctx, &filters).unwrap());
/// assert!(!evaluate("not (age > 18)", &ctx, &filters).unwrap());
/// ```
pub fn evaluate(expression: &str, context: &Context, filters: &FilterRegistry) -> Result<bool> {
    Evaluator {
        source: expression,
        context,
        filters,
    }
    .or_expr(expression)
}

struct Evaluator<'a> {
    source: &'a str,
    context: &'a Context,
    filters: &'a FilterRegistry,
}

impl Evaluator<'_> {
    fn or_expr(&self, text: &str) -> Result<bool> {
        match split_keyword(text, "or") {
            Some((left, right)) => Ok(self.and_expr(left)? || self.or_expr(right)?),
            None => self.and_expr(text),
        }
    }

    fn and_expr(&self, text: &str) -> Result<bool> {
        match split_keyword(text, "and") {
            Some((left, right)) => Ok(self.not_expr(left)? && self.and_expr(right)?),
            None => self.not_expr(text),
        }
    }

    fn not_expr(&self, text: &str) -> Result<bool> {
        match strip_keyword_prefix(text.trim(), "not") {
            Some(rest) => Ok(!self.not_expr(rest)?),
            None => self.comparison(text),
        }
    }

    fn comparison(&self, text: &str) -> Result<bool> {
        let text = text.trim();
        if let Some(inner) = strip_outer_parens(text) {
            return self.or_expr(inner);
        }

        let Some((left, op, right)) = find_operator(text) else {
            let rendered = render_expression(text, self.context, self.filters);
            return Ok(!rendered.is_empty() && !FALSY_SPELLINGS.contains(&rendered.as_str()));
        };

        let left = render_expression(left, self.context, self.filters);
        let right = right.trim().trim_matches(|c| c == '\'' || c == '"');

        match op {
            "==" => Ok(left == right),
            "!=" => Ok(left != right),
            _ => {
                let l = self.number(&left)?;
                let r = self.number(right)?;
                Ok(match op {
                    ">=" => l >= r,
                    "<=" => l <= r,
                    ">" => l > r,
                    _ => l < r,
                })
            }
        }
    }

    fn number(&self, operand: &str) -> Result<f64> {
        operand
            .trim()
            .parse::<f64>()
            .map_err(|_| StencilError::NumericCoercion {
                expression: self.source.trim().to_string(),
                operand: operand.to_string(),
            })
    }
}

/// Byte offsets of characters that sit outside quotes and parentheses.
fn top_level_positions(text: &str) -> Vec<usize> {
    let mut positions = Vec::new();
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
            _ if depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Split on the first top-level `keyword` delimited by whitespace or parens.
fn split_keyword<'t>(text: &'t str, keyword: &str) -> Option<(&'t str, &'t str)> {
    let bytes = text.as_bytes();
    top_level_positions(text).into_iter().find_map(|i| {
        let end = i + keyword.len();
        let before_ok = i > 0 && matches!(bytes[i - 1], b' ' | b'\t' | b'\n' | b'\r' | b')');
        let after_ok = end < bytes.len() && matches!(bytes[end], b' ' | b'\t' | b'\n' | b'\r' | b'(');
        (before_ok && after_ok && text[i..].starts_with(keyword))
            .then(|| (&text[..i], &text[end..]))
    })
}

fn strip_keyword_prefix<'t>(text: &'t str, keyword: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(keyword)?;
    rest.starts_with(|c: char| c.is_whitespace() || c == '(')
        .then_some(rest)
}

/// Return the inside of `( ... )` when the parentheses wrap the whole text.
fn strip_outer_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    // the opening paren must close at the very end, not earlier
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(inner)
}

fn find_operator(text: &str) -> Option<(&str, &'static str, &str)> {
    let positions = top_level_positions(text);
    OPERATORS.iter().find_map(|op| {
        positions
            .iter()
            .find(|&&i| text[i..].starts_with(op))
            .map(|&i| (&text[..i], *op, &text[i + op.len()..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterDefaults;
    use serde_json::json;

    fn eval(expression: &str, context: serde_json::Value) -> Result<bool> {
        let ctx = Context::from_json(context).unwrap();
        let filters = FilterRegistry::with_builtins(&FilterDefaults::default());
        evaluate(expression, &ctx, &filters)
    }

    #[test]
    fn test_truthiness() {
        let ctx = json!({
            "name": "Ann", "zero": 0, "off": false, "nothing": null, "blank": "",
            "text_zero": "0", "list": [], "full": [1]
        });
        assert!(eval("name", ctx.clone()).unwrap());
        assert!(eval("full", ctx.clone()).unwrap());
        assert!(!eval("zero", ctx.clone()).unwrap());
        assert!(!eval("off", ctx.clone()).unwrap());
        assert!(!eval("nothing", ctx.clone()).unwrap());
        assert!(!eval("blank", ctx.clone()).unwrap());
        assert!(!eval("text_zero", ctx.clone()).unwrap());
        assert!(!eval("missing", ctx.clone()).unwrap());
        // an empty list renders as "[]", which is not a false spelling
        assert!(eval("list", ctx).unwrap());
    }

    #[test]
    fn test_and_with_comparison() {
        assert!(eval("age >= 18 and verified", json!({"age": 20, "verified": true})).unwrap());
        assert!(!eval("age >= 18 and verified", json!({"age": 20, "verified": false})).unwrap());
        assert!(!eval("age >= 18 and verified", json!({"age": 17, "verified": true})).unwrap());
    }

    #[test]
    fn test_or_and_not() {
        let ctx = json!({"a": true, "b": false});
        assert!(eval("a or b", ctx.clone()).unwrap());
        assert!(eval("b or a", ctx.clone()).unwrap());
        assert!(!eval("b or b", ctx.clone()).unwrap());
        assert!(eval("not b", ctx.clone()).unwrap());
        assert!(eval("not not a", ctx.clone()).unwrap());
        // or binds loosest: b and a or a == (b and a) or a
        assert!(eval("b and a or a", ctx.clone()).unwrap());
        // not binds tighter than and
        assert!(!eval("not a and a", ctx.clone()).unwrap());
        assert!(eval("not b and a", ctx).unwrap());
    }

    #[test]
    fn test_parentheses() {
        let ctx = json!({"age": 20, "a": true, "b": false});
        assert!(eval("not (age < 18)", ctx.clone()).unwrap());
        assert!(!eval("b and (a or a)", ctx.clone()).unwrap());
        assert!(eval("(b and a) or a", ctx.clone()).unwrap());
        assert!(!eval("not (a or b)", ctx).unwrap());
    }

    #[test]
    fn test_equality_compares_text() {
        let ctx = json!({"status": "active", "count": 3, "user": {"role": "admin"}});
        assert!(eval("status == 'active'", ctx.clone()).unwrap());
        assert!(eval("status == \"active\"", ctx.clone()).unwrap());
        assert!(!eval("status != active", ctx.clone()).unwrap());
        assert!(eval("count == 3", ctx.clone()).unwrap());
        assert!(eval("user.role == admin", ctx.clone()).unwrap());
        assert!(eval("user.role | upper == ADMIN", ctx).unwrap());
    }

    #[test]
    fn test_two_character_operators_win() {
        let ctx = json!({"n": 5});
        assert!(eval("n >= 5", ctx.clone()).unwrap());
        assert!(eval("n <= 5", ctx.clone()).unwrap());
        assert!(!eval("n > 5", ctx.clone()).unwrap());
        assert!(!eval("n < 5", ctx.clone()).unwrap());
        assert!(eval("n != 4", ctx).unwrap());
    }

    #[test]
    fn test_numeric_coercion_failure_is_an_error() {
        let err = eval("name > 3", json!({"name": "Ann"})).unwrap_err();
        assert_eq!(
            err,
            StencilError::NumericCoercion {
                expression: "name > 3".to_string(),
                operand: "Ann".to_string(),
            }
        );

        let err = eval("age < many", json!({"age": 3})).unwrap_err();
        assert!(matches!(err, StencilError::NumericCoercion { ref operand, .. } if operand == "many"));
    }

    #[test]
    fn test_short_circuit_skips_failing_operand() {
        assert!(eval("ok or name > 3", json!({"ok": true, "name": "Ann"})).unwrap());
        assert!(!eval("off and name > 3", json!({"off": false, "name": "Ann"})).unwrap());
    }

    #[test]
    fn test_keywords_inside_quotes_and_words_are_ignored() {
        let ctx = json!({"brand": "x", "order": "1"});
        assert!(!eval("brand == 'this or that'", ctx.clone()).unwrap());
        assert!(eval("order", ctx.clone()).unwrap());
        assert!(eval("brand", ctx).unwrap());
    }
}
