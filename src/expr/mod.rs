//! Expression resolver.
//!
//! An expression is a dotted variable path followed by an optional filter
//! pipeline:
//!
//! ```text
//! user.name | lower | truncate(20, '…')
//! ```
//!
//! Paths never fail: a missing key or field at any segment yields the empty
//! string. Filter arguments go through the strict literal grammar in
//! [`literal`]; a filter whose arguments do not parse is skipped at apply
//! time and the value passes through unchanged.
//!
//! The head of an expression may also be a quoted string or a number
//! (`{{ 'Hello' | upper }}`), which is used as-is instead of being resolved.

pub mod literal;

use crate::context::{CURRENT_VALUE, Context};
use crate::filters::FilterRegistry;
use crate::value::Value;

pub use literal::{LiteralError, parse_args, parse_literal};

/// Resolve a dotted path against a context.
///
/// `.` alone names the current element of a section. Any segment that
/// cannot be traversed produces the empty string.
///
/// # Examples
///
/// ```
/// use stencil::context::Context;
/// use stencil::expr::resolve;
/// use stencil::value::Value;
///
/// let ctx = Context::from_json(serde_json::json!({"user": {"name": "Alice"}})).unwrap();
/// assert_eq!(resolve("user.name", &ctx), Value::from("Alice"));
/// assert_eq!(resolve("user.email", &ctx), Value::from(""));
/// ```
pub fn resolve(path: &str, context: &Context) -> Value {
    let path = path.trim();
    if path == CURRENT_VALUE {
        return context.get(CURRENT_VALUE).cloned().unwrap_or_else(Value::empty);
    }

    let mut segments = path.split('.').map(str::trim);
    let Some(first) = segments.next() else {
        return Value::empty();
    };

    let mut current = match context.get(first) {
        Some(value) => value.clone(),
        None => return Value::empty(),
    };

    for segment in segments {
        current = match current.get(segment) {
            Some(value) => value,
            None => return Value::empty(),
        };
    }

    current
}

/// One filter invocation in a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    /// Registered filter name.
    pub name: String,
    /// Parsed literal arguments, or the reason they could not be parsed.
    pub args: Result<Vec<Value>, LiteralError>,
}

impl FilterCall {
    /// Parse `name` or `name(arg, ...)`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.split_once('(') {
            None => FilterCall {
                name: text.to_string(),
                args: Ok(Vec::new()),
            },
            Some((name, rest)) => {
                let args = match rest.trim_end().strip_suffix(')') {
                    Some(inner) => parse_args(inner),
                    None => Err(LiteralError::Unbalanced(text.to_string())),
                };
                FilterCall {
                    name: name.trim().to_string(),
                    args,
                }
            }
        }
    }
}

/// The start of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Head {
    /// A dotted path resolved against the context.
    Path(String),
    /// A quoted string or number used verbatim.
    Literal(Value),
}

/// A parsed `head | filter | filter(args)` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub head: Head,
    pub filters: Vec<FilterCall>,
}

impl Expression {
    /// Parse expression text. Parsing never fails; argument errors are kept
    /// on the individual [`FilterCall`]s.
    pub fn parse(text: &str) -> Self {
        let mut parts = literal::split_unquoted(text, '|').into_iter();
        let head_text = parts.next().unwrap_or_default().trim();

        let head = if head_text.starts_with(['"', '\''])
            || head_text.starts_with(|c: char| c.is_ascii_digit() || c == '-')
        {
            match parse_literal(head_text) {
                Ok(value) => Head::Literal(value),
                Err(_) => Head::Path(head_text.to_string()),
            }
        } else {
            Head::Path(head_text.to_string())
        };

        let filters = parts
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(FilterCall::parse)
            .collect();

        Expression { head, filters }
    }

    /// Resolve the head and run the pipeline left to right.
    pub fn evaluate(&self, context: &Context, filters: &FilterRegistry) -> Value {
        let start = match &self.head {
            Head::Path(path) => resolve(path, context),
            Head::Literal(value) => value.clone(),
        };
        self.filters
            .iter()
            .fold(start, |value, call| filters.apply(value, call))
    }
}

/// Parse and evaluate expression text, returning its text form.
pub fn render_expression(text: &str, context: &Context, filters: &FilterRegistry) -> String {
    Expression::parse(text).evaluate(context, filters).to_string()
}
