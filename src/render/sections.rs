//! Section grammar (Mustache-like).
//!
//! | tag                  | meaning                                              |
//! |----------------------|------------------------------------------------------|
//! | `{{name}}`           | resolve, HTML-escape                                 |
//! | `{{{name}}}`, `{{&name}}` | resolve, no escaping                            |
//! | `{{#name}}..{{/name}}` | list: once per element; truthy: once; falsy: nothing |
//! | `{{^name}}..{{/name}}` | once when falsy or an empty list                   |
//! | `{{! comment }}`     | dropped                                              |
//!
//! Names are dotted paths and may carry a filter pipeline; a section closes
//! with its path alone (`{{#items | sort}}..{{/items}}`). Inside a list
//! section, a mapping or object element's fields are layered onto the
//! context, and
//! every element is also reachable as `{{.}}`.
//!
//! Triple braces are recognized before double braces, so `{{{x}}}` never
//! degrades into an escaped `{{x}}` followed by a stray brace.

use super::scan::find_close;
use crate::context::{CURRENT_VALUE, Context};
use crate::error::{Result, StencilError};
use crate::expr::Expression;
use crate::filters::{FilterRegistry, escape_html};
use crate::value::Value;

/// A node of a parsed section template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Escaped(Expression),
    Raw(Expression),
    Section { name: Expression, body: Vec<Node> },
    Inverted { name: Expression, body: Vec<Node> },
}

/// Parse template text into a block tree.
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let mut tokens = tokenize(source).into_iter();
    let nodes = parse_block(&mut tokens, None)?;
    Ok(nodes)
}

/// Parse and render `source` against `context`.
pub fn render(source: &str, context: &Context, filters: &FilterRegistry) -> Result<String> {
    let nodes = parse(source)?;
    let mut out = String::with_capacity(source.len());
    render_nodes(&nodes, context, filters, &mut out);
    Ok(out)
}

/// Render an already-parsed tree, appending to `out`.
pub fn render_nodes(nodes: &[Node], context: &Context, filters: &FilterRegistry, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Escaped(expr) => {
                out.push_str(&escape_html(&expr.evaluate(context, filters).to_string()));
            }
            Node::Raw(expr) => out.push_str(&expr.evaluate(context, filters).to_string()),
            Node::Section { name, body } => match name.evaluate(context, filters) {
                Value::List(items) => {
                    for item in items {
                        let mut vars = match &item {
                            Value::Map(fields) => fields.clone(),
                            Value::Object(object) => object
                                .field_names()
                                .into_iter()
                                .filter_map(|name| object.field(&name).map(|v| (name, v)))
                                .collect(),
                            _ => Default::default(),
                        };
                        vars.insert(CURRENT_VALUE.to_string(), item);
                        render_nodes(body, &context.extend(vars), filters, out);
                    }
                }
                value if value.is_truthy() => render_nodes(body, context, filters, out),
                _ => {}
            },
            Node::Inverted { name, body } => {
                if !name.evaluate(context, filters).is_truthy() {
                    render_nodes(body, context, filters, out);
                }
            }
        }
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug)]
enum Token<'s> {
    Text(&'s str),
    Escaped(&'s str),
    Raw(&'s str),
    Open { name: &'s str, inverted: bool, position: usize },
    Close { name: &'s str, position: usize },
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(offset) = source[pos..].find("{{") {
        let start = pos + offset;
        let triple = source[start..].starts_with("{{{");
        let (opener, closer) = if triple { ("{{{", "}}}") } else { ("{{", "}}") };
        let inner_start = start + opener.len();

        let comment = !triple && source[inner_start..].trim_start().starts_with('!');
        let end = if comment {
            source[inner_start..].find(closer).map(|i| inner_start + i)
        } else {
            find_close(source, inner_start, closer)
        };
        let Some(end) = end else {
            tokens.push(Token::Text(&source[pos..inner_start]));
            pos = inner_start;
            continue;
        };
        let inner = source[inner_start..end].trim();
        let next = end + closer.len();

        let token = if triple {
            Some(Token::Raw(inner))
        } else {
            match inner.chars().next() {
                Some('#') => Some(Token::Open {
                    name: inner[1..].trim(),
                    inverted: false,
                    position: start,
                }),
                Some('^') => Some(Token::Open {
                    name: inner[1..].trim(),
                    inverted: true,
                    position: start,
                }),
                Some('/') => Some(Token::Close {
                    name: inner[1..].trim(),
                    position: start,
                }),
                Some('&') => Some(Token::Raw(inner[1..].trim())),
                Some('!') => None,
                Some(_) => Some(Token::Escaped(inner)),
                None => {
                    // `{{}}` stays literal
                    tokens.push(Token::Text(&source[pos..next]));
                    pos = next;
                    continue;
                }
            }
        };

        if start > pos {
            tokens.push(Token::Text(&source[pos..start]));
        }
        if let Some(token) = token {
            tokens.push(token);
        }
        pos = next;
    }

    if pos < source.len() {
        tokens.push(Token::Text(&source[pos..]));
    }
    tokens
}

// ============================================================================
// Parser
// ============================================================================

/// Parse until the close tag of `open` (name, position), or end of input at
/// the top level.
fn parse_block<'s>(
    tokens: &mut std::vec::IntoIter<Token<'s>>,
    open: Option<(&'s str, usize)>,
) -> Result<Vec<Node>> {
    let mut nodes: Vec<Node> = Vec::new();

    while let Some(token) = tokens.next() {
        match token {
            Token::Text(text) => match nodes.last_mut() {
                Some(Node::Text(prev)) => prev.push_str(text),
                _ => nodes.push(Node::Text(text.to_string())),
            },
            Token::Escaped(expr) => nodes.push(Node::Escaped(Expression::parse(expr))),
            Token::Raw(expr) => nodes.push(Node::Raw(Expression::parse(expr))),
            Token::Open {
                name,
                inverted,
                position,
            } => {
                if name.is_empty() {
                    return Err(StencilError::syntax("section without a name", position));
                }
                let body = parse_block(tokens, Some((name, position)))?;
                let name = Expression::parse(name);
                nodes.push(if inverted {
                    Node::Inverted { name, body }
                } else {
                    Node::Section { name, body }
                });
            }
            Token::Close { name, position } => {
                return match open {
                    Some((open_name, _)) if section_path(open_name) == name => Ok(nodes),
                    Some((open_name, _)) => Err(StencilError::syntax(
                        format!(
                            "section '{}' closed by '{{{{/{}}}}}'",
                            open_name, name
                        ),
                        position,
                    )),
                    None => Err(StencilError::syntax(
                        format!("unexpected '{{{{/{}}}}}' with no open section", name),
                        position,
                    )),
                };
            }
        }
    }

    match open {
        Some((name, position)) => Err(StencilError::syntax(
            format!("unclosed section '{}'", name),
            position,
        )),
        None => Ok(nodes),
    }
}

/// The path part of a section name, which is what its close tag repeats.
fn section_path(name: &str) -> &str {
    name.split('|').next().unwrap_or(name).trim()
}
