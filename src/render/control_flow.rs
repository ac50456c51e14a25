//! Control-flow grammar: `{% for %}`, `{% if %}`, and `{{ expression }}`.
//!
//! ```text
//! {% for item in order.items %}
//!   {{ loop.index }}. {{ item.name | title }} - {{ item.price | currency }}
//! {% endfor %}
//!
//! {% if user.vip and total > 100 %}Free shipping!{% elif total > 50 %}Almost there{% else %}-{% endif %}
//! ```
//!
//! Templates are parsed into a block tree first. Open and close markers are
//! matched by depth, so nested blocks of the same kind belong to the innermost
//! enclosing pair. Rendering walks the tree: loop bodies are rendered once per
//! element with a context layered with the loop variable and `loop`
//! metadata, and interpolated values are inserted as plain text and never
//! re-scanned for template syntax.

use super::scan::{find_close, find_first};
use crate::condition;
use crate::context::Context;
use crate::error::{Result, StencilError};
use crate::expr::{Expression, resolve};
use crate::filters::FilterRegistry;
use crate::value::{Map, Value};

/// A node of a parsed control-flow template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text.
    Text(String),
    /// `{{ expression }}`.
    Interpolation(Expression),
    /// `{% for var in path %}body{% endfor %}`.
    For {
        var: String,
        path: String,
        body: Vec<Node>,
    },
    /// `{% if c %}..{% elif c %}..{% else %}..{% endif %}`.
    If {
        branches: Vec<(String, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
}

/// Parse template text into a block tree.
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let tokens = tokenize(source);
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };
    let (nodes, end) = parser.parse_until(&[])?;
    match end {
        None => Ok(nodes),
        Some(tag) => Err(StencilError::syntax(
            format!("unexpected {{% {} %}}", tag.keyword),
            tag.position,
        )),
    }
}

/// Parse and render `source` against `context`.
pub fn render(source: &str, context: &Context, filters: &FilterRegistry) -> Result<String> {
    let nodes = parse(source)?;
    let mut out = String::with_capacity(source.len());
    render_nodes(&nodes, context, filters, &mut out)?;
    Ok(out)
}

/// Render an already-parsed tree, appending to `out`.
pub fn render_nodes(
    nodes: &[Node],
    context: &Context,
    filters: &FilterRegistry,
    out: &mut String,
) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Interpolation(expr) => {
                out.push_str(&expr.evaluate(context, filters).to_string());
            }
            Node::For { var, path, body } => {
                let items = iterable(resolve(path, context));
                let length = items.len();
                tracing::debug!(%var, %path, length, "expanding for loop");
                for (i, item) in items.into_iter().enumerate() {
                    let mut vars = Map::new();
                    vars.insert(var.clone(), item);
                    vars.insert("loop".to_string(), loop_metadata(i, length));
                    render_nodes(body, &context.extend(vars), filters, out)?;
                }
            }
            Node::If {
                branches,
                otherwise,
            } => {
                let mut chosen = otherwise;
                for (cond, body) in branches {
                    if condition::evaluate(cond, context, filters)? {
                        chosen = body;
                        break;
                    }
                }
                render_nodes(chosen, context, filters, out)?;
            }
        }
    }
    Ok(())
}

/// Elements a `for` loop visits: list elements, or the keys of a mapping.
/// Everything else iterates as an empty sequence.
fn iterable(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        Value::Map(map) => map.into_keys().map(Value::String).collect(),
        _ => Vec::new(),
    }
}

fn loop_metadata(index0: usize, length: usize) -> Value {
    let mut meta = Map::new();
    meta.insert("index".to_string(), Value::from(index0 + 1));
    meta.insert("index0".to_string(), Value::from(index0));
    meta.insert("first".to_string(), Value::Bool(index0 == 0));
    meta.insert("last".to_string(), Value::Bool(index0 + 1 == length));
    meta.insert("length".to_string(), Value::from(length));
    Value::Map(meta)
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug)]
enum Token<'s> {
    Text(&'s str),
    Output(&'s str),
    Tag(Tag<'s>),
}

#[derive(Debug)]
struct Tag<'s> {
    keyword: &'s str,
    rest: &'s str,
    position: usize,
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some((start, opener)) = find_first(source, pos, &["{{", "{%"]) {
        let closer = if opener == "{%" { "%}" } else { "}}" };
        let inner_start = start + opener.len();
        let Some(end) = find_close(source, inner_start, closer) else {
            // unterminated opener is literal text
            tokens.push(Token::Text(&source[pos..inner_start]));
            pos = inner_start;
            continue;
        };
        let inner = source[inner_start..end].trim();

        if inner.is_empty() {
            // `{{ }}` and `{% %}` stay literal
            tokens.push(Token::Text(&source[pos..end + closer.len()]));
            pos = end + closer.len();
            continue;
        }

        if start > pos {
            tokens.push(Token::Text(&source[pos..start]));
        }
        if opener == "{%" {
            let (keyword, rest) = inner.split_once(char::is_whitespace).unwrap_or((inner, ""));
            tokens.push(Token::Tag(Tag {
                keyword,
                rest: rest.trim(),
                position: start,
            }));
        } else {
            tokens.push(Token::Output(inner));
        }
        pos = end + closer.len();
    }

    if pos < source.len() {
        tokens.push(Token::Text(&source[pos..]));
    }
    tokens
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'s> {
    tokens: std::iter::Peekable<std::vec::IntoIter<Token<'s>>>,
}

impl<'s> Parser<'s> {
    /// Parse nodes until one of `terminators` (returned) or end of input
    /// (`None`). A block-closing tag that is not a terminator here is also
    /// returned so the caller can report it.
    fn parse_until(&mut self, terminators: &[&str]) -> Result<(Vec<Node>, Option<Tag<'s>>)> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token {
                Token::Text(text) => push_text(&mut nodes, text),
                Token::Output(expr) => nodes.push(Node::Interpolation(Expression::parse(expr))),
                Token::Tag(tag) => match tag.keyword {
                    "for" => nodes.push(self.parse_for(tag)?),
                    "if" => nodes.push(self.parse_if(tag)?),
                    "endfor" | "endif" | "else" | "elif" => {
                        if terminators.contains(&tag.keyword) {
                            return Ok((nodes, Some(tag)));
                        }
                        return Err(StencilError::syntax(
                            format!("unexpected {{% {} %}}", tag.keyword),
                            tag.position,
                        ));
                    }
                    other => {
                        return Err(StencilError::syntax(
                            format!("unknown tag {{% {} %}}", other),
                            tag.position,
                        ));
                    }
                },
            }
        }

        Ok((nodes, None))
    }

    fn parse_for(&mut self, open: Tag<'s>) -> Result<Node> {
        let (var, path) = parse_for_header(open.rest).ok_or_else(|| {
            StencilError::syntax(
                format!(
                    "malformed for tag '{{% for {} %}}', expected 'for NAME in PATH'",
                    open.rest
                ),
                open.position,
            )
        })?;

        let (body, end) = self.parse_until(&["endfor"])?;
        if end.is_none() {
            return Err(StencilError::syntax(
                "unclosed {% for %} block",
                open.position,
            ));
        }

        Ok(Node::For {
            var: var.to_string(),
            path: path.to_string(),
            body,
        })
    }

    fn parse_if(&mut self, open: Tag<'s>) -> Result<Node> {
        if open.rest.is_empty() {
            return Err(StencilError::syntax("if tag without a condition", open.position));
        }

        let mut branches = Vec::new();
        let mut condition = open.rest.to_string();
        loop {
            let (body, end) = self.parse_until(&["elif", "else", "endif"])?;
            branches.push((condition, body));
            let Some(end) = end else {
                return Err(StencilError::syntax("unclosed {% if %} block", open.position));
            };

            match end.keyword {
                "elif" => {
                    if end.rest.is_empty() {
                        return Err(StencilError::syntax(
                            "elif tag without a condition",
                            end.position,
                        ));
                    }
                    condition = end.rest.to_string();
                }
                "else" => {
                    let (otherwise, close) = self.parse_until(&["endif"])?;
                    if close.is_none() {
                        return Err(StencilError::syntax(
                            "unclosed {% if %} block",
                            open.position,
                        ));
                    }
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                }
                _ => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
            }
        }
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(prev)) = nodes.last_mut() {
        prev.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// Split `NAME in PATH`, where NAME is an identifier and PATH a dotted path
/// of identifiers.
fn parse_for_header(header: &str) -> Option<(&str, &str)> {
    let mut words = header.split_whitespace();
    let (var, keyword, path) = (words.next()?, words.next()?, words.next()?);
    if keyword != "in" || words.next().is_some() {
        return None;
    }
    let is_ident = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    (is_ident(var) && path.split('.').all(is_ident)).then_some((var, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterDefaults;
    use serde_json::json;

    fn render_json(source: &str, context: serde_json::Value) -> Result<String> {
        let ctx = Context::from_json(context).unwrap();
        let filters = FilterRegistry::with_builtins(&FilterDefaults::default());
        render(source, &ctx, &filters)
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = "No tags here. { single braces } and % signs.";
        assert_eq!(render_json(text, json!({})).unwrap(), text);
    }

    #[test]
    fn test_interpolation_with_filters() {
        let out = render_json(
            "Hi {{ user.name | title }}, you owe {{ price | currency }}.",
            json!({"user": {"name": "ann lee"}, "price": 19.5}),
        )
        .unwrap();
        assert_eq!(out, "Hi Ann Lee, you owe $19.50.");
    }

    #[test]
    fn test_interpolation_is_not_escaped() {
        let out = render_json("{{ html }}", json!({"html": "<b>x</b>"})).unwrap();
        assert_eq!(out, "<b>x</b>");
    }

    #[test]
    fn test_for_loop_with_metadata() {
        let out = render_json(
            "{% for item in items %}{{ loop.index }}/{{ loop.length }}:{{ item }}{% if loop.last %}.{% else %}, {% endif %}{% endfor %}",
            json!({"items": ["a", "b", "c"]}),
        )
        .unwrap();
        assert_eq!(out, "1/3:a, 2/3:b, 3/3:c.");
    }

    #[test]
    fn test_loop_first_and_index0() {
        let out = render_json(
            "{% for x in xs %}{% if loop.first %}[{% endif %}{{ loop.index0 }}{% endfor %}]",
            json!({"xs": [7, 8]}),
        )
        .unwrap();
        assert_eq!(out, "[01]");
    }

    #[test]
    fn test_empty_and_missing_sequences_render_nothing() {
        let tpl = "before{% for x in items %}<{{ x }}>{% endfor %}after";
        assert_eq!(render_json(tpl, json!({"items": []})).unwrap(), "beforeafter");
        assert_eq!(render_json(tpl, json!({})).unwrap(), "beforeafter");
        assert_eq!(render_json(tpl, json!({"items": 5})).unwrap(), "beforeafter");
        assert_eq!(render_json(tpl, json!({"items": "abc"})).unwrap(), "beforeafter");
    }

    #[test]
    fn test_for_over_nested_path_and_maps() {
        let out = render_json(
            "{% for line in order.lines %}{{ line.sku }}x{{ line.qty }};{% endfor %}",
            json!({"order": {"lines": [{"sku": "A", "qty": 2}, {"sku": "B", "qty": 1}]}}),
        )
        .unwrap();
        assert_eq!(out, "Ax2;Bx1;");

        let out = render_json(
            "{% for key in settings %}{{ key }} {% endfor %}",
            json!({"settings": {"b": 1, "a": 2}}),
        )
        .unwrap();
        assert_eq!(out, "a b ");
    }

    #[test]
    fn test_nested_loops_shadow_loop_metadata() {
        let out = render_json(
            "{% for row in rows %}{% for cell in row %}{{ loop.index }}{{ cell }} {% endfor %}| {% endfor %}",
            json!({"rows": [["a", "b"], ["c"]]}),
        )
        .unwrap();
        assert_eq!(out, "1a 2b | 1c | ");
    }

    #[test]
    fn test_loop_variable_does_not_leak() {
        let out = render_json(
            "{% for name in names %}{{ name }}{% endfor %}-{{ name }}",
            json!({"names": ["x", "y"], "name": "outer"}),
        )
        .unwrap();
        assert_eq!(out, "xy-outer");
    }

    #[test]
    fn test_if_else() {
        let tpl = "{% if verified %}Thanks!{% else %}Please verify.{% endif %}";
        assert_eq!(render_json(tpl, json!({"verified": true})).unwrap(), "Thanks!");
        assert_eq!(render_json(tpl, json!({"verified": false})).unwrap(), "Please verify.");
        assert_eq!(render_json(tpl, json!({})).unwrap(), "Please verify.");
    }

    #[test]
    fn test_if_without_else() {
        let tpl = "a{% if link %} {{ link }}{% endif %}b";
        assert_eq!(render_json(tpl, json!({"link": "L"})).unwrap(), "a Lb");
        assert_eq!(render_json(tpl, json!({"link": ""})).unwrap(), "ab");
    }

    #[test]
    fn test_elif_chain() {
        let tpl = "{% if n > 10 %}big{% elif n > 5 %}medium{% else %}small{% endif %}";
        assert_eq!(render_json(tpl, json!({"n": 11})).unwrap(), "big");
        assert_eq!(render_json(tpl, json!({"n": 7})).unwrap(), "medium");
        assert_eq!(render_json(tpl, json!({"n": 1})).unwrap(), "small");
    }

    #[test]
    fn test_nested_ifs_match_innermost_endif() {
        let tpl = "{% if a %}A{% if b %}B{% else %}b{% endif %}A{% else %}none{% endif %}";
        assert_eq!(render_json(tpl, json!({"a": true, "b": false})).unwrap(), "AbA");
        assert_eq!(render_json(tpl, json!({"a": true, "b": true})).unwrap(), "ABA");
        assert_eq!(render_json(tpl, json!({"a": false, "b": true})).unwrap(), "none");
    }

    #[test]
    fn test_for_inside_if() {
        let tpl = "{% if items %}{% for i in items %}{{ i }}{% endfor %}{% else %}empty{% endif %}";
        assert_eq!(render_json(tpl, json!({"items": [1, 2]})).unwrap(), "12");
        assert_eq!(render_json(tpl, json!({"items": ""})).unwrap(), "empty");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = render_json("{{ payload }}", json!({"payload": "{{ secret }}", "secret": "s3"}))
            .unwrap();
        assert_eq!(out, "{{ secret }}");
    }

    #[test]
    fn test_numeric_comparison_error_propagates() {
        let err = render_json("{% if name > 3 %}x{% endif %}", json!({"name": "Ann"})).unwrap_err();
        assert!(matches!(err, StencilError::NumericCoercion { .. }));
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("{% for x in xs %}never closed", "unclosed {% for %} block"),
            ("{% if a %}never closed", "unclosed {% if %} block"),
            ("stray {% endfor %}", "unexpected {% endfor %}"),
            ("{% else %}", "unexpected {% else %}"),
            ("{% include 'x' %}", "unknown tag {% include %}"),
            ("{% for x of xs %}{% endfor %}", "malformed for tag"),
            ("{% if %}{% endif %}", "if tag without a condition"),
        ];
        for (source, expected) in cases {
            match render_json(source, json!({})) {
                Err(StencilError::Syntax { message, .. }) => {
                    assert!(message.contains(expected), "{}: got '{}'", source, message)
                }
                other => panic!("{}: expected syntax error, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_syntax_error_position() {
        let err = render_json("abc{% endif %}", json!({})).unwrap_err();
        assert_eq!(
            err,
            StencilError::Syntax {
                message: "unexpected {% endif %}".to_string(),
                position: 3
            }
        );
    }

    #[test]
    fn test_unterminated_markers_stay_literal() {
        assert_eq!(render_json("a {{ b", json!({"b": 1})).unwrap(), "a {{ b");
        assert_eq!(render_json("a {% b", json!({})).unwrap(), "a {% b");
        assert_eq!(render_json("{{}} {{ x }}", json!({"x": 1})).unwrap(), "{{}} 1");
        assert_eq!(
            render_json("a {{ b {% if x %}y{% endif %}", json!({"x": true})).unwrap(),
            "a {{ b y"
        );
    }

    #[test]
    fn test_apostrophes_do_not_swallow_text() {
        let source = "{% if n == O'Brien %}x{% endif %} Bob's {% if y %}z{% endif %}";
        assert_eq!(
            render_json(source, json!({"n": "O'Brien", "y": true})).unwrap(),
            "x Bob's z"
        );
        assert_eq!(
            render_json("{{ it's }}\nwe're {{ v }}'", json!({"v": 1})).unwrap(),
            "\nwe're 1'"
        );
    }

    #[test]
    fn test_parse_builds_tree() {
        let nodes = parse("{% for x in a.b %}{{ x }}{% endfor %}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::For {
                var: "x".to_string(),
                path: "a.b".to_string(),
                body: vec![Node::Interpolation(Expression::parse("x"))],
            }]
        );
    }
}
