//! Built-in filters.
//!
//! | name                 | arguments                    | result                          |
//! |----------------------|------------------------------|---------------------------------|
//! | `upper`, `lower`     | -                            | case-folded text                |
//! | `title`              | -                            | each word capitalized           |
//! | `strip`, `trim`      | -                            | surrounding whitespace removed  |
//! | `escape`, `e`        | -                            | HTML-escaped text               |
//! | `default`            | fallback                     | fallback when value is falsy    |
//! | `date`, `datetime`   | optional strftime pattern    | formatted timestamp             |
//! | `currency`           | optional symbol              | `$1,234.50`                     |
//! | `number`             | -                            | thousands-grouped number        |
//! | `truncate`           | optional length, suffix      | shortened text                  |
//! | `json`               | -                            | compact JSON                    |
//! | `nl2br`              | -                            | newlines replaced with `<br>`   |
//! | `slugify`            | -                            | lowercase `a-z0-9` words joined by `-` |

use super::{FilterError, FilterRegistry, expect_args};
use crate::config::FilterDefaults;
use crate::value::Value;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid slug separator regex"));

/// Naive timestamp layouts accepted by `date`/`datetime`, tried in order
/// after RFC 3339.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

pub(super) fn register(registry: &mut FilterRegistry, defaults: &FilterDefaults) {
    registry.register("upper", text_filter("upper", |s| s.to_uppercase()));
    registry.register("lower", text_filter("lower", |s| s.to_lowercase()));
    registry.register("title", text_filter("title", title_case));
    registry.register("strip", text_filter("strip", |s| s.trim().to_string()));
    registry.register("trim", text_filter("trim", |s| s.trim().to_string()));
    registry.register("escape", text_filter("escape", escape_html));
    registry.register("e", text_filter("e", escape_html));
    registry.register("nl2br", text_filter("nl2br", |s| s.replace('\n', "<br>")));
    registry.register("slugify", text_filter("slugify", slugify));

    registry.register("default", |value, args| {
        expect_args("default", args, 1, 1, "1")?;
        if value.is_truthy() {
            Ok(value.clone())
        } else {
            Ok(args[0].clone())
        }
    });

    registry.register("date", date_filter("date", defaults.date_format.clone()));
    registry.register(
        "datetime",
        date_filter("datetime", defaults.datetime_format.clone()),
    );

    let symbol = defaults.currency_symbol.clone();
    registry.register("currency", move |value, args| {
        expect_args("currency", args, 0, 1, "0 or 1")?;
        let symbol = match args.first() {
            Some(arg) => arg.to_string(),
            None => symbol.clone(),
        };
        let amount = value
            .as_f64()
            .ok_or_else(|| FilterError::unsupported("currency", value))?;
        Ok(Value::String(format!(
            "{}{}",
            symbol,
            group_thousands(&format!("{:.2}", amount))
        )))
    });

    registry.register("number", |value, args| {
        expect_args("number", args, 0, 0, "no")?;
        let digits = match value {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    n.to_string()
                } else if let Ok(f) = s.parse::<f64>() {
                    f.to_string()
                } else {
                    return Err(FilterError::unsupported("number", value));
                }
            }
            _ => return Err(FilterError::unsupported("number", value)),
        };
        Ok(Value::String(group_thousands(&digits)))
    });

    let default_length = defaults.truncate_length;
    let default_suffix = defaults.truncate_suffix.clone();
    registry.register("truncate", move |value, args| {
        expect_args("truncate", args, 0, 2, "0 to 2")?;
        let length = match args.first() {
            None => default_length,
            Some(arg) => arg
                .as_i64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    FilterError::invalid_argument(
                        "truncate",
                        format!("length must be a non-negative integer, got '{}'", arg),
                    )
                })?,
        };
        let suffix = args
            .get(1)
            .map(Value::to_string)
            .unwrap_or_else(|| default_suffix.clone());

        let text = value.to_string();
        if text.chars().count() > length {
            let mut cut: String = text.chars().take(length).collect();
            cut.push_str(&suffix);
            Ok(Value::String(cut))
        } else {
            Ok(Value::String(text))
        }
    });

    registry.register("json", |value, args| {
        expect_args("json", args, 0, 0, "no")?;
        serde_json::to_string(&value.to_json())
            .map(Value::String)
            .map_err(|e| FilterError::invalid_argument("json", e.to_string()))
    });
}

/// Escape the five HTML-significant characters.
///
/// # Examples
///
/// ```
/// use stencil::filters::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a zero-argument string transform as a filter.
fn text_filter(
    name: &'static str,
    transform: fn(&str) -> String,
) -> impl Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static {
    move |value, args| {
        expect_args(name, args, 0, 0, "no")?;
        Ok(Value::String(transform(&value.to_string())))
    }
}

fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    SLUG_SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Insert `,` between groups of three integer digits, keeping any sign and
/// fractional part.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

enum Moment {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

fn parse_moment(value: &Value) -> Option<Moment> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(Moment::Zoned(dt));
            }
            for layout in NAIVE_LAYOUTS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
                    return Some(Moment::Naive(naive));
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Moment::Naive)
        }
        Value::Int(secs) => {
            DateTime::from_timestamp(*secs, 0).map(|dt| Moment::Zoned(dt.fixed_offset()))
        }
        _ => None,
    }
}

fn date_filter(
    name: &'static str,
    default_format: String,
) -> impl Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static {
    move |value, args| {
        expect_args(name, args, 0, 1, "0 or 1")?;
        if !value.is_truthy() {
            return Ok(Value::empty());
        }

        let format = match args.first() {
            None => default_format.as_str(),
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(FilterError::invalid_argument(
                    name,
                    format!("format must be a string, got {}", other.type_name()),
                ));
            }
        };

        let items: Vec<Item> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(FilterError::invalid_argument(
                name,
                format!("invalid format '{}'", format),
            ));
        }

        let moment = parse_moment(value).ok_or_else(|| FilterError::unsupported(name, value))?;
        let mut out = String::new();
        let written = match moment {
            Moment::Zoned(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
            Moment::Naive(naive) => write!(out, "{}", naive.format_with_items(items.iter())),
        };
        written.map_err(|_| {
            FilterError::invalid_argument(name, format!("cannot format value with '{}'", format))
        })?;
        Ok(Value::String(out))
    }
}
