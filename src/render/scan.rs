//! Delimiter scanning shared by both template grammars.

/// Openers that cannot appear inside a quoted argument of a single tag.
const OPENERS: [&str; 2] = ["{{", "{%"];

/// Find `needle` at or after `from`, skipping over quoted runs.
///
/// A quoted run ends the tag's quote handling when it reaches a newline or
/// another tag opener before its closing quote. The search then falls back
/// to the first plain occurrence of `needle`, so an apostrophe in a comment
/// or a bare word never reaches into later text.
pub(crate) fn find_close(source: &str, from: usize, needle: &str) -> Option<usize> {
    let haystack = &source[from..];
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in haystack.char_indices() {
        if let Some(q) = quote {
            if c == '\n' || OPENERS.iter().any(|o| haystack[i..].starts_with(o)) {
                break;
            }
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if haystack[i..].starts_with(needle) {
            return Some(from + i);
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
    }

    haystack.find(needle).map(|i| from + i)
}

/// Position of the earliest of `needles` at or after `from`, with the needle
/// that matched.
pub(crate) fn find_first<'n>(
    source: &str,
    from: usize,
    needles: &[&'n str],
) -> Option<(usize, &'n str)> {
    needles
        .iter()
        .filter_map(|needle| source[from..].find(needle).map(|i| (from + i, *needle)))
        .min_by_key(|(pos, _)| *pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_close_skips_quotes() {
        let src = "{{ x | default('}}') }} tail";
        assert_eq!(find_close(src, 2, "}}"), Some(21));
    }

    #[test]
    fn test_find_close_unbalanced_quote_falls_back() {
        let src = "{{ it's }} after";
        assert_eq!(find_close(src, 2, "}}"), Some(8));
    }

    #[test]
    fn test_find_close_quote_does_not_cross_later_tags() {
        let src = "{{! don't }}b {{name}}'s c";
        assert_eq!(find_close(src, 2, "}}"), Some(10));

        let src = "{% if n == O'Brien %}x{% endif %} Bob's";
        assert_eq!(find_close(src, 2, "%}"), Some(19));
    }

    #[test]
    fn test_find_close_quote_stops_at_newline() {
        let src = "{{ it's }}\nand more' }}";
        assert_eq!(find_close(src, 2, "}}"), Some(8));
    }

    #[test]
    fn test_find_first_picks_earliest() {
        let src = "a {% b %} {{ c }}";
        assert_eq!(find_first(src, 0, &["{{", "{%"]), Some((2, "{%")));
        assert_eq!(find_first(src, 5, &["{{", "{%"]), Some((10, "{{")));
        assert_eq!(find_first(src, 12, &["{{", "{%"]), None);
    }
}
