use std::ops::Range;

/// A matched `{...}` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracePair {
    /// Byte range from the opening brace through the closing one
    pub range: Range<usize>,

    /// Deepest brace nesting inside the pair, counting the pair itself
    pub height: usize,
}

/// Finds every matched `{...}` pair in `text`, ordered by opening brace.
///
/// One left-to-right pass with a stack of open braces. Inside a brace,
/// double-quoted strings are skipped; a string also ends at a line break, so a
/// stray quote in script code cannot swallow the rest of the page. Opening
/// braces that are never closed are dropped without affecting the pairs
/// inside them, and a `}` with nothing open is ignored.
pub fn brace_pairs(text: &str) -> Vec<BracePair> {
    let mut pairs = Vec::new();
    // (offset of `{`, tallest pair closed directly inside it)
    let mut open: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' || b == b'\n' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push((i, 0)),
            b'}' => {
                let Some((start, inner)) = open.pop() else {
                    continue;
                };
                let height = inner + 1;
                if let Some(parent) = open.last_mut() {
                    parent.1 = parent.1.max(height);
                }
                pairs.push(BracePair {
                    range: start..i + 1,
                    height,
                });
            }
            _ => {}
        }
    }

    pairs.sort_unstable_by_key(|p| p.range.start);
    pairs
}

/// Finds the outermost balanced `{...}` spans in `text`.
///
/// Braces inside double-quoted strings are ignored. An opening brace with no
/// matching close is skipped, so objects that follow or sit inside a stray `{`
/// are still found.
pub fn balanced_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = Vec::new();
    for pair in brace_pairs(text) {
        if spans.last().is_some_and(|last| pair.range.start < last.end) {
            continue;
        }
        spans.push(pair.range);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(text: &str) -> Vec<&str> {
        balanced_spans(text)
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    #[test]
    fn test_nested_object_is_one_span() {
        let text = r#"x = {"a": {"b": 1}} and {"c": 2}"#;
        assert_eq!(spans_of(text), vec![r#"{"a": {"b": 1}}"#, r#"{"c": 2}"#]);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"{"pattern": "}{", "n": 1}"#;
        assert_eq!(spans_of(text), vec![text]);
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let text = r#"{"q": "say \"}\" now"}"#;
        assert_eq!(spans_of(text), vec![text]);
    }

    #[test]
    fn test_unclosed_brace_is_skipped() {
        let text = r#"function f() { if (x) {"ok": true}"#;
        assert_eq!(spans_of(text), vec![r#"{"ok": true}"#]);
    }

    #[test]
    fn test_no_braces() {
        assert!(balanced_spans("plain text").is_empty());
        assert!(balanced_spans("").is_empty());
    }

    #[test]
    fn test_pair_heights() {
        let text = r#"{"a": {"b": {}}, "c": {}}"#;
        let heights = brace_pairs(text)
            .into_iter()
            .map(|p| (&text[p.range], p.height))
            .collect::<Vec<_>>();
        assert_eq!(
            heights,
            vec![
                (text, 3),
                (r#"{"b": {}}"#, 2),
                ("{}", 1),
                ("{}", 1),
            ]
        );
    }

    #[test]
    fn test_deep_nesting_is_one_span() {
        let depth = 50_000;
        let text = format!("{}x{}", "{".repeat(depth), "}".repeat(depth));
        let pairs = brace_pairs(&text);
        assert_eq!(pairs.len(), depth);
        assert_eq!(pairs[0].height, depth);
        assert_eq!(balanced_spans(&text), vec![0..text.len()]);
    }

    #[test]
    fn test_long_run_of_unclosed_braces() {
        let text = format!("{}{{\"ok\": 1}}", "{".repeat(100_000));
        assert_eq!(spans_of(&text), vec![r#"{"ok": 1}"#]);
    }

    #[test]
    fn test_unmatched_close_is_ignored() {
        assert_eq!(spans_of(r#"} {"a": 1} }"#), vec![r#"{"a": 1}"#]);
    }

    #[test]
    fn test_unterminated_string_ends_at_line_break() {
        let text = "{ say(\"oops);\n} {\"b\": 2}";
        assert_eq!(spans_of(text), vec!["{ say(\"oops);\n}", "{\"b\": 2}"]);
    }
}
