use crate::extract::{SpanStrategy, find_json_content, find_json_content_with_strategy};
use crate::results::JsonFinding;
use serde_json::json;

#[cfg(test)]
mod basic_tests {
    use super::*;

    #[test]
    fn test_empty_html() {
        assert!(find_json_content("").is_empty());
        assert!(find_json_content_with_strategy("", SpanStrategy::Balanced).is_empty());
    }

    #[test]
    fn test_no_braces() {
        assert!(find_json_content("<html><body><p>Hello</p></body></html>").is_empty());
    }

    #[test]
    fn test_standalone_object_in_body() {
        let html = r#"<html><body><pre>{"id": 7, "name": "widget"}</pre></body></html>"#;
        assert_eq!(
            find_json_content(html),
            vec![JsonFinding::untagged(json!({"id": 7, "name": "widget"}))]
        );
    }

    #[test]
    fn test_invalid_spans_are_dropped() {
        let html = r#"<style>p {color: red}</style><script>var x = {foo: bar};</script>"#;
        assert!(find_json_content(html).is_empty());
    }

    #[test]
    fn test_const_assignment_is_tagged() {
        let html = r#"<html><head><script>const data = {"a":1};</script></head></html>"#;
        let findings = find_json_content(html);

        // The raw scan sees the same object untagged before the script pass tags it
        assert_eq!(
            findings,
            vec![
                JsonFinding::untagged(json!({"a": 1})),
                JsonFinding::tagged("data", json!({"a": 1})),
            ]
        );
    }

    #[test]
    fn test_var_and_let_assignments() {
        let html = r#"<script>
            var first = {"n": 1};
            let second = {"n": 2};
            window.third = {"n": 3};
        </script>"#;

        let tagged = find_json_content(html)
            .into_iter()
            .filter_map(|f| f.variable)
            .collect::<Vec<_>>();
        assert_eq!(tagged, vec!["first", "second"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let html = r#"<p>{"k": 1}</p><p>{"k": 1}</p>"#;
        assert_eq!(find_json_content(html).len(), 2);
    }

    #[test]
    fn test_external_scripts_contribute_nothing() {
        let html = r#"<script src="/app.js"></script>"#;
        assert!(find_json_content(html).is_empty());
    }
}

#[cfg(test)]
mod ordering_tests {
    use super::*;

    #[test]
    fn test_document_matches_precede_script_matches() {
        let html = r#"<html><head>
            <script>const one = {"s": 1};</script>
            <script>let two = {"s": 2};</script>
        </head><body><div>{"body": true}</div></body></html>"#;

        let findings = find_json_content(html);
        assert_eq!(
            findings,
            vec![
                JsonFinding::untagged(json!({"s": 1})),
                JsonFinding::untagged(json!({"s": 2})),
                JsonFinding::untagged(json!({"body": true})),
                JsonFinding::tagged("one", json!({"s": 1})),
                JsonFinding::tagged("two", json!({"s": 2})),
            ]
        );
    }

    #[test]
    fn test_repeated_calls_match() {
        let html = r#"<script>const cfg = {"x": [1, 2]};</script><i>{"y": null}</i>"#;
        assert_eq!(find_json_content(html), find_json_content(html));
    }
}

#[cfg(test)]
mod nesting_tests {
    use super::*;

    const NESTED: &str = r#"<div>{"user": {"id": 1, "roles": ["admin"]}}</div>"#;

    #[test]
    fn test_non_greedy_drops_nested_objects() {
        // The shortest span stops at the inner brace and is not valid JSON
        assert!(find_json_content(NESTED).is_empty());
    }

    #[test]
    fn test_balanced_recovers_nested_objects() {
        assert_eq!(
            find_json_content_with_strategy(NESTED, SpanStrategy::Balanced),
            vec![JsonFinding::untagged(
                json!({"user": {"id": 1, "roles": ["admin"]}})
            )]
        );
    }

    #[test]
    fn test_balanced_descends_into_invalid_outer_span() {
        let html = r#"<script>function init() { return {"ok": true}; }</script>"#;
        assert_eq!(
            find_json_content_with_strategy(html, SpanStrategy::Balanced),
            vec![JsonFinding::untagged(json!({"ok": true}))]
        );
    }

    #[test]
    fn test_nested_assignment_is_tagged_by_both_strategies() {
        let html = r#"<script>const state = {"page": {"n": 2}};</script>"#;
        let expected = JsonFinding::tagged("state", json!({"page": {"n": 2}}));

        assert!(find_json_content(html).contains(&expected));
        assert!(find_json_content_with_strategy(html, SpanStrategy::Balanced).contains(&expected));
    }

    #[test]
    fn test_balanced_assignment_without_semicolon() {
        let html = "<script>var opts = {\"a\": {\"b\": 1}}\nrun(opts)</script>";
        let findings = find_json_content_with_strategy(html, SpanStrategy::Balanced);
        assert!(findings.contains(&JsonFinding::tagged("opts", json!({"a": {"b": 1}}))));

        // The non-greedy assignment pattern requires the closing `};`
        assert!(
            find_json_content(html)
                .iter()
                .all(|f| f.variable.is_none())
        );
    }

    #[test]
    fn test_balanced_survives_deep_nesting() {
        let depth = 20_000;
        let html = format!("<div>{}x{}</div>", "{".repeat(depth), "}".repeat(depth));
        assert!(find_json_content_with_strategy(&html, SpanStrategy::Balanced).is_empty());
    }

    #[test]
    fn test_balanced_keeps_deepest_decodable_object() {
        let depth = 200;
        let html = format!("<div>{}1{}</div>", r#"{"a": "#.repeat(depth), "}".repeat(depth));
        let findings = find_json_content_with_strategy(&html, SpanStrategy::Balanced);

        // Only one object fits under the decoder's nesting limit; its contents are not repeated
        assert_eq!(findings.len(), 1);
        assert!(findings[0].value.is_object());
    }

    #[test]
    fn test_balanced_with_many_unclosed_braces() {
        let html = format!(r#"<div>{}{{"ok": true}}</div>"#, "{".repeat(50_000));
        assert_eq!(
            find_json_content_with_strategy(&html, SpanStrategy::Balanced),
            vec![JsonFinding::untagged(json!({"ok": true}))]
        );
    }
}
