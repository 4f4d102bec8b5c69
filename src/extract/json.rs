use crate::extract::{SpanStrategy, inline_scripts, spans};
use crate::results::JsonFinding;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Any `{...}` run, shortest first
static INLINE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\{[\s\S]*?\})").expect("static regex is valid"));

/// `var|let|const <name> = {...};`
static OBJECT_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:var|let|const)\s+(\w+)\s*=\s*(\{[\s\S]*?\});").expect("static regex is valid")
});

/// `serde_json` rejects anything nested deeper than this
const MAX_DECODE_DEPTH: usize = 128;

/// Declaration prefix up to and including the opening brace
static ASSIGNMENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:var|let|const)\s+(\w+)\s*=\s*\{").expect("static regex is valid")
});

/// Extracts JSON values embedded in a page using the default span strategy
///
/// Document-wide matches come first (untagged), followed by object literals
/// assigned to script variables (tagged with the variable name).
pub fn find_json_content(html: &str) -> Vec<JsonFinding> {
    find_json_content_with_strategy(html, SpanStrategy::default())
}

/// Extracts JSON values embedded in a page with a specific span strategy
pub fn find_json_content_with_strategy(html: &str, strategy: SpanStrategy) -> Vec<JsonFinding> {
    if html.is_empty() {
        return Vec::new();
    }

    let mut findings = inline_objects(html, strategy)
        .into_iter()
        .map(JsonFinding::untagged)
        .collect::<Vec<_>>();

    for script in inline_scripts(html) {
        findings.extend(script_assignments(&script, strategy));
    }

    ::log::debug!(
        "JSON scan ({}) found {} values",
        strategy.as_str(),
        findings.len()
    );
    findings
}

/// Decodes every candidate span of the raw text that is strict JSON
pub fn inline_objects(text: &str, strategy: SpanStrategy) -> Vec<Value> {
    match strategy {
        SpanStrategy::NonGreedy => INLINE_OBJECT
            .captures_iter(text)
            .filter_map(|caps| decode(&caps[1]))
            .collect(),
        SpanStrategy::Balanced => {
            let mut values = Vec::new();
            collect_balanced(text, &mut values);
            values
        }
    }
}

/// Finds `var|let|const name = {...};` assignments whose right side is strict JSON
pub fn script_assignments(script: &str, strategy: SpanStrategy) -> Vec<JsonFinding> {
    match strategy {
        SpanStrategy::NonGreedy => OBJECT_ASSIGNMENT
            .captures_iter(script)
            .filter_map(|caps| decode(&caps[2]).map(|value| JsonFinding::tagged(&caps[1], value)))
            .collect(),
        SpanStrategy::Balanced => {
            let pairs = spans::brace_pairs(script);
            ASSIGNMENT_PREFIX
                .captures_iter(script)
                .filter_map(|caps| {
                    let open = caps.get(0)?.end() - 1;
                    let index = pairs.binary_search_by_key(&open, |p| p.range.start).ok()?;
                    decode_pair(script, &pairs[index])
                        .map(|value| JsonFinding::tagged(&caps[1], value))
                })
                .collect()
        }
    }
}

// Outermost pairs first; a pair that fails to decode gives way to the pairs
// inside it, and a pair that decodes hides everything it contains
fn collect_balanced(text: &str, values: &mut Vec<Value>) {
    let mut covered_until = 0;
    for pair in spans::brace_pairs(text) {
        if pair.range.start < covered_until {
            continue;
        }
        if let Some(value) = decode_pair(text, &pair) {
            covered_until = pair.range.end;
            values.push(value);
        }
    }
}

fn decode_pair(text: &str, pair: &spans::BracePair) -> Option<Value> {
    if pair.height > MAX_DECODE_DEPTH {
        return None;
    }
    decode(&text[pair.range.clone()])
}

// Strict decode; failures are expected and dropped silently
fn decode(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate).ok()
}
