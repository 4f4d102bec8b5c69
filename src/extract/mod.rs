pub mod endpoints;
pub mod json;
pub mod spans;

#[cfg(test)]
mod tests;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

pub use endpoints::{EndpointPattern, endpoint_patterns, find_js_endpoints, normalize_endpoint};
pub use json::{find_json_content, find_json_content_with_strategy};

/// How candidate object spans are located in raw page text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanStrategy {
    /// Non-greedy `{...}` matching; nested objects come out truncated and are dropped
    #[default]
    NonGreedy,
    /// Depth-tracking scanner that yields whole outermost objects
    Balanced,
}

impl SpanStrategy {
    /// Returns the strategy's configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanStrategy::NonGreedy => "non-greedy",
            SpanStrategy::Balanced => "balanced",
        }
    }
}

/// Collects the inline text of every `<script>` element in document order.
///
/// Scripts that only reference an external `src` have no text and are skipped.
pub fn inline_scripts(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let script_selector = Selector::parse("script").expect("static selector is valid");

    let scripts = doc
        .select(&script_selector)
        .map(|e| e.text().collect::<String>())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>();

    ::log::trace!("Found {} inline scripts", scripts.len());
    scripts
}
