use crate::extract::inline_scripts;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

/// A script pattern that yields endpoint candidates
#[derive(Debug)]
pub struct EndpointPattern {
    /// Short label used in logs
    pub name: &'static str,
    regex: Regex,
    /// Whether the candidate is capture group 1 rather than the quoted match
    pub captures_argument: bool,
}

impl EndpointPattern {
    /// Create a new pattern; panics on an invalid regex, so only use with literals
    pub fn new(name: &'static str, pattern: &str, captures_argument: bool) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("endpoint pattern should be valid"),
            captures_argument,
        }
    }

    /// Returns every candidate the pattern finds in a script body
    pub fn candidates<'a>(&'a self, script: &'a str) -> Vec<&'a str> {
        if self.captures_argument {
            self.regex
                .captures_iter(script)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .collect()
        } else {
            self.regex
                .find_iter(script)
                .map(|m| m.as_str().trim_matches(|c: char| c == '"' || c == '\''))
                .collect()
        }
    }
}

static ENDPOINT_PATTERNS: LazyLock<Vec<EndpointPattern>> = LazyLock::new(|| {
    vec![
        EndpointPattern::new("api", r#"["']/?api/[^"'\s]+["']"#, false),
        EndpointPattern::new("absolute-url", r#"["']https?://[^"'\s]+["']"#, false),
        EndpointPattern::new("script-file", r#"["']/[^\s"']+\.js["']"#, false),
        EndpointPattern::new("fetch", r#"fetch\(["']([^"']+)["']\)"#, true),
        EndpointPattern::new("axios", r#"axios\.[a-z]+\(["']([^"']+)["']\)"#, true),
    ]
});

/// The ordered list of patterns applied to every inline script
pub fn endpoint_patterns() -> &'static [EndpointPattern] {
    &ENDPOINT_PATTERNS
}

/// Finds endpoint URLs referenced from inline scripts.
///
/// Root-relative candidates are resolved against `base_url`; everything else
/// is kept as written. Each URL appears once in the result.
pub fn find_js_endpoints(html: &str, base_url: &str) -> BTreeSet<String> {
    let base = Url::parse(base_url).ok();
    if base.is_none() {
        ::log::debug!("Base URL {} is not absolute; relative endpoints stay relative", base_url);
    }

    let mut endpoints = BTreeSet::new();
    for script in inline_scripts(html) {
        for pattern in endpoint_patterns() {
            for candidate in pattern.candidates(&script) {
                let endpoint = normalize_endpoint(candidate, base.as_ref());
                ::log::trace!("Pattern {} matched {}", pattern.name, endpoint);
                endpoints.insert(endpoint);
            }
        }
    }

    ::log::debug!("Endpoint scan found {} unique URLs", endpoints.len());
    endpoints
}

/// Resolves a `/`-prefixed candidate against the base; other candidates pass through
pub fn normalize_endpoint(candidate: &str, base: Option<&Url>) -> String {
    if !candidate.starts_with('/') {
        return candidate.to_string();
    }

    match base.map(|b| b.join(candidate)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_pattern_strips_quotes() {
        let pattern = &endpoint_patterns()[0];
        assert_eq!(
            pattern.candidates(r#"var u = "/api/users"; var v = 'api/v2/x';"#),
            vec!["/api/users", "api/v2/x"]
        );
    }

    #[test]
    fn test_capturing_pattern_returns_argument() {
        let pattern = &endpoint_patterns()[3];
        assert!(pattern.captures_argument);
        assert_eq!(pattern.candidates("fetch('/data.json')"), vec!["/data.json"]);
    }

    #[test]
    fn test_axios_verb_must_be_lowercase() {
        let pattern = &endpoint_patterns()[4];
        assert_eq!(
            pattern.candidates(r#"axios.post("/save"); axios.Get("/skip")"#),
            vec!["/save"]
        );
    }

    #[test]
    fn test_normalize_endpoint() {
        let base = Url::parse("https://example.com/app/").unwrap();
        assert_eq!(
            normalize_endpoint("/api/items", Some(&base)),
            "https://example.com/api/items"
        );
        assert_eq!(normalize_endpoint("api/items", Some(&base)), "api/items");
        assert_eq!(
            normalize_endpoint("//cdn.test/lib.js", Some(&base)),
            "https://cdn.test/lib.js"
        );
        assert_eq!(normalize_endpoint("/api/items", None), "/api/items");
    }
}
