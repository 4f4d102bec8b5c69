use url::Url;

/// Convert a URL path segment to a sanitized filename
pub fn sanitize_filename(name: &str) -> String {
    let mut name = name.replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_");
    name = name.trim_matches('.').to_string();

    // Limit filename length
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}

/// Returns at most `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The scheme-and-host origin of a URL, with a trailing slash
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Some(format!("{}/", origin.ascii_serialization())),
        url::Origin::Opaque(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("app.js"), "app.js");
        assert_eq!(sanitize_filename("a:b?c"), "a_b_c");
        assert_eq!(sanitize_filename("..hidden"), "hidden");
        assert_eq!(sanitize_filename(&"n".repeat(150)).len(), 100);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://example.com/login?next=1").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            origin_of("http://localhost:8080/x").as_deref(),
            Some("http://localhost:8080/")
        );
        assert_eq!(origin_of("not a url"), None);
        assert_eq!(origin_of("data:text/plain,hi"), None);
    }
}
