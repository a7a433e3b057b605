//! Keyed-field stage: pull each field body out with an anchored regex when
//! the surrounding object will not parse.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{strip_wrapping_quotes, unescape};
use crate::types::ExtractionResult;

static HTML_FIELD: Lazy<Regex> = Lazy::new(|| field_pattern("html", "css", "js"));
static CSS_FIELD: Lazy<Regex> = Lazy::new(|| field_pattern("css", "js", "html"));
static JS_FIELD: Lazy<Regex> = Lazy::new(|| field_pattern("js", "html", "css"));

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("valid regex"));

/// `"key": "<body>"` or `"key": [<body>]`, ending at the next sibling key or
/// the closing brace.
fn field_pattern(key: &str, sibling_a: &str, sibling_b: &str) -> Regex {
    let pattern = format!(
        r#""{key}"\s*:\s*(?:"(?P<string>[\s\S]*?)"|\[(?P<array>[\s\S]*?)\])\s*(?:,\s*"(?:{sibling_a}|{sibling_b})"\s*:|\}})"#
    );
    Regex::new(&pattern).expect("valid regex")
}

pub(super) fn extract(raw: &str) -> Option<ExtractionResult> {
    let result = ExtractionResult {
        html: capture(&HTML_FIELD, raw),
        css: capture(&CSS_FIELD, raw),
        js: capture(&JS_FIELD, raw),
    };
    (!result.is_empty()).then_some(result)
}

fn capture(pattern: &Regex, raw: &str) -> String {
    let Some(caps) = pattern.captures(raw) else {
        return String::new();
    };
    if let Some(body) = caps.name("string") {
        return strip_wrapping_quotes(&unescape(body.as_str()));
    }
    caps.name("array")
        .map(|body| join_array(body.as_str()))
        .unwrap_or_default()
}

fn join_array(body: &str) -> String {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(&format!("[{}]", body)) {
        return items.join("\n");
    }
    STRING_LITERAL
        .captures_iter(body)
        .map(|c| unescape(&c[1]))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_fields_around_broken_js() {
        let raw = r#"{"html": "<p>hi</p>", "css": "p { color: red; }", "js": "alert("hi");"}"#;
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<p>hi</p>");
        assert_eq!(result.css, "p { color: red; }");
        assert_eq!(result.js, "alert(\"hi\");");
    }

    #[test]
    fn test_unescapes_newlines_and_quotes() {
        let raw = r#"{"html": "<div class=\"a\">\n</div>", "css": "" "#;
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<div class=\"a\">\n</div>");
    }

    #[test]
    fn test_array_bodies() {
        let raw = r#"{"html": ["<ul>", "<li>a</li>", "</ul>"], "css": [".x {}", broken], "js": ""}"#;
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<ul>\n<li>a</li>\n</ul>");
        assert_eq!(result.css, ".x {}");
    }

    #[test]
    fn test_no_keys_is_none() {
        assert!(extract("just { some } braces").is_none());
    }
}
