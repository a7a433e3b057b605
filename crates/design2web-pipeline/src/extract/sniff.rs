//! Last-resort stage: isolated pattern captures over unstructured text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ExtractionResult;

static HTML_DOCUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:<!doctype html>\s*)?<html\b[\s\S]*</html\s*>").expect("valid regex")
});

static CSS_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.[A-Za-z_-][A-Za-z0-9_-]*\s*\{[^{}]*\}").expect("valid regex")
});

static JS_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfunction\b\s*[\w$]*\s*\(|\b(?:const|let|var)\s+[A-Za-z_$][\w$]*\s*=|=>")
        .expect("valid regex")
});

pub(super) fn extract(raw: &str) -> Option<ExtractionResult> {
    let (html, rest) = match HTML_DOCUMENT.find(raw) {
        Some(m) => (
            m.as_str().trim().to_string(),
            format!("{}{}", &raw[..m.start()], &raw[m.end()..]),
        ),
        None => (String::new(), raw.to_string()),
    };

    let css = CSS_RULE
        .find(&rest)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let js = JS_START
        .find(&rest)
        .map(|m| {
            let line_start = rest[..m.start()].rfind('\n').map_or(0, |i| i + 1);
            rest[line_start..].trim().to_string()
        })
        .unwrap_or_default();

    let result = ExtractionResult { html, css, js };
    (!result.is_empty()).then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniffs_html_document() {
        let raw = "The page is below.\n<!DOCTYPE html>\n<html><body><p>x</p></body></html>\nThanks.";
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<!DOCTYPE html>\n<html><body><p>x</p></body></html>");
        assert!(result.css.is_empty());
        assert!(result.js.is_empty());
    }

    #[test]
    fn test_sniffs_css_rule_and_js_span() {
        let raw = "Style it with .button { color: blue; } and then\nconst btn = document.querySelector('.button');\nbtn.focus();";
        let result = extract(raw).unwrap();
        assert_eq!(result.css, ".button { color: blue; }");
        assert_eq!(
            result.js,
            "const btn = document.querySelector('.button');\nbtn.focus();"
        );
    }

    #[test]
    fn test_prose_with_keywords_but_no_code() {
        assert!(extract("Let me know if the function of this page is clear.").is_none());
    }
}
