//! Document normalizer
//!
//! Makes a snapshot's HTML a complete, linkable document: a head with
//! charset/viewport/title, a link to `style.css`, and a `script.js` tag when
//! there is script to run. Every step is guarded by a presence check, so
//! normalizing twice is the same as normalizing once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{bundle, document};
use crate::types::CodeSnapshot;

static HEAD_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("valid regex"));
static BODY_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").expect("valid regex"));
static BODY_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</body\s*>").expect("valid regex"));
static HTML_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<!doctype[^>]*>|<html(?:\s[^>]*)?>|</html\s*>").expect("valid regex")
});
static STYLESHEET_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href\s*=\s*["']style\.css["']"#).expect("valid regex"));
static SCRIPT_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"src\s*=\s*["']script\.js["']"#).expect("valid regex"));

/// Complete the HTML shell of `snapshot`. CSS and JS pass through unchanged.
pub fn normalize(snapshot: &CodeSnapshot) -> CodeSnapshot {
    let mut html = snapshot.html.clone();

    if !HEAD_OPEN.is_match(&html) {
        html = wrap_in_skeleton(&html);
    }
    if !STYLESHEET_LINK.is_match(&html) {
        html = inject_stylesheet(&html);
    }
    if snapshot.has_script() && !SCRIPT_REF.is_match(&html) {
        html = inject_script(&html);
    }

    CodeSnapshot {
        html,
        css: snapshot.css.clone(),
        js: snapshot.js.clone(),
    }
}

fn head_block() -> String {
    format!(
        "<head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    <title>{}</title>\n    <link rel=\"stylesheet\" href=\"{}\">\n</head>",
        document::TITLE,
        bundle::STYLESHEET
    )
}

/// Wrap headless markup. A fragment that already has a `<body>` keeps it;
/// bare markup gets one.
fn wrap_in_skeleton(html: &str) -> String {
    let content = HTML_WRAPPER.replace_all(html, "");
    let content = content.trim();
    let body = if BODY_OPEN.is_match(content) {
        content.to_string()
    } else {
        format!("<body>\n{}\n</body>", content)
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"{}\">\n{}\n{}\n</html>",
        document::LANG,
        head_block(),
        body
    )
}

fn inject_stylesheet(html: &str) -> String {
    let link = format!("\n    <link rel=\"stylesheet\" href=\"{}\">", bundle::STYLESHEET);
    match HEAD_OPEN.find(html) {
        Some(head) => format!("{}{}{}", &html[..head.end()], link, &html[head.end()..]),
        None => html.to_string(),
    }
}

fn inject_script(html: &str) -> String {
    let tag = format!("  <script src=\"{}\"></script>\n", bundle::SCRIPT);
    match BODY_CLOSE.find_iter(html).last() {
        Some(close) => format!("{}{}{}", &html[..close.start()], tag, &html[close.start()..]),
        None => format!("{}\n{}", html, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(snapshot: CodeSnapshot) -> CodeSnapshot {
        let once = normalize(&snapshot);
        let twice = normalize(&once);
        assert_eq!(once, twice);
        once
    }

    #[test]
    fn test_full_document_with_links_is_untouched() {
        let html = "<!DOCTYPE html>\n<html>\n<head>\n<link rel=\"stylesheet\" href=\"style.css\">\n</head>\n<body>\n<p>x</p>\n<script src=\"script.js\"></script>\n</body>\n</html>";
        let out = assert_idempotent(CodeSnapshot::new(html, "p{}", "go()"));
        assert_eq!(out.html, html);
    }

    #[test]
    fn test_body_fragment_is_wrapped_once() {
        let out = assert_idempotent(CodeSnapshot::new("<body><h1>Hi</h1></body>", "", "run();"));
        assert!(out.html.starts_with("<!DOCTYPE html>"));
        assert_eq!(out.html.matches("<body>").count(), 1);
        assert!(out.html.contains("<meta charset=\"UTF-8\">"));
        assert!(out.html.contains("<title>Design to Web</title>"));
        assert!(out.html.contains("<script src=\"script.js\"></script>\n</body>"));
        assert_eq!(out.html.matches("href=\"style.css\"").count(), 1);
    }

    #[test]
    fn test_bare_text_is_wrapped() {
        let out = assert_idempotent(CodeSnapshot::new("Hello world", "", ""));
        assert!(out.html.contains("<body>\nHello world\n</body>"));
        assert!(!out.html.contains("script.js"));
    }

    #[test]
    fn test_header_element_is_not_a_head() {
        let out = normalize(&CodeSnapshot::new("<header>Top</header>", "", ""));
        assert!(out.html.contains("<head>"));
        assert!(out.html.contains("<header>Top</header>"));
    }

    #[test]
    fn test_missing_stylesheet_injected_after_head() {
        let out = assert_idempotent(CodeSnapshot::new(
            "<html><head lang=\"en\"><title>t</title></head><body></body></html>",
            "",
            "",
        ));
        assert!(out
            .html
            .contains("<head lang=\"en\">\n    <link rel=\"stylesheet\" href=\"style.css\"><title>"));
    }

    #[test]
    fn test_whitespace_js_adds_no_script() {
        let out = normalize(&CodeSnapshot::new("<p>x</p>", "", "  \n"));
        assert!(!out.html.contains("script.js"));
    }
}
