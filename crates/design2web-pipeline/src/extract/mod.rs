//! Response extractor
//!
//! Recovers an `{html, css, js}` triple from free-form model output. The
//! model is asked for JSON but does not reliably produce it, so recovery is
//! an ordered cascade of independent stages, from most structured to most
//! permissive. The first stage that yields any non-empty field wins.
//!
//! Stages never fail loudly: each returns `None` when it cannot help.

mod fenced;
mod json;
mod keyed;
mod sniff;

use crate::types::ExtractionResult;

/// A single recovery strategy
pub type Stage = fn(&str) -> Option<ExtractionResult>;

/// Stages in the order they are attempted
pub const CASCADE: &[(&str, Stage)] = &[
    ("direct-json", json::direct),
    ("repaired-json", json::repaired),
    ("keyed-fields", keyed::extract),
    ("fenced-blocks", fenced::extract),
    ("pattern-sniff", sniff::extract),
];

/// Recover code from raw model output.
///
/// Returns `None` when no stage recovers anything, which callers report as
/// "no valid code produced". A `Some` result may still have an empty
/// `html` field; see [`ExtractionResult::is_acceptable`].
pub fn extract(raw: &str) -> Option<ExtractionResult> {
    for (name, stage) in CASCADE {
        if let Some(result) = stage(raw).filter(|r| !r.is_empty()) {
            log::debug!(
                "Extracted code via {} (html={}B css={}B js={}B)",
                name,
                result.html.len(),
                result.css.len(),
                result.js.len()
            );
            return Some(result);
        }
    }

    log::warn!("No code recovered from response ({} bytes)", raw.len());
    None
}

/// Undo string escaping left behind by a model that emitted JSON-ish text.
///
/// Handles `\n`, `\t`, `\r`, `\"`, `\/` and `\\`; any other escape is kept
/// verbatim.
pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Strip a pair of quotes wrapping an entire field value.
///
/// Over-escaped responses sometimes encode a field as `"\"<div>...\""`,
/// which decodes to a string that still carries its own quotes.
pub(crate) fn strip_wrapping_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\\\"", "\"")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_json_is_exact() {
        let raw = r##"{"html": "<main>\n  <h1 class=\"title\">Hello</h1>\n</main>", "css": ".title { color: #222; }", "js": "console.log(\"ready\");"}"##;
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<main>\n  <h1 class=\"title\">Hello</h1>\n</main>");
        assert_eq!(result.css, ".title { color: #222; }");
        assert_eq!(result.js, "console.log(\"ready\");");
    }

    #[test]
    fn test_fenced_json_matches_unwrapped() {
        let body = r##"{"html": "<p>Hi</p>", "css": "p { margin: 0; }", "js": ""}"##;
        let fenced = format!("Sure! Here is the code:\n```json\n{}\n```\nEnjoy.", body);
        assert_eq!(extract(&fenced), extract(body));
        assert_eq!(extract(body).unwrap().html, "<p>Hi</p>");
    }

    #[test]
    fn test_fenced_blocks_only() {
        let raw = "Here you go:\n```html\n<div class=\"card\">Hi</div>\n```\n\n```css\n.card { padding: 8px; }\n```\n\n```javascript\nconst card = document.querySelector('.card');\n```\n";
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<div class=\"card\">Hi</div>");
        assert_eq!(result.css, ".card { padding: 8px; }");
        assert_eq!(result.js, "const card = document.querySelector('.card');");
    }

    #[test]
    fn test_plain_prose_is_none() {
        assert!(extract("I'm sorry, I cannot help with that request right now.").is_none());
        assert!(extract("").is_none());
    }

    #[test]
    fn test_arrays_are_joined_with_newlines() {
        let raw = r##"{"html": ["<header>", "</header>"], "css": ["a {}", "b {}"], "js": []}"##;
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<header>\n</header>");
        assert_eq!(result.css, "a {}\nb {}");
        assert_eq!(result.js, "");
    }

    #[test]
    fn test_over_escaped_value_is_unwrapped() {
        let raw = r##"{"html": "\"<a href=\\\"/\\\">Home</a>\"", "css": "", "js": ""}"##;
        let result = extract(raw).unwrap();
        assert_eq!(result.html, "<a href=\"/\">Home</a>");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\nb\"c\\d\q"#), "a\nb\"c\\d\\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
