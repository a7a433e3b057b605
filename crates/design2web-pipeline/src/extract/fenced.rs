//! Fenced-block stage: Markdown ```html / ```css / ```javascript blocks,
//! followed by lifting `<style>`/`<script>` out of the HTML when the
//! response carried no separate CSS or JS.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ExtractionResult;

static HTML_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```html\b([\s\S]*?)```").expect("valid regex"));
static CSS_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```css\b([\s\S]*?)```").expect("valid regex"));
static JS_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:javascript|js)\b([\s\S]*?)```").expect("valid regex"));

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").expect("valid regex"));
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid regex"));

pub(super) fn extract(raw: &str) -> Option<ExtractionResult> {
    let result = ExtractionResult {
        html: fenced(&HTML_FENCE, raw),
        css: fenced(&CSS_FENCE, raw),
        js: fenced(&JS_FENCE, raw),
    };
    if result.is_empty() {
        return None;
    }
    Some(lift_embedded(result))
}

fn fenced(pattern: &Regex, raw: &str) -> String {
    pattern
        .captures(raw)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

/// Move inline `<style>` and `<script>` bodies out of the HTML into empty
/// CSS/JS fields. Scripts with a `src` attribute stay where they are.
pub(crate) fn lift_embedded(mut result: ExtractionResult) -> ExtractionResult {
    if result.html.is_empty() {
        return result;
    }

    if result.css.trim().is_empty() {
        let bodies: Vec<String> = STYLE_BLOCK
            .captures_iter(&result.html)
            .map(|c| c[1].trim().to_string())
            .filter(|body| !body.is_empty())
            .collect();
        if !bodies.is_empty() {
            result.css = bodies.join("\n");
            result.html = STYLE_BLOCK.replace_all(&result.html, "").into_owned();
        }
    }

    if result.js.trim().is_empty() {
        let mut bodies = Vec::new();
        let html = SCRIPT_BLOCK
            .replace_all(&result.html, |c: &regex::Captures| {
                let external = c[1].to_ascii_lowercase().contains("src");
                let body = c[2].trim();
                if external || body.is_empty() {
                    c[0].to_string()
                } else {
                    bodies.push(body.to_string());
                    String::new()
                }
            })
            .into_owned();
        if !bodies.is_empty() {
            result.js = bodies.join("\n");
            result.html = html;
        }
    }

    result.html = result.html.trim().to_string();
    result
}
