//! JSON stages: direct parse of the outermost brace region, and a retry
//! after textual repairs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::strip_wrapping_quotes;
use crate::types::ExtractionResult;

/// Greedy: first `{` to last `}`
static BRACE_REGION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));

static FENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?").expect("valid regex"));

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

static HTML_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("html"\s*:\s*")([\s\S]*?)("\s*,\s*"(?:css|js)"\s*:)"#).expect("valid regex")
});

static CSS_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("css"\s*:\s*")([\s\S]*?)("\s*(?:,\s*"(?:js|html)"\s*:|\}))"#)
        .expect("valid regex")
});

/// Stage 1: parse the brace region as-is
pub(super) fn direct(raw: &str) -> Option<ExtractionResult> {
    parse_fields(brace_region(raw)?)
}

/// Stage 2: repair the brace region, then parse
pub(super) fn repaired(raw: &str) -> Option<ExtractionResult> {
    let region = brace_region(raw)?;
    parse_fields(&repair(region))
}

fn brace_region(text: &str) -> Option<&str> {
    BRACE_REGION.find(text).map(|m| m.as_str())
}

/// Apply the fixed repair sequence to a candidate JSON object.
pub(super) fn repair(region: &str) -> String {
    let text = FENCE_MARKER.replace_all(region, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = TRAILING_COMMA.replace_all(&text, "$1");
    let text = HTML_VALUE.replace(&text, escape_span);
    let text = CSS_VALUE.replace(&text, escape_span);
    escape_controls_in_strings(&text)
}

fn escape_span(caps: &Captures) -> String {
    format!("{}{}{}", &caps[1], escape_bare_quotes(&caps[2]), &caps[3])
}

/// Escape every `"` not already preceded by a backslash.
fn escape_bare_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Turn raw control characters inside string literals into JSON escapes.
fn escape_controls_in_strings(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Parse an object with optional `html`/`css`/`js` string or string-array
/// fields.
fn parse_fields(candidate: &str) -> Option<ExtractionResult> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;
    let result = ExtractionResult {
        html: field(object, "html"),
        css: field(object, "css"),
        js: field(object, "js"),
    };
    (!result.is_empty()).then_some(result)
}

fn field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => strip_wrapping_quotes(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}
