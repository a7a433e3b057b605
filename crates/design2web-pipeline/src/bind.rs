//! Image binder
//!
//! Pairs the i-th `<img>` tag of the generated HTML with the i-th bounding
//! box (insertion order) and points the tag at the box's uploaded asset.
//!
//! Pairing is positional. A box without an asset still occupies its slot:
//! its tag is left alone and later boxes keep their own indices.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{bindable, BoundingBox};

pub(crate) static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid regex"));

pub(crate) static SRC_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("src"));
static ALT_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("alt"));
static STYLE_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("style"));
static WIDTH_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("width"));
static HEIGHT_ATTR: Lazy<Regex> = Lazy::new(|| attribute_pattern("height"));

fn attribute_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)\s{name}\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)"#
    ))
    .expect("valid regex")
}

/// Rewrite `<img>` tags in `html` to reference the boxes' uploaded assets.
pub fn bind(html: &str, boxes: &[BoundingBox]) -> String {
    let boxes: Vec<&BoundingBox> = bindable(boxes).collect();
    if boxes.is_empty() {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for (index, tag) in IMG_TAG.find_iter(html).enumerate() {
        let Some(bbox) = boxes.get(index) else {
            break;
        };
        let Some(asset) = &bbox.uploaded_asset else {
            continue;
        };
        out.push_str(&html[last..tag.start()]);
        out.push_str(&rewrite_tag(tag.as_str(), &asset.url, bbox));
        last = tag.end();
    }
    out.push_str(&html[last..]);
    out
}

fn rewrite_tag(tag: &str, src: &str, bbox: &BoundingBox) -> String {
    let style = format!(
        "width: {}px; height: {}px; object-fit: cover;",
        bbox.width.round() as i64,
        bbox.height.round() as i64
    );
    let tag = WIDTH_ATTR.replace_all(tag, "");
    let tag = HEIGHT_ATTR.replace_all(&tag, "");
    let tag = set_attribute(&tag, &SRC_ATTR, "src", src);
    let tag = set_attribute(&tag, &STYLE_ATTR, "style", &style);
    set_attribute(&tag, &ALT_ATTR, "alt", &bbox.label)
}

/// Replace an attribute in place, or append it before the tag end.
pub(crate) fn set_attribute(tag: &str, pattern: &Regex, name: &str, value: &str) -> String {
    let attr = format!(" {}=\"{}\"", name, escape_attribute(value));
    if let Some(existing) = pattern.find(tag) {
        return format!("{}{}{}", &tag[..existing.start()], attr, &tag[existing.end()..]);
    }
    let body_end = tag
        .strip_suffix("/>")
        .or_else(|| tag.strip_suffix('>'))
        .unwrap_or(tag)
        .trim_end()
        .len();
    format!("{}{}{}", &tag[..body_end], attr, &tag[body_end..])
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
