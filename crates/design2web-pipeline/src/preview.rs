//! Live preview renderer
//!
//! Builds a standalone document from a snapshot: responsive reset, the
//! snapshot's CSS, its body content and its JS, plus a small script that
//! marks broken images. The document is meant to be shown in an iframe
//! sandboxed with `allow-scripts` only, so generated code can run but gets
//! an opaque origin and cannot reach the host page.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bind::bind;
use crate::constants::{bundle, document};
use crate::types::{BoundingBox, CodeSnapshot};

/// iframe `sandbox` tokens
pub const SANDBOX_POLICY: &str = "allow-scripts";

static BODY_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body(?:\s[^>]*)?>(.*)</body\s*>").expect("valid regex"));
static BUNDLE_SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?is)<script[^>]*src\s*=\s*["']{}["'][^>]*>\s*</script\s*>\s*"#,
        regex::escape(bundle::SCRIPT)
    ))
    .expect("valid regex")
});
static CLOSING_SCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</script").expect("valid regex"));
static CLOSING_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</style").expect("valid regex"));

const RESET_CSS: &str = r#"*, *::before, *::after { box-sizing: border-box; }
html, body { margin: 0; padding: 0; }
body {
  font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif;
  line-height: 1.5;
  -webkit-font-smoothing: antialiased;
  overflow-x: hidden;
}
img, video, svg, canvas { max-width: 100%; height: auto; display: block; }
iframe { max-width: 100%; border: 0; }
table { width: 100%; border-collapse: collapse; }
.container { width: 100%; max-width: 1200px; margin: 0 auto; padding: 0 16px; }
@media (max-width: 768px) {
  .container { padding: 0 12px; }
  table { display: block; overflow-x: auto; }
}"#;

const IMAGE_DIAGNOSTICS_JS: &str = r#"document.addEventListener('DOMContentLoaded', function () {
  function markBroken(img) {
    img.style.border = '2px dashed #e53e3e';
    img.style.background = '#fee';
    img.style.padding = '8px';
    img.alt = 'Failed to load image';
  }
  document.querySelectorAll('img').forEach(function (img) {
    img.addEventListener('error', function () { markBroken(img); });
    if (img.complete && img.naturalWidth === 0 && img.getAttribute('src')) {
      markBroken(img);
    }
  });
});"#;

/// A rendered preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    /// Complete HTML for the sandboxed frame
    pub document: String,
}

impl PreviewDocument {
    /// Host markup embedding the document in a sandboxed iframe via `srcdoc`
    pub fn iframe_host(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{title} preview</title>\n<style>html,body{{margin:0;height:100%}}iframe{{border:0;width:100%;height:100%}}</style>\n</head>\n<body>\n<iframe sandbox=\"{sandbox}\" title=\"{title} preview\" srcdoc=\"{srcdoc}\"></iframe>\n</body>\n</html>",
            lang = document::LANG,
            title = document::TITLE,
            sandbox = SANDBOX_POLICY,
            srcdoc = escape_srcdoc(&self.document),
        )
    }

    /// CSP header value that applies the same sandbox when the document is
    /// served directly
    pub fn content_security_policy() -> String {
        format!("sandbox {}", SANDBOX_POLICY)
    }
}

/// Compose the preview document for `snapshot`.
///
/// Image tags are bound again against `boxes` so assets attached after the
/// snapshot was generated still show up.
pub fn render(snapshot: &CodeSnapshot, boxes: &[BoundingBox]) -> PreviewDocument {
    let html = bind(&snapshot.html, boxes);
    let body = BODY_CONTENT
        .captures(&html)
        .and_then(|c| c.get(1))
        .map_or(html.as_str(), |m| m.as_str());
    let body = BUNDLE_SCRIPT_TAG.replace_all(body, "");

    let css = CLOSING_STYLE.replace_all(&snapshot.css, "<\\/style");
    let js = CLOSING_SCRIPT.replace_all(&snapshot.js, "<\\/script");

    let document = format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n<style>\n{reset}\n</style>\n<style>\n{css}\n</style>\n</head>\n<body>\n{body}\n<script>\n{diagnostics}\n</script>\n<script>\n{js}\n</script>\n</body>\n</html>",
        lang = document::LANG,
        reset = RESET_CSS,
        css = css,
        body = body.trim(),
        diagnostics = IMAGE_DIAGNOSTICS_JS,
        js = js,
    );
    PreviewDocument { document }
}

fn escape_srcdoc(document: &str) -> String {
    document.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::types::AssetRef;

    #[test]
    fn test_uses_body_content_only() {
        let snapshot = normalize(&CodeSnapshot::new(
            "<h1>Title</h1>",
            "h1 { color: red; }",
            "console.log('hi');",
        ));
        let preview = render(&snapshot, &[]);
        let doc = &preview.document;

        assert!(doc.contains("<h1>Title</h1>"));
        assert!(doc.contains("h1 { color: red; }"));
        assert!(doc.contains("console.log('hi');"));
        assert!(doc.contains("box-sizing: border-box"));
        assert!(doc.contains("Failed to load image"));
        assert!(!doc.contains("<title>Design to Web</title>"));
        assert!(!doc.contains("src=\"script.js\""));
        assert_eq!(doc.matches("<body>").count(), 1);
    }

    #[test]
    fn test_fragment_without_body_is_used_whole() {
        let preview = render(&CodeSnapshot::new("<p>loose</p>", "", ""), &[]);
        assert!(preview.document.contains("<body>\n<p>loose</p>\n"));
    }

    #[test]
    fn test_script_cannot_close_its_block() {
        let preview = render(&CodeSnapshot::new("<p>x</p>", "", "var s = '</script>';"), &[]);
        assert!(preview.document.contains("var s = '<\\/script>';"));
    }

    #[test]
    fn test_binds_late_assets() {
        let boxes = vec![BoundingBox {
            id: "b".into(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            label: "Image 1".into(),
            filename: Some("a.png".into()),
            uploaded_asset: Some(AssetRef {
                id: "a".into(),
                url: "/api/assets/a".into(),
            }),
        }];
        let preview = render(&CodeSnapshot::new("<img src=\"x.jpg\">", "", ""), &boxes);
        assert!(preview.document.contains("src=\"/api/assets/a\""));
    }

    #[test]
    fn test_iframe_host_is_sandboxed() {
        let preview = render(&CodeSnapshot::new("<p class=\"a\">&</p>", "", ""), &[]);
        let host = preview.iframe_host();
        assert!(host.contains("sandbox=\"allow-scripts\""));
        assert!(!host.contains("allow-same-origin"));
        assert!(host.contains("<p class=&quot;a&quot;>&amp;</p>"));
        assert_eq!(PreviewDocument::content_security_policy(), "sandbox allow-scripts");
    }
}
