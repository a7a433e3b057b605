//! Input validation and sanitization
//!
//! Everything the user sends is checked here before it can reach the
//! completion service: prompt length, image size and encoding, uploaded
//! asset type. Free text is stripped of markup that could smuggle script
//! into a prompt.

use base64::Engine;
use inference::ImageInput;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::limits::{MAX_ASSET_BYTES, MAX_IMAGE_BASE64_LEN, MAX_PROMPT_CHARS};
use crate::error::ValidationError;

static BASE64_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("valid regex"));
static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:([A-Za-z0-9.+/-]+);base64,").expect("valid regex"));

static SCRIPT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));
static IFRAME_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<iframe\b[^>]*>.*?</iframe\s*>").expect("valid regex"));
static JAVASCRIPT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));
static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bon[a-z]+\s*=").expect("valid regex"));

/// A prompt must be present and at most [`MAX_PROMPT_CHARS`] long.
pub fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    if prompt.trim().is_empty() {
        return Err(ValidationError::MissingPrompt);
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ValidationError::PromptTooLong {
            max: MAX_PROMPT_CHARS,
        });
    }
    Ok(())
}

/// Split an optional `data:<mime>;base64,` prefix off a payload.
fn split_data_url(raw: &str) -> (Option<&str>, &str) {
    match DATA_URL_PREFIX.captures(raw) {
        Some(caps) => {
            let mime = caps.get(1).map(|m| m.as_str());
            let body_start = caps.get(0).map_or(0, |m| m.end());
            (mime, &raw[body_start..])
        }
        None => (None, raw),
    }
}

/// Validate a design image given as bare base64 or a data URL.
///
/// Bare payloads are assumed to be JPEG.
pub fn parse_image(raw: &str) -> Result<ImageInput, ValidationError> {
    let (mime, body) = split_data_url(raw.trim());
    if body.len() > MAX_IMAGE_BASE64_LEN {
        return Err(ValidationError::ImageTooLarge {
            max_mb: MAX_IMAGE_BASE64_LEN / (1024 * 1024),
        });
    }
    if body.is_empty() || !BASE64_BODY.is_match(body) {
        return Err(ValidationError::InvalidImageEncoding);
    }
    match mime {
        Some(mime) if !mime.starts_with("image/") => {
            Err(ValidationError::UnsupportedMediaType(mime.to_string()))
        }
        Some(mime) => Ok(ImageInput::new(mime, body)),
        None => Ok(ImageInput::jpeg(body)),
    }
}

/// Decode an uploaded asset. Only images are accepted.
pub fn decode_asset(mime_type: &str, data: &str) -> Result<Vec<u8>, ValidationError> {
    let (embedded_mime, body) = split_data_url(data.trim());
    let mime = embedded_mime.unwrap_or(mime_type);
    if !mime.starts_with("image/") {
        return Err(ValidationError::UnsupportedMediaType(mime.to_string()));
    }
    if body.len() > MAX_ASSET_BYTES / 3 * 4 + 4 {
        return Err(ValidationError::ImageTooLarge {
            max_mb: MAX_ASSET_BYTES / (1024 * 1024),
        });
    }
    base64::engine::general_purpose::STANDARD
        .decode(body)
        .map_err(|_| ValidationError::InvalidImageEncoding)
}

/// Strip script/iframe elements, `javascript:` URLs and inline event
/// handlers from free text.
pub fn sanitize_input(input: &str) -> String {
    let text = SCRIPT_ELEMENT.replace_all(input, "");
    let text = IFRAME_ELEMENT.replace_all(&text, "");
    let text = JAVASCRIPT_URL.replace_all(&text, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    text.trim().to_string()
}

/// Sanitize script source handed back as context. Only embedded markup is
/// removed; assignments like `button.onclick = ...` are legitimate here.
pub fn sanitize_script(input: &str) -> String {
    let text = SCRIPT_ELEMENT.replace_all(input, "");
    let text = IFRAME_ELEMENT.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_limits() {
        assert_eq!(validate_prompt("  "), Err(ValidationError::MissingPrompt));
        assert!(validate_prompt("make it blue").is_ok());
        let long = "a".repeat(MAX_PROMPT_CHARS + 1);
        assert_eq!(
            validate_prompt(&long),
            Err(ValidationError::PromptTooLong { max: MAX_PROMPT_CHARS })
        );
        // Counted in characters, not bytes
        assert!(validate_prompt(&"é".repeat(MAX_PROMPT_CHARS)).is_ok());
    }

    #[test]
    fn test_parse_image_forms() {
        let bare = parse_image("QUJDRA==").unwrap();
        assert_eq!(bare.mime_type, "image/jpeg");
        assert_eq!(bare.data_base64, "QUJDRA==");

        let url = parse_image("data:image/png;base64,QUJD").unwrap();
        assert_eq!(url.mime_type, "image/png");
        assert_eq!(url.data_base64, "QUJD");

        assert_eq!(parse_image("not base64!"), Err(ValidationError::InvalidImageEncoding));
        assert_eq!(parse_image(""), Err(ValidationError::InvalidImageEncoding));
        assert!(matches!(
            parse_image("data:text/html;base64,QUJD"),
            Err(ValidationError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_parse_image_size_limit() {
        let big = "A".repeat(MAX_IMAGE_BASE64_LEN + 4);
        assert_eq!(
            parse_image(&big),
            Err(ValidationError::ImageTooLarge { max_mb: 10 })
        );
    }

    #[test]
    fn test_decode_asset() {
        assert_eq!(decode_asset("image/png", "QUJD").unwrap(), b"ABC");
        assert_eq!(decode_asset("", "data:image/gif;base64,QUJD").unwrap(), b"ABC");
        assert!(matches!(
            decode_asset("application/pdf", "QUJD"),
            Err(ValidationError::UnsupportedMediaType(_))
        ));
        assert_eq!(
            decode_asset("image/png", "@@@"),
            Err(ValidationError::InvalidImageEncoding)
        );
    }

    #[test]
    fn test_sanitize_input() {
        let dirty = "Make it <script>alert(1)</script>blue <iframe src=x></iframe><a href=\"javascript:go()\" onclick=\"x()\">";
        assert_eq!(sanitize_input(dirty), "Make it blue <a href=\"go()\" \"x()\">");
        assert_eq!(sanitize_input("conditional = true"), "conditional = true");
    }

    #[test]
    fn test_sanitize_script_keeps_handlers() {
        assert_eq!(
            sanitize_script("btn.onclick = go;\n<script>x</script>"),
            "btn.onclick = go;"
        );
    }
}
