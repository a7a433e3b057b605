//! Core data model for the pipeline

use serde::{Deserialize, Serialize};

use crate::constants::canvas::TEMP_BOX_ID;

/// One accepted `{html, css, js}` triple
///
/// Snapshots are never mutated once stored in the ledger and are never
/// deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnapshot {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl CodeSnapshot {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    /// Whether the script field carries any code
    pub fn has_script(&self) -> bool {
        !self.js.trim().is_empty()
    }
}

/// Output of the response extractor
///
/// Any field may be empty. Total failure is represented by `None` at the
/// call site, never by an all-empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl ExtractionResult {
    /// True when no field carries any non-whitespace text
    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty() && self.css.trim().is_empty() && self.js.trim().is_empty()
    }

    /// Whether the caller should accept this result as a new snapshot
    pub fn is_acceptable(&self) -> bool {
        !self.html.trim().is_empty()
    }

    pub fn into_snapshot(self) -> CodeSnapshot {
        CodeSnapshot {
            html: self.html,
            css: self.css,
            js: self.js,
        }
    }
}

/// Opaque handle to an uploaded asset
///
/// `url` is what generated HTML points at while editing; `id` is what an
/// [`crate::AssetSource`] resolves to bytes at export time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub url: String,
}

/// A user-drawn rectangle over the source design
///
/// Coordinates are in image space (unscaled by zoom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub uploaded_asset: Option<AssetRef>,
}

impl BoundingBox {
    /// True for the transient box that exists while a drag is in progress
    pub fn is_transient(&self) -> bool {
        self.id == TEMP_BOX_ID
    }

    pub fn has_asset(&self) -> bool {
        self.uploaded_asset.is_some()
    }
}

/// Boxes that take part in binding, in insertion order
pub(crate) fn bindable(boxes: &[BoundingBox]) -> impl Iterator<Item = &BoundingBox> {
    boxes.iter().filter(|b| !b.is_transient())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_acceptance() {
        let empty = ExtractionResult::default();
        assert!(empty.is_empty());
        assert!(!empty.is_acceptable());

        let css_only = ExtractionResult {
            css: "body {}".into(),
            ..Default::default()
        };
        assert!(!css_only.is_empty());
        assert!(!css_only.is_acceptable());
    }

    #[test]
    fn test_box_serializes_camel_case() {
        let b = BoundingBox {
            id: "b1".into(),
            x: 1.0,
            y: 2.0,
            width: 30.0,
            height: 40.0,
            label: "Image 1".into(),
            filename: Some("hero.png".into()),
            uploaded_asset: None,
        };
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["uploadedAsset"], serde_json::Value::Null);
        assert_eq!(json["filename"], "hero.png");
    }
}
