//! Bundle exporter
//!
//! Packs a snapshot and its bound assets into a zip:
//!
//! ```text
//! index.html      image src rewritten to assets/<filename>
//! style.css
//! script.js       only when there is script
//! assets/<filename>...
//! ```
//!
//! An asset that cannot be fetched is left out; the export itself still
//! succeeds.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bind::{set_attribute, IMG_TAG, SRC_ATTR};
use crate::constants::bundle;
use crate::error::Result;
use crate::types::{bindable, AssetRef, BoundingBox, CodeSnapshot};

/// Resolves uploaded assets to bytes at export time
pub trait AssetSource {
    fn fetch(&self, asset: &AssetRef) -> Result<Vec<u8>>;
}

/// Point bound `<img>` tags at `assets/<filename>`, pairing tags and boxes
/// by position as the binder does.
pub fn rewrite_asset_paths(html: &str, boxes: &[BoundingBox]) -> String {
    let boxes: Vec<&BoundingBox> = bindable(boxes).collect();
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for (index, tag) in IMG_TAG.find_iter(html).enumerate() {
        let Some(bbox) = boxes.get(index) else {
            break;
        };
        let Some(path) = bundle_path(bbox) else {
            continue;
        };
        out.push_str(&html[last..tag.start()]);
        out.push_str(&set_attribute(tag.as_str(), &SRC_ATTR, "src", &path));
        last = tag.end();
    }
    out.push_str(&html[last..]);
    out
}

/// `assets/<filename>` for a box that has an asset and a usable filename
fn bundle_path(bbox: &BoundingBox) -> Option<String> {
    bbox.uploaded_asset.as_ref()?;
    let name = safe_file_name(bbox.filename.as_deref()?)?;
    Some(format!("{}{}", bundle::ASSETS_DIR, name))
}

/// Last path segment, rejecting names that would escape `assets/`
fn safe_file_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}

/// Build the site archive for `snapshot`.
pub fn export(
    snapshot: &CodeSnapshot,
    boxes: &[BoundingBox],
    source: &dyn AssetSource,
) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(bundle::INDEX_HTML, options)?;
    zip.write_all(rewrite_asset_paths(&snapshot.html, boxes).as_bytes())?;

    zip.start_file(bundle::STYLESHEET, options)?;
    zip.write_all(snapshot.css.as_bytes())?;

    if snapshot.has_script() {
        zip.start_file(bundle::SCRIPT, options)?;
        zip.write_all(snapshot.js.as_bytes())?;
    }

    zip.add_directory(bundle::ASSETS_DIR, options)?;

    let mut written = HashSet::new();
    let mut skipped = 0usize;
    for bbox in bindable(boxes) {
        let (Some(asset), Some(path)) = (&bbox.uploaded_asset, bundle_path(bbox)) else {
            continue;
        };
        if !written.insert(path.clone()) {
            log::debug!("Skipping duplicate asset path {}", path);
            continue;
        }
        match source.fetch(asset) {
            Ok(bytes) => {
                zip.start_file(path.as_str(), options)?;
                zip.write_all(&bytes)?;
            }
            Err(e) => {
                skipped += 1;
                log::warn!("Leaving asset {} out of export: {}", path, e);
            }
        }
    }

    let bytes = zip.finish()?.into_inner();
    log::info!(
        "Exported bundle ({} bytes, {} asset(s) skipped)",
        bytes.len(),
        skipped
    );
    Ok(bytes)
}
