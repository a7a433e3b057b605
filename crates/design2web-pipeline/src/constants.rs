//! Pipeline-wide constants
//!
//! Limits and fixed names shared by the canvas, exporter and normalizer.

/// Bounding box canvas configuration
pub mod canvas {
    /// Reserved id of the box being drawn
    pub const TEMP_BOX_ID: &str = "temp";
    /// Minimum committed box width/height, in screen pixels
    pub const MIN_BOX_SCREEN_PX: f64 = 10.0;
    /// Zoom bounds
    pub const ZOOM_MIN: f64 = 0.2;
    pub const ZOOM_MAX: f64 = 3.0;
    /// Prefix for generated labels ("Image 1", "Image 2", ...)
    pub const LABEL_PREFIX: &str = "Image";
}

/// Exported bundle layout
pub mod bundle {
    pub const ARCHIVE_NAME: &str = "design2web-site.zip";
    pub const INDEX_HTML: &str = "index.html";
    pub const STYLESHEET: &str = "style.css";
    pub const SCRIPT: &str = "script.js";
    pub const ASSETS_DIR: &str = "assets/";
}

/// Generated document defaults
pub mod document {
    pub const TITLE: &str = "Design to Web";
    pub const LANG: &str = "en";
}
