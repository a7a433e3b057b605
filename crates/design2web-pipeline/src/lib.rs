//! Design-to-web code pipeline
//!
//! Everything between "the model answered with some text" and "the user
//! downloads a site":
//! - **extract**: recover `{html, css, js}` from unreliable model output
//! - **bind**: point generated `<img>` tags at the user's uploaded assets
//! - **normalize**: complete the HTML shell and link the stylesheet/script
//! - **ledger**: the version history of accepted snapshots
//! - **canvas**: bounding boxes drawn over the source design
//! - **preview**: a sandboxed rendering document
//! - **export**: the zip bundle
//!
//! The crate is synchronous and performs no I/O besides what an
//! [`AssetSource`] does on its behalf.
//!
//! # Example
//!
//! ```rust,ignore
//! use design2web_pipeline::{bind, extract, normalize, VersionLedger};
//!
//! let extracted = extract(&raw_model_output).ok_or("no code")?;
//! let mut snapshot = extracted.into_snapshot();
//! snapshot.html = bind(&snapshot.html, canvas.committed());
//! ledger.append(normalize(&snapshot));
//! ```

pub mod bind;
pub mod canvas;
pub mod constants;
pub mod error;
pub mod export;
pub mod extract;
pub mod ledger;
pub mod normalize;
pub mod preview;
pub mod types;

pub use bind::bind;
pub use canvas::{BoxCanvas, CanvasView, Point};
pub use error::{PipelineError, Result};
pub use export::{export, rewrite_asset_paths, AssetSource};
pub use extract::extract;
pub use ledger::{Direction, LedgerSummary, VersionLedger};
pub use normalize::normalize;
pub use preview::{render, PreviewDocument, SANDBOX_POLICY};
pub use types::{AssetRef, BoundingBox, CodeSnapshot, ExtractionResult};
