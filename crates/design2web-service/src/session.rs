//! Editing session
//!
//! A [`DesignSession`] ties together the uploaded design, the boxes drawn
//! over it, the version ledger, and the lifecycle flags that gate what the
//! user may do next.
//!
//! Completions are split in two so no lock is held across the network
//! call: `begin_*` validates and builds the request (setting the loading
//! flag), [`DesignSession::finish`] accepts or rejects the answer (always
//! clearing it).

use design2web_pipeline::{
    bind, extract, normalize, render, AssetRef, AssetSource, BoxCanvas, CanvasView, CodeSnapshot,
    Direction, LedgerSummary, PreviewDocument, VersionLedger,
};
use inference::{CodeContext, CompletionRequest, GatewayError, ImageInput};
use serde::Serialize;

use crate::constants::limits::MAX_PROMPT_CHARS;
use crate::error::{Result, ServiceError, ValidationError};
use crate::prompt::{design_prompt, modification_prompt};
use crate::validation::{sanitize_input, sanitize_script, validate_prompt};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No snapshot accepted yet
    Empty,
    /// One or more generations, not yet revised
    HasDraft,
    /// Navigated or modified at least once
    Editing,
    /// A final version is locked; only export remains
    Finalized,
}

/// Which kind of completion is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Generation,
    Modification,
}

#[derive(Debug, Default)]
struct Lifecycle {
    loading: bool,
    edited: bool,
    no_images: bool,
    custom_prompt: String,
}

pub struct DesignSession {
    id: String,
    owner: String,
    ledger: VersionLedger,
    canvas: BoxCanvas,
    design: Option<ImageInput>,
    lifecycle: Lifecycle,
}

impl DesignSession {
    pub fn new(owner: &str) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), owner.to_string())
    }

    fn with_id(id: String, owner: String) -> Self {
        Self {
            id,
            owner,
            ledger: VersionLedger::new(),
            canvas: BoxCanvas::new(),
            design: None,
            lifecycle: Lifecycle::default(),
        }
    }

    // ─── ACCESSORS ──────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn canvas(&self) -> &BoxCanvas {
        &self.canvas
    }

    pub fn design(&self) -> Option<&ImageInput> {
        self.design.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.loading
    }

    pub fn phase(&self) -> SessionPhase {
        if self.ledger.final_index().is_some() {
            SessionPhase::Finalized
        } else if self.ledger.is_empty() {
            SessionPhase::Empty
        } else if self.lifecycle.edited {
            SessionPhase::Editing
        } else {
            SessionPhase::HasDraft
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.lifecycle.loading {
            return Err(ServiceError::invalid_state("A request is already in progress"));
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.phase() == SessionPhase::Finalized {
            return Err(ServiceError::invalid_state(
                "The final version is locked; only export is available",
            ));
        }
        self.ensure_idle()
    }

    // ─── DESIGN & OPTIONS ───────────────────────────────────────────

    /// Set the design image.
    ///
    /// Boxes drawn over a previous design are dropped; their assets are
    /// returned so the caller can release them.
    pub fn set_design(&mut self, image: ImageInput) -> Result<Vec<AssetRef>> {
        self.ensure_open()?;
        if !self.ledger.is_empty() {
            return Err(ServiceError::invalid_state(
                "Start again to work on a different design",
            ));
        }
        let released = self.collect_assets();
        self.canvas = BoxCanvas::new();
        self.design = Some(image);
        Ok(released)
    }

    pub fn set_options(&mut self, no_images: bool, custom_prompt: &str) -> Result<()> {
        self.ensure_open()?;
        if custom_prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(ValidationError::PromptTooLong {
                max: MAX_PROMPT_CHARS,
            }
            .into());
        }
        self.lifecycle.no_images = no_images;
        self.lifecycle.custom_prompt = custom_prompt.to_string();
        Ok(())
    }

    /// Mutable canvas access for box editing
    pub fn canvas_mut(&mut self) -> Result<&mut BoxCanvas> {
        self.ensure_open()?;
        if self.design.is_none() {
            return Err(ServiceError::invalid_state("Upload a design image first"));
        }
        Ok(&mut self.canvas)
    }

    // ─── COMPLETIONS ────────────────────────────────────────────────

    /// Build the design analysis request and mark the session loading.
    pub fn begin_generation(&mut self) -> Result<CompletionRequest> {
        self.ensure_open()?;
        let design = self
            .design
            .clone()
            .ok_or_else(|| ServiceError::invalid_state("Upload a design image first"))?;
        if !self.lifecycle.no_images && !self.canvas.all_have_assets() {
            return Err(ServiceError::invalid_state(
                "Draw a box over every image and upload an asset for each, or mark the design as having no images",
            ));
        }

        let custom = sanitize_input(&self.lifecycle.custom_prompt);
        let prompt = design_prompt(self.lifecycle.no_images, &custom);
        self.lifecycle.loading = true;
        Ok(CompletionRequest::text(prompt).with_image(design))
    }

    /// Build a modification request against the current snapshot and mark
    /// the session loading.
    pub fn begin_modification(&mut self, change: &str) -> Result<CompletionRequest> {
        self.ensure_open()?;
        validate_prompt(change)?;
        let current = self
            .ledger
            .current()
            .ok_or_else(|| ServiceError::invalid_state("Generate a design before modifying it"))?;

        let context = CodeContext {
            html: sanitize_input(&current.html),
            css: sanitize_input(&current.css),
            js: sanitize_script(&current.js),
        };
        let prompt = modification_prompt(&sanitize_input(change));
        self.lifecycle.loading = true;
        Ok(CompletionRequest::text(prompt).with_context(context))
    }

    /// Clear the loading flag without accepting anything
    pub fn cancel_pending(&mut self) {
        self.lifecycle.loading = false;
    }

    /// Accept a completion outcome.
    ///
    /// On success the recovered code is bound to the committed boxes,
    /// normalized and appended; the new ledger index is returned. Any
    /// failure leaves the ledger untouched.
    pub fn finish(
        &mut self,
        kind: CompletionKind,
        outcome: std::result::Result<String, GatewayError>,
    ) -> Result<usize> {
        self.lifecycle.loading = false;

        let text = outcome.map_err(|e| {
            log::error!("Completion failed for session {}: {}", self.id, e);
            ServiceError::Upstream(e)
        })?;

        let extracted = match extract(&text) {
            Some(result) if result.is_acceptable() => result,
            _ => {
                log::warn!(
                    "Session {}: no usable HTML in a {} byte response",
                    self.id,
                    text.len()
                );
                return Err(ServiceError::Extraction);
            }
        };

        let mut snapshot = extracted.into_snapshot();
        snapshot.html = bind(&snapshot.html, self.canvas.committed());
        let index = self.ledger.append(normalize(&snapshot));
        if kind == CompletionKind::Modification {
            self.lifecycle.edited = true;
        }
        log::info!("Session {}: accepted version {}", self.id, index + 1);
        Ok(index)
    }

    // ─── HISTORY ────────────────────────────────────────────────────

    /// Move the cursor. Returns whether it moved.
    pub fn navigate(&mut self, direction: Direction) -> Result<bool> {
        self.ensure_open()?;
        let moved = self.ledger.navigate(direction);
        if moved {
            self.lifecycle.edited = true;
        }
        Ok(moved)
    }

    /// Lock the version under the cursor as final
    pub fn mark_final(&mut self) -> Result<usize> {
        self.ensure_idle()?;
        let index = self
            .ledger
            .current_index()
            .ok_or_else(|| ServiceError::invalid_state("There is no version to finalize"))?;
        self.ledger.mark_final(index)?;
        log::info!("Session {}: version {} marked final", self.id, index + 1);
        Ok(index)
    }

    // ─── OUTPUT ─────────────────────────────────────────────────────

    pub fn preview(&self) -> Result<PreviewDocument> {
        let current = self
            .ledger
            .current()
            .ok_or_else(|| ServiceError::invalid_state("Nothing to preview yet"))?;
        Ok(render(current, self.canvas.committed()))
    }

    /// Build the site archive from the final version
    pub fn export(&self, source: &dyn AssetSource) -> Result<Vec<u8>> {
        let snapshot = self
            .ledger
            .final_snapshot()
            .ok_or_else(|| ServiceError::invalid_state("Select a final version before exporting"))?;
        Ok(design2web_pipeline::export(
            snapshot,
            self.canvas.committed(),
            source,
        )?)
    }

    /// Discard everything and start over.
    ///
    /// Returns the assets that were attached so the caller can release them.
    pub fn reset(&mut self) -> Result<Vec<AssetRef>> {
        self.ensure_idle()?;
        let released = self.collect_assets();
        *self = Self::with_id(std::mem::take(&mut self.id), std::mem::take(&mut self.owner));
        log::info!("Session {} reset", self.id);
        Ok(released)
    }

    fn collect_assets(&self) -> Vec<AssetRef> {
        self.canvas
            .committed()
            .iter()
            .filter_map(|b| b.uploaded_asset.clone())
            .collect()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            phase: self.phase(),
            loading: self.lifecycle.loading,
            has_design: self.design.is_some(),
            no_images: self.lifecycle.no_images,
            custom_prompt: self.lifecycle.custom_prompt.clone(),
            ledger: self.ledger.summary(),
            canvas: self.canvas.view(),
            current: self.ledger.current().cloned(),
        }
    }
}

/// Serializable session state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub phase: SessionPhase,
    pub loading: bool,
    pub has_design: bool,
    pub no_images: bool,
    pub custom_prompt: String,
    pub ledger: LedgerSummary,
    pub canvas: CanvasView,
    pub current: Option<CodeSnapshot>,
}
