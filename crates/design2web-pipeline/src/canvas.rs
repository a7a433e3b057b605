//! Bounding box canvas
//!
//! Box editing over the uploaded design: draw, drag, delete, attach an
//! asset, zoom. Pointer positions arrive in screen space relative to the
//! canvas origin and are stored in image space (divided by zoom).
//!
//! At most one gesture runs at a time. While drawing, a transient box with
//! the reserved id [`TEMP_BOX_ID`] exists; it is never part of
//! [`BoxCanvas::committed`].

use serde::{Deserialize, Serialize};

use crate::constants::canvas::{
    LABEL_PREFIX, MIN_BOX_SCREEN_PX, TEMP_BOX_ID, ZOOM_MAX, ZOOM_MIN,
};
use crate::error::{PipelineError, Result};
use crate::types::{AssetRef, BoundingBox};

/// Pointer position in screen pixels, relative to the canvas origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Drawing {
        origin: Point,
    },
    Dragging {
        box_id: String,
        offset: Point,
    },
}

/// Boxes drawn over the design, in insertion order
#[derive(Debug, Clone)]
pub struct BoxCanvas {
    boxes: Vec<BoundingBox>,
    draft: Option<BoundingBox>,
    gesture: Gesture,
    next_label: u32,
    zoom: f64,
}

impl Default for BoxCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxCanvas {
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            draft: None,
            gesture: Gesture::Idle,
            next_label: 1,
            zoom: 1.0,
        }
    }

    // ─── ZOOM ───────────────────────────────────────────────────────

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped and rounded to one decimal.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let rounded = (zoom * 10.0).round() / 10.0;
        self.zoom = rounded.clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom
    }

    fn to_image(&self, point: Point) -> Point {
        Point::new(point.x / self.zoom, point.y / self.zoom)
    }

    // ─── DRAWING ────────────────────────────────────────────────────

    pub fn begin_draw(&mut self, at: Point) -> Result<()> {
        self.ensure_idle("draw")?;
        let origin = self.to_image(at);
        self.draft = Some(BoundingBox {
            id: TEMP_BOX_ID.to_string(),
            x: origin.x,
            y: origin.y,
            width: 0.0,
            height: 0.0,
            label: String::new(),
            filename: None,
            uploaded_asset: None,
        });
        self.gesture = Gesture::Drawing { origin };
        Ok(())
    }

    pub fn update_draw(&mut self, at: Point) -> Result<&BoundingBox> {
        let Gesture::Drawing { origin } = &self.gesture else {
            return Err(PipelineError::InvalidGesture("not drawing".into()));
        };
        let origin = *origin;
        let current = self.to_image(at);
        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| PipelineError::InvalidGesture("no draft box".into()))?;
        draft.x = origin.x.min(current.x);
        draft.y = origin.y.min(current.y);
        draft.width = (current.x - origin.x).abs();
        draft.height = (current.y - origin.y).abs();
        Ok(draft)
    }

    /// Finish the draw gesture.
    ///
    /// The box is committed only if it is at least the minimum size on
    /// screen; either way the label counter advances.
    pub fn end_draw(&mut self) -> Result<Option<BoundingBox>> {
        if !matches!(self.gesture, Gesture::Drawing { .. }) {
            return Err(PipelineError::InvalidGesture("not drawing".into()));
        }
        self.gesture = Gesture::Idle;
        let label_number = self.next_label;
        self.next_label += 1;

        let Some(mut draft) = self.draft.take() else {
            return Ok(None);
        };
        let large_enough = draft.width * self.zoom >= MIN_BOX_SCREEN_PX
            && draft.height * self.zoom >= MIN_BOX_SCREEN_PX;
        if !large_enough {
            log::debug!(
                "Discarding box smaller than {}px ({:.1}x{:.1})",
                MIN_BOX_SCREEN_PX,
                draft.width,
                draft.height
            );
            return Ok(None);
        }

        draft.id = uuid::Uuid::new_v4().to_string();
        draft.label = format!("{} {}", LABEL_PREFIX, label_number);
        self.boxes.push(draft.clone());
        Ok(Some(draft))
    }

    pub fn cancel_draw(&mut self) {
        if matches!(self.gesture, Gesture::Drawing { .. }) {
            self.gesture = Gesture::Idle;
            self.draft = None;
        }
    }

    // ─── DRAGGING ───────────────────────────────────────────────────

    pub fn begin_drag(&mut self, box_id: &str, at: Point) -> Result<()> {
        self.ensure_idle("drag")?;
        let pointer = self.to_image(at);
        let bbox = self.get(box_id)?;
        let offset = Point::new(pointer.x - bbox.x, pointer.y - bbox.y);
        self.gesture = Gesture::Dragging {
            box_id: box_id.to_string(),
            offset,
        };
        Ok(())
    }

    pub fn drag_to(&mut self, at: Point) -> Result<&BoundingBox> {
        let Gesture::Dragging { box_id, offset } = &self.gesture else {
            return Err(PipelineError::InvalidGesture("not dragging".into()));
        };
        let (box_id, offset) = (box_id.clone(), *offset);
        let pointer = self.to_image(at);
        let bbox = self.get_mut(&box_id)?;
        bbox.x = pointer.x - offset.x;
        bbox.y = pointer.y - offset.y;
        Ok(bbox)
    }

    pub fn end_drag(&mut self) {
        if matches!(self.gesture, Gesture::Dragging { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Id of the box currently being dragged
    pub fn active_box_id(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Dragging { box_id, .. } => Some(box_id),
            _ => None,
        }
    }

    // ─── EDITING ────────────────────────────────────────────────────

    pub fn delete(&mut self, box_id: &str) -> Result<BoundingBox> {
        let position = self
            .boxes
            .iter()
            .position(|b| b.id == box_id)
            .ok_or_else(|| PipelineError::BoxNotFound(box_id.to_string()))?;
        if self.active_box_id() == Some(box_id) {
            self.gesture = Gesture::Idle;
        }
        Ok(self.boxes.remove(position))
    }

    /// Attach an uploaded asset to a box, replacing any previous one.
    ///
    /// Returns the replaced asset, if there was one.
    pub fn attach_asset(
        &mut self,
        box_id: &str,
        filename: impl Into<String>,
        asset: AssetRef,
    ) -> Result<Option<AssetRef>> {
        let bbox = self.get_mut(box_id)?;
        bbox.filename = Some(filename.into());
        Ok(bbox.uploaded_asset.replace(asset))
    }

    pub fn get(&self, box_id: &str) -> Result<&BoundingBox> {
        self.boxes
            .iter()
            .find(|b| b.id == box_id)
            .ok_or_else(|| PipelineError::BoxNotFound(box_id.to_string()))
    }

    fn get_mut(&mut self, box_id: &str) -> Result<&mut BoundingBox> {
        self.boxes
            .iter_mut()
            .find(|b| b.id == box_id)
            .ok_or_else(|| PipelineError::BoxNotFound(box_id.to_string()))
    }

    /// Committed boxes in insertion order
    pub fn committed(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// The transient box of an in-progress draw
    pub fn draft(&self) -> Option<&BoundingBox> {
        self.draft.as_ref()
    }

    /// True when there is at least one box and every box has an asset
    pub fn all_have_assets(&self) -> bool {
        !self.boxes.is_empty() && self.boxes.iter().all(BoundingBox::has_asset)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn view(&self) -> CanvasView {
        CanvasView {
            boxes: self.boxes.clone(),
            draft: self.draft.clone(),
            zoom: self.zoom,
            active_box_id: self.active_box_id().map(str::to_string),
        }
    }

    fn ensure_idle(&self, action: &str) -> Result<()> {
        match self.gesture {
            Gesture::Idle => Ok(()),
            _ => Err(PipelineError::InvalidGesture(format!(
                "cannot start {} while another gesture is active",
                action
            ))),
        }
    }
}

/// Serializable canvas state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasView {
    pub boxes: Vec<BoundingBox>,
    pub draft: Option<BoundingBox>,
    pub zoom: f64,
    pub active_box_id: Option<String>,
}
