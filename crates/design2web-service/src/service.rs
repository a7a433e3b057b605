//! Design service facade
//!
//! [`DesignService`] is what the HTTP layer talks to. It owns the gateway,
//! the quota guard, the session registry and the asset store, and sequences
//! each flow so that no session lock is held across a completion call.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use design2web_pipeline::{AssetRef, BoundingBox, Direction, Point, PreviewDocument};
use inference::SharedGateway;

use crate::analyze::{build_completion_request, complete_and_extract, AnalyzeRequest, AnalyzeResponse};
use crate::assets::AssetStore;
use crate::error::{Result, ServiceError, ValidationError};
use crate::quota::{QuotaGuard, QuotaStatus, UsageStore};
use crate::registry::{SessionRegistry, SharedSession};
use crate::session::{CompletionKind, SessionView};
use crate::validation::{decode_asset, parse_image};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Clears a session's loading flag unless the completion reached `finish`.
///
/// Covers early returns and callers that drop the request future while
/// the backend is still answering.
struct PendingCompletion {
    session: SharedSession,
    armed: bool,
}

impl PendingCompletion {
    fn new(session: &SharedSession) -> Self {
        Self {
            session: Arc::clone(session),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingCompletion {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut guard) = self.session.try_lock() {
            guard.cancel_pending();
            return;
        }
        let session = Arc::clone(&self.session);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    session.lock().await.cancel_pending();
                });
            }
            Err(_) => log::warn!("Abandoned completion left its session loading"),
        }
    }
}

pub struct DesignService {
    gateway: SharedGateway,
    quota: QuotaGuard,
    sessions: SessionRegistry,
    assets: AssetStore,
}

impl DesignService {
    pub fn new(gateway: SharedGateway, usage: Arc<dyn UsageStore>, daily_limit: u32) -> Self {
        Self {
            gateway,
            quota: QuotaGuard::new(usage, daily_limit),
            sessions: SessionRegistry::new(),
            assets: AssetStore::new(),
        }
    }

    pub fn gateway(&self) -> &SharedGateway {
        &self.gateway
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub async fn quota_status(&self, user_id: &str) -> QuotaStatus {
        self.quota.status(user_id, today()).await
    }

    fn release(&self, assets: Vec<AssetRef>) {
        for asset in assets {
            self.assets.remove(&asset.id);
        }
    }

    // ─── SESSIONS ───────────────────────────────────────────────────

    pub async fn create_session(&self, user_id: &str) -> SessionView {
        let (_, session) = self.sessions.create(user_id);
        let guard = session.lock().await;
        guard.view()
    }

    pub async fn session_view(&self, session_id: &str) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let guard = session.lock().await;
        Ok(guard.view())
    }

    /// Drop a session and the assets attached to it
    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        let session = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.to_string()))?;
        let mut guard = session.lock().await;
        guard.cancel_pending();
        let released = guard.reset()?;
        self.release(released);
        Ok(())
    }

    /// "Start Again": same session id, fresh state
    pub async fn start_again(&self, session_id: &str) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        let released = guard.reset()?;
        self.release(released);
        Ok(guard.view())
    }

    pub async fn set_design(&self, session_id: &str, image_base64: &str) -> Result<SessionView> {
        let image = parse_image(image_base64)?;
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        let released = guard.set_design(image)?;
        self.release(released);
        Ok(guard.view())
    }

    pub async fn set_options(
        &self,
        session_id: &str,
        no_images: bool,
        custom_prompt: &str,
    ) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        guard.set_options(no_images, custom_prompt)?;
        Ok(guard.view())
    }

    // ─── BOXES ──────────────────────────────────────────────────────

    /// Draw a box from `from` to `to` (screen space) in one gesture.
    ///
    /// Returns `None` when the box was too small to keep.
    pub async fn draw_box(&self, session_id: &str, from: Point, to: Point) -> Result<Option<BoundingBox>> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        let canvas = guard.canvas_mut()?;
        canvas.begin_draw(from)?;
        if let Err(e) = canvas.update_draw(to) {
            canvas.cancel_draw();
            return Err(e.into());
        }
        Ok(canvas.end_draw()?)
    }

    /// Drag a box by the pointer movement `from` -> `to` (screen space)
    pub async fn move_box(
        &self,
        session_id: &str,
        box_id: &str,
        from: Point,
        to: Point,
    ) -> Result<BoundingBox> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        let canvas = guard.canvas_mut()?;
        canvas.begin_drag(box_id, from)?;
        let moved = canvas.drag_to(to).map(BoundingBox::clone);
        canvas.end_drag();
        Ok(moved?)
    }

    pub async fn delete_box(&self, session_id: &str, box_id: &str) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        let removed = guard.canvas_mut()?.delete(box_id)?;
        self.release(removed.uploaded_asset.into_iter().collect());
        Ok(guard.view())
    }

    pub async fn set_zoom(&self, session_id: &str, zoom: f64) -> Result<f64> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        Ok(guard.canvas_mut()?.set_zoom(zoom))
    }

    /// Store an uploaded file and attach it to a box, replacing any
    /// earlier upload for that box.
    pub async fn attach_asset(
        &self,
        session_id: &str,
        box_id: &str,
        filename: &str,
        mime_type: &str,
        data: &str,
    ) -> Result<BoundingBox> {
        if filename.trim().is_empty() {
            return Err(ValidationError::MissingFileName.into());
        }
        let bytes = decode_asset(mime_type, data)?;
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        let canvas = guard.canvas_mut()?;
        // Fail before storing anything if the box is gone
        canvas.get(box_id)?;

        let asset = self.assets.insert(filename, mime_type, bytes);
        let replaced = canvas.attach_asset(box_id, filename, asset)?;
        self.release(replaced.into_iter().collect());
        Ok(canvas.get(box_id)?.clone())
    }

    // ─── COMPLETIONS ────────────────────────────────────────────────

    /// Generate code from the session's design. Consumes one quota unit.
    pub async fn generate(&self, session_id: &str) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let (request, owner) = {
            let mut guard = session.lock().await;
            let request = guard.begin_generation()?;
            (request, guard.owner().to_string())
        };

        let pending = PendingCompletion::new(&session);
        self.quota.try_consume(&owner, today()).await?;
        self.complete(&session, pending, CompletionKind::Generation, request)
            .await
    }

    /// Apply a natural-language change to the current version
    pub async fn modify(&self, session_id: &str, change: &str) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let request = session.lock().await.begin_modification(change)?;
        let pending = PendingCompletion::new(&session);
        self.complete(&session, pending, CompletionKind::Modification, request)
            .await
    }

    async fn complete(
        &self,
        session: &SharedSession,
        mut pending: PendingCompletion,
        kind: CompletionKind,
        request: inference::CompletionRequest,
    ) -> Result<SessionView> {
        let outcome = self.gateway.complete(&request).await;
        let mut guard = session.lock().await;
        pending.disarm();
        guard.finish(kind, outcome)?;
        Ok(guard.view())
    }

    /// Stateless analyze. Design analyses consume quota for `user_id`.
    pub async fn analyze(&self, user_id: &str, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        let completion = build_completion_request(request)?;
        if request.is_design_analysis() {
            self.quota.try_consume(user_id, today()).await?;
        }
        complete_and_extract(&self.gateway, &completion).await
    }

    // ─── HISTORY & OUTPUT ───────────────────────────────────────────

    pub async fn navigate(&self, session_id: &str, direction: Direction) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        guard.navigate(direction)?;
        Ok(guard.view())
    }

    pub async fn finalize(&self, session_id: &str) -> Result<SessionView> {
        let session = self.sessions.get(session_id)?;
        let mut guard = session.lock().await;
        guard.mark_final()?;
        Ok(guard.view())
    }

    pub async fn preview(&self, session_id: &str) -> Result<PreviewDocument> {
        let session = self.sessions.get(session_id)?;
        let guard = session.lock().await;
        guard.preview()
    }

    pub async fn export(&self, session_id: &str) -> Result<Vec<u8>> {
        let session = self.sessions.get(session_id)?;
        let guard = session.lock().await;
        guard.export(&self.assets)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::time::Duration;

    use inference::InferenceGateway;

    use super::*;
    use crate::quota::InMemoryUsageStore;
    use crate::session::SessionPhase;
    use crate::testing::{CannedBackend, StalledBackend};

    const TWO_IMAGES: &str = r#"Here you go:
```json
{"html": "<section><img src=\"a.jpg\" width=\"10\"><h1>Shop</h1><img src=\"b.jpg\"></section>", "css": "h1 { color: #111; }", "js": "console.log('ready');"}
```"#;

    fn service_with(answer: &str, limit: u32) -> DesignService {
        let gateway = InferenceGateway::with_backend(Box::new(CannedBackend::new(answer)), "canned");
        DesignService::new(
            Arc::new(gateway),
            Arc::new(InMemoryUsageStore::new()),
            limit,
        )
    }

    async fn boxed_session(service: &DesignService) -> (String, Vec<BoundingBox>) {
        let id = service.create_session("u1").await.id;
        service.set_design(&id, "data:image/png;base64,QUJD").await.unwrap();
        let mut boxes = Vec::new();
        for (i, x) in [0.0, 100.0].into_iter().enumerate() {
            let bbox = service
                .draw_box(&id, Point::new(x, 0.0), Point::new(x + 50.0, 40.0))
                .await
                .unwrap()
                .unwrap();
            let attached = service
                .attach_asset(&id, &bbox.id, &format!("photo{}.png", i), "image/png", "iVBORw==")
                .await
                .unwrap();
            boxes.push(attached);
        }
        (id, boxes)
    }

    #[tokio::test]
    async fn test_generate_binds_assets_in_order() {
        let service = service_with(TWO_IMAGES, 3);
        let (id, boxes) = boxed_session(&service).await;

        let view = service.generate(&id).await.unwrap();
        assert_eq!(view.phase, SessionPhase::HasDraft);
        let html = view.current.unwrap().html;

        let first = boxes[0].uploaded_asset.as_ref().unwrap();
        let second = boxes[1].uploaded_asset.as_ref().unwrap();
        let first_at = html.find(&first.url).unwrap();
        let second_at = html.find(&second.url).unwrap();
        assert!(first_at < second_at);
        assert!(html.contains("width: 50px; height: 40px; object-fit: cover;"));
        assert!(html.contains(r#"alt="Image 1""#));
        assert!(html.contains(r#"href="style.css""#));
        assert!(html.contains(r#"src="script.js""#));
        assert!(!html.contains("a.jpg"));
    }

    #[tokio::test]
    async fn test_generate_consumes_quota_modify_does_not() {
        let service = service_with(TWO_IMAGES, 1);
        let (id, _) = boxed_session(&service).await;

        service.generate(&id).await.unwrap();
        assert_eq!(service.quota_status("u1").await.remaining, 0);

        let err = service.generate(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::QuotaExceeded { limit: 1 }));
        // Loading was cleared, so a modification still goes through
        let view = service.modify(&id, "make the title larger").await.unwrap();
        assert_eq!(view.ledger.len, 2);
        assert_eq!(view.phase, SessionPhase::Editing);
    }

    #[tokio::test]
    async fn test_abandoned_generation_clears_loading() {
        let gateway = InferenceGateway::with_backend(Box::new(StalledBackend), "stalled");
        let service = DesignService::new(
            Arc::new(gateway),
            Arc::new(InMemoryUsageStore::new()),
            3,
        );
        let (id, _) = boxed_session(&service).await;

        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), service.generate(&id)).await;
        assert!(timed_out.is_err());

        assert!(!service.session_view(&id).await.unwrap().loading);
        assert_eq!(service.quota_status("u1").await.used, 1);
        let view = service.start_again(&id).await.unwrap();
        assert_eq!(view.phase, SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_export_after_finalize() {
        let service = service_with(TWO_IMAGES, 3);
        let (id, _) = boxed_session(&service).await;
        service.generate(&id).await.unwrap();

        assert!(matches!(
            service.export(&id).await,
            Err(ServiceError::InvalidState(_))
        ));
        service.finalize(&id).await.unwrap();
        let bytes = service.export(&id).await.unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut index = String::new();
        archive
            .by_name("index.html")
            .unwrap()
            .read_to_string(&mut index)
            .unwrap();
        assert!(index.contains(r#"src="assets/photo0.png""#));
        assert!(index.contains(r#"src="assets/photo1.png""#));
        assert!(archive.by_name("assets/photo1.png").is_ok());
        assert!(archive.by_name("script.js").is_ok());
    }

    #[tokio::test]
    async fn test_replacing_and_deleting_release_assets() {
        let service = service_with(TWO_IMAGES, 3);
        let (id, boxes) = boxed_session(&service).await;
        assert_eq!(service.assets().len(), 2);

        service
            .attach_asset(&id, &boxes[0].id, "new.png", "image/png", "iVBORw==")
            .await
            .unwrap();
        assert_eq!(service.assets().len(), 2);

        service.delete_box(&id, &boxes[1].id).await.unwrap();
        assert_eq!(service.assets().len(), 1);

        service.start_again(&id).await.unwrap();
        assert!(service.assets().is_empty());
    }

    #[tokio::test]
    async fn test_attach_validates_upload() {
        let service = service_with(TWO_IMAGES, 3);
        let (id, boxes) = boxed_session(&service).await;
        assert!(matches!(
            service
                .attach_asset(&id, &boxes[0].id, "", "image/png", "iVBORw==")
                .await,
            Err(ServiceError::Validation(ValidationError::MissingFileName))
        ));
        assert!(matches!(
            service
                .attach_asset(&id, "nope", "x.png", "image/png", "iVBORw==")
                .await,
            Err(ServiceError::Pipeline(_))
        ));
        assert_eq!(service.assets().len(), 2);
    }

    #[tokio::test]
    async fn test_stateless_analyze_quota() {
        let service = service_with(TWO_IMAGES, 1);
        let design = AnalyzeRequest {
            prompt: "build".into(),
            image_base64: Some("QUJD".into()),
            ..Default::default()
        };
        let response = service.analyze("u9", &design).await.unwrap();
        assert!(response.code().unwrap().html.contains("<h1>Shop</h1>"));
        assert!(matches!(
            service.analyze("u9", &design).await,
            Err(ServiceError::QuotaExceeded { .. })
        ));

        let modify = AnalyzeRequest {
            prompt: "smaller".into(),
            html: Some("<h1>Shop</h1>".into()),
            ..Default::default()
        };
        assert!(service.analyze("u9", &modify).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let service = service_with(TWO_IMAGES, 3);
        assert!(matches!(
            service.generate("missing").await,
            Err(ServiceError::SessionNotFound(_))
        ));
        assert!(matches!(
            service.close_session("missing").await,
            Err(ServiceError::SessionNotFound(_))
        ));
    }
}
