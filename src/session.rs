//! One decoration session over a single captured photo.

use std::sync::Arc;

use crate::assets::catalog::{AssetRef, StampCatalog};
use crate::assets::photo::BasePhoto;
use crate::config::EditorConfig;
use crate::editor::interaction::{InteractionController, InteractionOutcome, InteractionState, PointerEvent};
use crate::editor::store::{OverlayStore, ScaleBounds, Stamp, StampId, StampPatch, StoreObserver};
use crate::editor::transform::TransformEditor;
use crate::foundation::core::NormPoint;
use crate::foundation::error::{PhotostampError, PhotostampResult};
use crate::preview::scheduler::{PreviewFrame, PreviewObserver, PreviewScheduler};
use crate::publish::{DocumentStore, ObjectStore, Owner, PostDraft, SubmitReceipt, publish};
use crate::render::compose::{COMPOSITE_CONTENT_TYPE, ComposeSettings, ComposedImage, Compositor};
use crate::theme::CatTheme;

/// Owns the overlay store for one photo and routes edits, previews, and submission.
///
/// Nothing here is shared across sessions. Every store mutation schedules a preview; submission
/// always composes again from the current store instead of reusing a preview, and never
/// modifies the store, so a failed submit can be retried as is.
#[derive(Debug)]
pub struct EditingSession {
    config: EditorConfig,
    catalog: Arc<StampCatalog>,
    photo: BasePhoto,
    store: OverlayStore,
    interaction: InteractionController,
    transform: TransformEditor,
    compositor: Compositor,
    preview: PreviewScheduler,
}

impl EditingSession {
    /// Start decorating `photo_bytes` with stamps from `catalog`.
    pub fn new(
        photo_bytes: impl Into<Vec<u8>>,
        catalog: Arc<StampCatalog>,
        config: EditorConfig,
    ) -> PhotostampResult<Self> {
        config.validate()?;
        let compositor = Compositor::new(ComposeSettings::from(&config));
        let preview =
            PreviewScheduler::new(compositor.clone(), Arc::clone(&catalog), config.preview_threads)?;
        let photo = BasePhoto::new(photo_bytes);
        let store = fresh_store(config.scale_bounds()?, &preview, &photo);
        preview.request(&photo, store.stamps());

        tracing::debug!(theme = %config.theme, stamps_available = catalog.len(), "editing session started");
        Ok(Self {
            interaction: InteractionController::new(config.stamp_width_fraction, config.max_stamps),
            transform: TransformEditor::from_config(&config),
            config,
            catalog,
            photo,
            store,
            compositor,
            preview,
        })
    }

    /// Injected configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// UI theme chosen at session start.
    pub fn theme(&self) -> CatTheme {
        self.config.theme
    }

    /// Stamp catalog.
    pub fn catalog(&self) -> &StampCatalog {
        &self.catalog
    }

    /// Captured photo, undecorated. Always available for a fallback submission.
    pub fn raw_photo(&self) -> &BasePhoto {
        &self.photo
    }

    /// Read access to the overlay store.
    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    /// Stamps in render order.
    pub fn stamps(&self) -> &[Stamp] {
        self.store.stamps()
    }

    /// Selected stamp.
    pub fn active(&self) -> Option<StampId> {
        self.store.active()
    }

    /// Pointer controller state.
    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    /// Register an extra store subscriber, e.g. the host UI.
    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) {
        self.store.subscribe(observer);
    }

    /// Pick the palette asset placed by the next tap on empty photo area.
    pub fn select_pending_asset(&mut self, asset: Option<AssetRef>) -> PhotostampResult<()> {
        if let Some(a) = &asset
            && !self.catalog.contains(a)
        {
            return Err(PhotostampError::validation(format!(
                "stamp '{a}' is not in the catalog"
            )));
        }
        self.interaction.set_pending_asset(asset);
        Ok(())
    }

    /// Palette asset currently selected.
    pub fn pending_asset(&self) -> Option<&AssetRef> {
        self.interaction.pending_asset()
    }

    /// Feed one pointer event from the host UI.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> InteractionOutcome {
        self.interaction
            .handle(event, &mut self.store, &self.catalog)
    }

    /// Place `asset` at a normalized position without pointer input, e.g. when replaying a
    /// saved stamp list. The new stamp becomes active.
    pub fn place_stamp(&mut self, asset: AssetRef, at: NormPoint) -> PhotostampResult<StampId> {
        if !self.catalog.contains(&asset) {
            return Err(PhotostampError::validation(format!(
                "stamp '{asset}' is not in the catalog"
            )));
        }
        if let Some(max) = self.config.max_stamps
            && self.store.len() >= max
        {
            return Err(PhotostampError::validation(format!(
                "stamp limit of {max} reached"
            )));
        }
        Ok(self.store.place(asset, at.x, at.y))
    }

    /// Merge `patch` into a stamp. Values are clamped like every other edit.
    pub fn update_stamp(&mut self, id: StampId, patch: StampPatch) {
        self.store.update(id, patch);
    }

    /// Select a stamp directly, or clear the selection.
    pub fn select(&mut self, id: Option<StampId>) {
        self.store.select(id);
    }

    /// Add `delta` to the active stamp's scale.
    pub fn scale_by(&mut self, delta: f64) -> Option<f64> {
        self.transform.scale_by(&mut self.store, delta)
    }

    /// Add `delta` radians to the active stamp's rotation.
    pub fn rotate_by(&mut self, delta: f64) -> Option<f64> {
        self.transform.rotate_by(&mut self.store, delta)
    }

    /// One configured scale step up.
    pub fn scale_up(&mut self) -> Option<f64> {
        self.transform.scale_up(&mut self.store)
    }

    /// One configured scale step down.
    pub fn scale_down(&mut self) -> Option<f64> {
        self.transform.scale_down(&mut self.store)
    }

    /// One configured rotation step clockwise.
    pub fn rotate_cw(&mut self) -> Option<f64> {
        self.transform.rotate_cw(&mut self.store)
    }

    /// One configured rotation step counter-clockwise.
    pub fn rotate_ccw(&mut self) -> Option<f64> {
        self.transform.rotate_ccw(&mut self.store)
    }

    /// Delete the active stamp.
    pub fn delete_active(&mut self) -> Option<StampId> {
        self.transform.delete_active(&mut self.store)
    }

    /// Latest preview accepted for display.
    pub fn preview(&self) -> Option<Arc<PreviewFrame>> {
        self.preview.latest_preview()
    }

    /// The session's preview scheduler.
    pub fn preview_scheduler(&self) -> &PreviewScheduler {
        &self.preview
    }

    /// Replace the photo and start over with an empty store.
    ///
    /// In-flight previews of the old photo are superseded and never shown.
    pub fn retake(&mut self, photo_bytes: impl Into<Vec<u8>>) {
        self.preview.invalidate();
        self.photo = BasePhoto::new(photo_bytes);
        self.store = fresh_store(self.store.scale_bounds(), &self.preview, &self.photo);
        self.interaction.reset();
        self.preview.request(&self.photo, self.store.stamps());
    }

    /// Authoritative composite of the current store.
    pub fn compose_final(&self) -> PhotostampResult<ComposedImage> {
        self.compositor
            .compose(&self.photo, self.store.stamps(), &self.catalog)
    }

    /// Compose the current stamps and post the result.
    ///
    /// A photo that cannot be decoded fails with [`PhotostampError::Decode`]; any other compose
    /// or persistence failure is [`PhotostampError::Submission`]. The store is never modified.
    #[tracing::instrument(skip_all, fields(stamps = self.store.len()))]
    pub fn submit(
        &self,
        draft: &PostDraft,
        owner: &Owner,
        objects: &mut dyn ObjectStore,
        docs: &mut dyn DocumentStore,
    ) -> PhotostampResult<SubmitReceipt> {
        if owner.uid.trim().is_empty() {
            return Err(PhotostampError::submission("not signed in"));
        }
        let composed = self.compose_final().map_err(|e| match e {
            PhotostampError::Decode(_) | PhotostampError::Submission(_) => e,
            other => PhotostampError::submission(format!("compose: {other}")),
        })?;
        if !composed.skipped.is_empty() {
            tracing::warn!(skipped = composed.skipped.len(), "posting without undecodable stamps");
        }
        publish(
            &composed.encoded,
            COMPOSITE_CONTENT_TYPE,
            draft,
            owner,
            objects,
            docs,
        )
    }

    /// [`Self::submit`], but post the raw photo when it cannot be composed.
    ///
    /// The receipt's `fallback_warning` carries the decode failure.
    pub fn submit_with_fallback(
        &self,
        draft: &PostDraft,
        owner: &Owner,
        objects: &mut dyn ObjectStore,
        docs: &mut dyn DocumentStore,
    ) -> PhotostampResult<SubmitReceipt> {
        match self.submit(draft, owner, objects, docs) {
            Err(e) if e.is_decode() => {
                tracing::warn!(error = %e, "composite unavailable; posting raw photo");
                let raw = self.photo.bytes();
                let content_type = image::guess_format(raw)
                    .map(|f| f.to_mime_type())
                    .unwrap_or("application/octet-stream");
                let mut receipt = publish(raw, content_type, draft, owner, objects, docs)?;
                receipt.fallback_warning = Some(e.to_string());
                Ok(receipt)
            }
            other => other,
        }
    }

    /// Close the session. Outstanding previews are superseded.
    pub fn end(self) {
        self.preview.invalidate();
    }
}

fn fresh_store(bounds: ScaleBounds, preview: &PreviewScheduler, photo: &BasePhoto) -> OverlayStore {
    let mut store = OverlayStore::new(bounds);
    store.subscribe(PreviewObserver::new(preview.clone(), photo.clone()));
    store
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
