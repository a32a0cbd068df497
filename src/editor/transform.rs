use crate::config::EditorConfig;
use crate::editor::store::{OverlayStore, StampId, StampPatch};

/// Discrete scale/rotate/delete steps applied to the store's active stamp.
///
/// Every operation is a no-op returning `None` when nothing is selected. Scale is clamped by the
/// store; rotation accumulates without normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformEditor {
    scale_step: f64,
    rotate_step: f64,
}

impl Default for TransformEditor {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl TransformEditor {
    /// Editor with explicit step sizes (scale units, radians).
    pub fn new(scale_step: f64, rotate_step: f64) -> Self {
        Self {
            scale_step,
            rotate_step,
        }
    }

    /// Editor using the configured button steps.
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self::new(cfg.scale_step, cfg.rotate_step_rad)
    }

    /// Add `delta` to the active stamp's scale. Returns the stored (clamped) scale.
    pub fn scale_by(&self, store: &mut OverlayStore, delta: f64) -> Option<f64> {
        let stamp = store.active_stamp()?;
        let (id, next) = (stamp.id(), stamp.scale() + delta);
        store.update(id, StampPatch::scale(next));
        store.get(id).map(|s| s.scale())
    }

    /// Add `delta` radians to the active stamp's rotation. Returns the stored rotation.
    pub fn rotate_by(&self, store: &mut OverlayStore, delta: f64) -> Option<f64> {
        let stamp = store.active_stamp()?;
        let (id, next) = (stamp.id(), stamp.rotation() + delta);
        store.update(id, StampPatch::rotation(next));
        store.get(id).map(|s| s.rotation())
    }

    /// One "+" step.
    pub fn scale_up(&self, store: &mut OverlayStore) -> Option<f64> {
        self.scale_by(store, self.scale_step)
    }

    /// One "-" step.
    pub fn scale_down(&self, store: &mut OverlayStore) -> Option<f64> {
        self.scale_by(store, -self.scale_step)
    }

    /// One clockwise step (positive radians in y-down raster space).
    pub fn rotate_cw(&self, store: &mut OverlayStore) -> Option<f64> {
        self.rotate_by(store, self.rotate_step)
    }

    /// One counter-clockwise step.
    pub fn rotate_ccw(&self, store: &mut OverlayStore) -> Option<f64> {
        self.rotate_by(store, -self.rotate_step)
    }

    /// Remove the active stamp. Returns the removed id.
    pub fn delete_active(&self, store: &mut OverlayStore) -> Option<StampId> {
        let id = store.active()?;
        store.remove(id);
        Some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/transform.rs"]
mod tests;
