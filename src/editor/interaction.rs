use crate::assets::catalog::{AssetRef, StampCatalog};
use crate::editor::store::{OverlayStore, StampId, StampPatch};
use crate::foundation::core::{Point, Rect};
use crate::geometry::mapper::to_normalized;
use crate::geometry::placement::StampPlacement;

/// Host-assigned pointer identifier.
pub type PointerId = u64;

/// Pointer lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    /// Contact started / button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Contact ended / button released.
    Up,
    /// The platform cancelled the pointer.
    Cancel,
}

/// One raw pointer event from the host UI, in device coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Pointer identifier.
    pub pointer_id: PointerId,
    /// Phase.
    pub phase: PointerPhase,
    /// Device-space position.
    pub position: Point,
    /// On-screen rectangle of the photo frame at the time of the event.
    pub frame: Rect,
}

impl PointerEvent {
    /// Convenience constructor.
    pub fn new(pointer_id: PointerId, phase: PointerPhase, position: Point, frame: Rect) -> Self {
        Self {
            pointer_id,
            phase,
            position,
            frame,
        }
    }
}

/// Exclusive capture: only `pointer_id` may move or release `stamp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragSession {
    /// Stamp being dragged.
    pub stamp: StampId,
    /// Pointer that started the drag.
    pub pointer_id: PointerId,
}

/// Controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionState {
    /// No pointer session.
    #[default]
    Idle,
    /// A stamp follows the captured pointer.
    Dragging(DragSession),
}

/// What a pointer event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Nothing happened (foreign pointer, idle move, event outside the frame).
    Ignored,
    /// A new stamp was placed and captured.
    Placed(StampId),
    /// An existing stamp was selected and captured.
    Grabbed(StampId),
    /// Empty area tapped with no pending asset; selection cleared.
    Deselected,
    /// The dragged stamp moved.
    Moved(StampId),
    /// The drag ended; the stamp stays active.
    Released(StampId),
    /// A placement was refused because the stamp limit is reached; selection cleared.
    LimitReached,
}

/// Turns raw pointer events into placement, selection, and drag on an [`OverlayStore`].
///
/// Handles a single pointer session at a time; other pointers are ignored until it ends.
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: InteractionState,
    pending_asset: Option<AssetRef>,
    stamp_width_fraction: f64,
    max_stamps: Option<usize>,
}

impl InteractionController {
    /// Controller sizing hit regions with `stamp_width_fraction` of the frame width.
    pub fn new(stamp_width_fraction: f64, max_stamps: Option<usize>) -> Self {
        Self {
            state: InteractionState::Idle,
            pending_asset: None,
            stamp_width_fraction,
            max_stamps,
        }
    }

    /// Current state.
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Palette selection used for the next tap on empty photo area.
    pub fn pending_asset(&self) -> Option<&AssetRef> {
        self.pending_asset.as_ref()
    }

    /// Choose (or clear) the palette asset.
    pub fn set_pending_asset(&mut self, asset: Option<AssetRef>) {
        self.pending_asset = asset;
    }

    /// Drop any pointer session, e.g. when the store is replaced.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Feed one pointer event.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        store: &mut OverlayStore,
        catalog: &StampCatalog,
    ) -> InteractionOutcome {
        match (self.state, event.phase) {
            (InteractionState::Idle, PointerPhase::Down) => self.pointer_down(event, store, catalog),
            (InteractionState::Idle, _) => InteractionOutcome::Ignored,
            (InteractionState::Dragging(drag), phase) => {
                if drag.pointer_id != event.pointer_id {
                    return InteractionOutcome::Ignored;
                }
                match phase {
                    PointerPhase::Down => InteractionOutcome::Ignored,
                    PointerPhase::Move => {
                        let pos = to_normalized(event.position, event.frame);
                        store.update(drag.stamp, StampPatch::position(pos));
                        InteractionOutcome::Moved(drag.stamp)
                    }
                    PointerPhase::Up | PointerPhase::Cancel => {
                        self.state = InteractionState::Idle;
                        InteractionOutcome::Released(drag.stamp)
                    }
                }
            }
        }
    }

    fn pointer_down(
        &mut self,
        event: &PointerEvent,
        store: &mut OverlayStore,
        catalog: &StampCatalog,
    ) -> InteractionOutcome {
        if !event.frame.abs().contains(event.position) {
            return InteractionOutcome::Ignored;
        }

        if let Some(id) = self.hit_test(store, catalog, event.position, event.frame) {
            store.select(Some(id));
            self.capture(id, event.pointer_id);
            return InteractionOutcome::Grabbed(id);
        }

        let Some(asset) = self.pending_asset.clone() else {
            store.select(None);
            return InteractionOutcome::Deselected;
        };
        if self.max_stamps.is_some_and(|max| store.len() >= max) {
            tracing::warn!(limit = ?self.max_stamps, "stamp limit reached; placement refused");
            store.select(None);
            return InteractionOutcome::LimitReached;
        }

        let pos = to_normalized(event.position, event.frame);
        let id = store.place(asset, pos.x, pos.y);
        self.capture(id, event.pointer_id);
        InteractionOutcome::Placed(id)
    }

    fn capture(&mut self, stamp: StampId, pointer_id: PointerId) {
        self.state = InteractionState::Dragging(DragSession { stamp, pointer_id });
    }

    /// Topmost stamp whose upright bounding box (after scale and rotation) contains `point`.
    pub fn hit_test(
        &self,
        store: &OverlayStore,
        catalog: &StampCatalog,
        point: Point,
        frame: Rect,
    ) -> Option<StampId> {
        let frame = frame.abs();
        store.stamps().iter().rev().find_map(|stamp| {
            let (w, h) = catalog
                .intrinsic_size(stamp.asset())
                .unwrap_or((1.0, 1.0));
            let placement = StampPlacement::resolve(
                frame,
                stamp.position(),
                self.stamp_width_fraction,
                stamp.scale(),
                stamp.rotation(),
            );
            placement
                .bounds(w, h)
                .contains(point)
                .then(|| stamp.id())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/interaction.rs"]
mod tests;
