use crate::assets::catalog::AssetRef;
use crate::foundation::core::NormPoint;
use crate::foundation::error::{PhotostampError, PhotostampResult};

/// Session-unique stamp identifier. Never reused within a store.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct StampId(u64);

impl StampId {
    /// Raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Inclusive scale bounds enforced on every mutation.
///
/// Always finite with `0 < min <= max`, so clamping never panics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBounds {
    min: f64,
    max: f64,
}

impl ScaleBounds {
    /// Bounds `[min, max]`. Rejects non-finite values, `min <= 0` and `min > max`.
    pub fn new(min: f64, max: f64) -> PhotostampResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(PhotostampError::validation(format!(
                "scale bounds must satisfy 0 < min <= max (got {min}..={max})"
            )));
        }
        Ok(Self { min, max })
    }

    /// Smallest allowed scale.
    pub fn min(self) -> f64 {
        self.min
    }

    /// Largest allowed scale.
    pub fn max(self) -> f64 {
        self.max
    }

    /// Clamp `scale` into the bounds.
    pub fn clamp(self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.3, max: 3.0 }
    }
}

/// One placed decoration.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Stamp {
    id: StampId,
    asset: AssetRef,
    position: NormPoint,
    scale: f64,
    rotation: f64,
}

impl Stamp {
    /// Identifier assigned at placement.
    pub fn id(&self) -> StampId {
        self.id
    }

    /// Catalog image drawn for this stamp.
    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }

    /// Center in normalized photo space.
    pub fn position(&self) -> NormPoint {
        self.position
    }

    /// Scale relative to the base stamp size, within the store's [`ScaleBounds`].
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in radians, unbounded. Reduced mod 2pi only when drawn.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}

/// Partial update merged into a stamp by [`OverlayStore::update`].
///
/// Non-finite numbers are ignored and leave the field unchanged.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct StampPatch {
    /// Replacement catalog image.
    pub asset: Option<AssetRef>,
    /// New normalized x.
    pub x: Option<f64>,
    /// New normalized y.
    pub y: Option<f64>,
    /// New scale, re-clamped.
    pub scale: Option<f64>,
    /// New rotation in radians.
    pub rotation: Option<f64>,
}

impl StampPatch {
    /// Patch that moves the stamp.
    pub fn position(p: NormPoint) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Self::default()
        }
    }

    /// Patch that sets the scale.
    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    /// Patch that sets the rotation.
    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }
}

/// What changed in the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// A stamp was appended and made active.
    Placed(StampId),
    /// The active stamp changed.
    Selected(Option<StampId>),
    /// A stamp's fields changed.
    Updated(StampId),
    /// A stamp was deleted.
    Removed(StampId),
}

impl StoreEvent {
    /// `false` for selection changes, which never alter rendered pixels.
    pub fn affects_render(&self) -> bool {
        !matches!(self, StoreEvent::Selected(_))
    }
}

/// Subscriber notified after every store mutation with the resulting stamp list.
pub trait StoreObserver: Send {
    /// Called synchronously after the mutation was applied.
    fn on_change(&mut self, event: &StoreEvent, stamps: &[Stamp]);
}

impl<F> StoreObserver for F
where
    F: FnMut(&StoreEvent, &[Stamp]) + Send,
{
    fn on_change(&mut self, event: &StoreEvent, stamps: &[Stamp]) {
        self(event, stamps)
    }
}

/// Ordered stamp collection; insertion order is render order.
///
/// Single source of truth for what is drawn. All operations are synchronous and total: unknown
/// ids are no-ops, positions are clamped into `[0, 1]`, and scale into [`ScaleBounds`].
pub struct OverlayStore {
    stamps: Vec<Stamp>,
    active: Option<StampId>,
    next_id: u64,
    bounds: ScaleBounds,
    revision: u64,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl std::fmt::Debug for OverlayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStore")
            .field("stamps", &self.stamps)
            .field("active", &self.active)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new(ScaleBounds::default())
    }
}

impl OverlayStore {
    /// Empty store enforcing `bounds`.
    pub fn new(bounds: ScaleBounds) -> Self {
        Self {
            stamps: Vec::new(),
            active: None,
            next_id: 1,
            bounds,
            revision: 0,
            observers: Vec::new(),
        }
    }

    /// Register a subscriber for all subsequent mutations.
    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Stamps in render order (oldest first).
    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    /// Number of stamps.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// `true` when no stamp is placed.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Look up a stamp.
    pub fn get(&self, id: StampId) -> Option<&Stamp> {
        self.stamps.iter().find(|s| s.id == id)
    }

    /// Currently selected stamp id.
    pub fn active(&self) -> Option<StampId> {
        self.active
    }

    /// Currently selected stamp.
    pub fn active_stamp(&self) -> Option<&Stamp> {
        self.active.and_then(|id| self.get(id))
    }

    /// Scale bounds enforced by this store.
    pub fn scale_bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Count of notified mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a stamp at the clamped position with scale 1 and rotation 0, and select it.
    pub fn place(&mut self, asset: AssetRef, x: f64, y: f64) -> StampId {
        let id = StampId(self.next_id);
        self.next_id += 1;
        self.stamps.push(Stamp {
            id,
            asset,
            position: NormPoint::clamped(x, y),
            scale: self.bounds.clamp(1.0),
            rotation: 0.0,
        });
        self.active = Some(id);
        self.notify(StoreEvent::Placed(id));
        id
    }

    /// Select a stamp, or clear the selection. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<StampId>) {
        let next = id.filter(|&id| self.get(id).is_some());
        if next != self.active {
            self.active = next;
            self.notify(StoreEvent::Selected(next));
        }
    }

    /// Merge `patch` into a stamp and re-clamp. Unknown ids are a no-op.
    pub fn update(&mut self, id: StampId, patch: StampPatch) {
        let bounds = self.bounds;
        let Some(stamp) = self.stamps.iter_mut().find(|s| s.id == id) else {
            return;
        };
        let before = stamp.clone();

        if let Some(asset) = patch.asset {
            stamp.asset = asset;
        }
        let x = patch.x.filter(|v| v.is_finite()).unwrap_or(stamp.position.x);
        let y = patch.y.filter(|v| v.is_finite()).unwrap_or(stamp.position.y);
        stamp.position = NormPoint::clamped(x, y);
        if let Some(scale) = patch.scale.filter(|v| v.is_finite()) {
            stamp.scale = scale;
        }
        stamp.scale = bounds.clamp(stamp.scale);
        if let Some(rotation) = patch.rotation.filter(|v| v.is_finite()) {
            stamp.rotation = rotation;
        }

        if *stamp != before {
            self.notify(StoreEvent::Updated(id));
        }
    }

    /// Delete a stamp; clears the selection if it was active.
    pub fn remove(&mut self, id: StampId) {
        let Some(idx) = self.stamps.iter().position(|s| s.id == id) else {
            return;
        };
        self.stamps.remove(idx);
        if self.active == Some(id) {
            self.active = None;
        }
        self.notify(StoreEvent::Removed(id));
    }

    fn notify(&mut self, event: StoreEvent) {
        self.revision += 1;
        for observer in &mut self.observers {
            observer.on_change(&event, &self.stamps);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/store.rs"]
mod tests;
