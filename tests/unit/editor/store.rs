use std::sync::{Arc, Mutex};

use super::*;

fn asset(name: &str) -> AssetRef {
    AssetRef::new(name)
}

#[test]
fn place_appends_with_defaults_and_selects() {
    let mut store = OverlayStore::default();
    let a = store.place(asset("stamp1"), 0.25, 0.75);
    let b = store.place(asset("stamp2"), 0.5, 0.5);

    assert_ne!(a, b);
    assert_eq!(store.active(), Some(b));
    let ids: Vec<StampId> = store.stamps().iter().map(Stamp::id).collect();
    assert_eq!(ids, vec![a, b]);

    let s = store.get(a).unwrap();
    assert_eq!(s.scale(), 1.0);
    assert_eq!(s.rotation(), 0.0);
    assert_eq!(s.position(), NormPoint { x: 0.25, y: 0.75 });
}

#[test]
fn place_clamps_position() {
    let mut store = OverlayStore::default();
    let id = store.place(asset("s"), -2.0, 7.0);
    assert_eq!(store.get(id).unwrap().position(), NormPoint { x: 0.0, y: 1.0 });
}

#[test]
fn select_unknown_clears_selection() {
    let mut store = OverlayStore::default();
    let a = store.place(asset("s"), 0.5, 0.5);
    assert_eq!(store.active(), Some(a));

    let b = store.place(asset("s"), 0.1, 0.1);
    store.remove(b);
    store.select(Some(a));
    assert_eq!(store.active(), Some(a));
    store.select(Some(b));
    assert_eq!(store.active(), None);
}

#[test]
fn update_reclamps_scale_and_position() {
    let mut store = OverlayStore::default();
    let id = store.place(asset("s"), 0.5, 0.5);

    store.update(id, StampPatch::scale(10.0));
    assert_eq!(store.get(id).unwrap().scale(), 3.0);
    store.update(id, StampPatch::scale(-5.0));
    assert_eq!(store.get(id).unwrap().scale(), 0.3);

    store.update(
        id,
        StampPatch {
            x: Some(1.5),
            y: Some(-0.5),
            ..StampPatch::default()
        },
    );
    assert_eq!(store.get(id).unwrap().position(), NormPoint { x: 1.0, y: 0.0 });
}

#[test]
fn update_ignores_non_finite_values() {
    let mut store = OverlayStore::default();
    let id = store.place(asset("s"), 0.5, 0.5);
    store.update(
        id,
        StampPatch {
            x: Some(f64::NAN),
            scale: Some(f64::INFINITY),
            rotation: Some(f64::NAN),
            ..StampPatch::default()
        },
    );
    let s = store.get(id).unwrap();
    assert_eq!(s.position().x, 0.5);
    assert_eq!(s.scale(), 1.0);
    assert_eq!(s.rotation(), 0.0);
}

#[test]
fn rotation_accumulates_unbounded() {
    let mut store = OverlayStore::default();
    let id = store.place(asset("s"), 0.5, 0.5);
    store.update(id, StampPatch::rotation(100.0));
    assert_eq!(store.get(id).unwrap().rotation(), 100.0);
}

#[test]
fn update_and_remove_unknown_ids_are_noops() {
    let mut store = OverlayStore::default();
    let id = store.place(asset("s"), 0.5, 0.5);
    store.remove(id);
    let rev = store.revision();
    store.update(id, StampPatch::scale(2.0));
    store.remove(id);
    assert_eq!(store.revision(), rev);
    assert!(store.is_empty());
}

#[test]
fn removing_active_clears_selection_but_not_others() {
    let mut store = OverlayStore::default();
    let a = store.place(asset("s"), 0.1, 0.1);
    let b = store.place(asset("s"), 0.9, 0.9);

    store.remove(a);
    assert_eq!(store.active(), Some(b));
    store.remove(b);
    assert_eq!(store.active(), None);
}

#[test]
fn every_mutation_notifies_subscribers() {
    let seen: Arc<Mutex<Vec<(StoreEvent, usize)>>> = Arc::default();
    let mut store = OverlayStore::default();
    let sink = Arc::clone(&seen);
    store.subscribe(move |event: &StoreEvent, stamps: &[Stamp]| {
        sink.lock().unwrap().push((event.clone(), stamps.len()));
    });

    let a = store.place(asset("s"), 0.5, 0.5);
    store.update(a, StampPatch::scale(2.0));
    store.select(None);
    store.select(None);
    store.remove(a);

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (StoreEvent::Placed(a), 1),
            (StoreEvent::Updated(a), 1),
            (StoreEvent::Selected(None), 1),
            (StoreEvent::Removed(a), 0),
        ]
    );
    assert_eq!(store.revision(), 4);
    assert!(!StoreEvent::Selected(None).affects_render());
    assert!(StoreEvent::Removed(a).affects_render());
}

#[test]
fn scale_bounds_reject_unusable_ranges() {
    assert!(ScaleBounds::new(3.0, 0.3).is_err());
    assert!(ScaleBounds::new(0.0, 1.0).is_err());
    assert!(ScaleBounds::new(-1.0, 1.0).is_err());
    assert!(ScaleBounds::new(f64::NAN, 1.0).is_err());
    assert!(ScaleBounds::new(0.5, f64::INFINITY).is_err());

    let fixed = ScaleBounds::new(2.0, 2.0).unwrap();
    assert_eq!((fixed.min(), fixed.max()), (2.0, 2.0));
}

#[test]
fn store_with_checked_bounds_clamps_every_scale() {
    let mut store = OverlayStore::new(ScaleBounds::new(0.5, 2.0).unwrap());
    let id = store.place(asset("s"), 0.5, 0.5);
    assert_eq!(store.get(id).unwrap().scale(), 1.0);

    store.update(id, StampPatch::scale(9.0));
    assert_eq!(store.get(id).unwrap().scale(), 2.0);
    store.update(id, StampPatch::scale(0.01));
    assert_eq!(store.get(id).unwrap().scale(), 0.5);
}
