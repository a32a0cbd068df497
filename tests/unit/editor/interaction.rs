use std::f64::consts::FRAC_PI_4;
use std::io::Cursor;

use super::*;
use crate::foundation::core::NormPoint;

const FRACTION: f64 = 0.18;

fn frame() -> Rect {
    Rect::new(0.0, 0.0, 224.0, 296.0)
}

fn catalog() -> StampCatalog {
    let img = image::RgbaImage::from_pixel(80, 80, image::Rgba([0, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    StampCatalog::builder()
        .insert("stamp1", buf)
        .unwrap()
        .build()
}

fn ev(pointer_id: PointerId, phase: PointerPhase, x: f64, y: f64) -> PointerEvent {
    PointerEvent::new(pointer_id, phase, Point::new(x, y), frame())
}

fn controller_with_pending() -> InteractionController {
    let mut c = InteractionController::new(FRACTION, None);
    c.set_pending_asset(Some(AssetRef::new("stamp1")));
    c
}

#[test]
fn tap_with_pending_asset_places_and_captures() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let mut c = controller_with_pending();

    let out = c.handle(&ev(1, PointerPhase::Down, 56.0, 74.0), &mut store, &cat);
    let InteractionOutcome::Placed(id) = out else {
        panic!("expected placement, got {out:?}");
    };
    assert_eq!(store.active(), Some(id));
    assert_eq!(
        c.state(),
        InteractionState::Dragging(DragSession {
            stamp: id,
            pointer_id: 1
        })
    );
    assert_eq!(store.get(id).unwrap().position(), NormPoint { x: 0.25, y: 0.25 });
}

#[test]
fn tap_without_pending_asset_clears_selection() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let id = store.place(AssetRef::new("stamp1"), 0.1, 0.1);
    assert_eq!(store.active(), Some(id));

    let mut c = InteractionController::new(FRACTION, None);
    let out = c.handle(&ev(1, PointerPhase::Down, 200.0, 250.0), &mut store, &cat);
    assert_eq!(out, InteractionOutcome::Deselected);
    assert_eq!(store.active(), None);
    assert_eq!(c.state(), InteractionState::Idle);
}

#[test]
fn grab_drag_release_keeps_stamp_active() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let a = store.place(AssetRef::new("stamp1"), 0.5, 0.5);
    store.select(None);

    let mut c = controller_with_pending();
    assert_eq!(
        c.handle(&ev(3, PointerPhase::Down, 112.0, 148.0), &mut store, &cat),
        InteractionOutcome::Grabbed(a)
    );
    assert_eq!(store.len(), 1, "grabbing must not place a new stamp");
    assert_eq!(store.active(), Some(a));

    assert_eq!(
        c.handle(&ev(3, PointerPhase::Move, 168.0, 74.0), &mut store, &cat),
        InteractionOutcome::Moved(a)
    );
    assert_eq!(store.get(a).unwrap().position(), NormPoint { x: 0.75, y: 0.25 });

    assert_eq!(
        c.handle(&ev(3, PointerPhase::Up, 168.0, 74.0), &mut store, &cat),
        InteractionOutcome::Released(a)
    );
    assert_eq!(c.state(), InteractionState::Idle);
    assert_eq!(store.active(), Some(a));
}

#[test]
fn foreign_pointer_cannot_drive_the_drag() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let mut c = controller_with_pending();
    let InteractionOutcome::Placed(id) =
        c.handle(&ev(3, PointerPhase::Down, 112.0, 148.0), &mut store, &cat)
    else {
        panic!("expected placement");
    };
    let before = store.get(id).unwrap().position();

    assert_eq!(
        c.handle(&ev(7, PointerPhase::Move, 10.0, 10.0), &mut store, &cat),
        InteractionOutcome::Ignored
    );
    assert_eq!(
        c.handle(&ev(7, PointerPhase::Up, 10.0, 10.0), &mut store, &cat),
        InteractionOutcome::Ignored
    );
    assert_eq!(
        c.handle(&ev(7, PointerPhase::Down, 10.0, 10.0), &mut store, &cat),
        InteractionOutcome::Ignored
    );
    assert_eq!(store.get(id).unwrap().position(), before);
    assert_eq!(store.len(), 1);
    assert!(matches!(c.state(), InteractionState::Dragging(d) if d.pointer_id == 3));
}

#[test]
fn cancel_releases_capture() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let mut c = controller_with_pending();
    c.handle(&ev(2, PointerPhase::Down, 100.0, 100.0), &mut store, &cat);
    let out = c.handle(&ev(2, PointerPhase::Cancel, 0.0, 0.0), &mut store, &cat);
    assert!(matches!(out, InteractionOutcome::Released(_)));
    assert_eq!(c.state(), InteractionState::Idle);
}

#[test]
fn drag_outside_frame_clamps_to_edge() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let mut c = controller_with_pending();
    let InteractionOutcome::Placed(id) =
        c.handle(&ev(1, PointerPhase::Down, 100.0, 100.0), &mut store, &cat)
    else {
        panic!("expected placement");
    };
    c.handle(&ev(1, PointerPhase::Move, -500.0, 900.0), &mut store, &cat);
    assert_eq!(store.get(id).unwrap().position(), NormPoint { x: 0.0, y: 1.0 });
}

#[test]
fn idle_moves_and_out_of_frame_downs_are_ignored() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let mut c = controller_with_pending();
    assert_eq!(
        c.handle(&ev(1, PointerPhase::Move, 50.0, 50.0), &mut store, &cat),
        InteractionOutcome::Ignored
    );
    assert_eq!(
        c.handle(&ev(1, PointerPhase::Down, 400.0, 50.0), &mut store, &cat),
        InteractionOutcome::Ignored
    );
    assert!(store.is_empty());
}

#[test]
fn hit_region_follows_scale() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let id = store.place(AssetRef::new("stamp1"), 0.5, 0.5);
    let c = InteractionController::new(FRACTION, None);
    // unscaled half-width on a 224px frame is 20.16px
    let probe = Point::new(112.0 + 40.0, 148.0);
    assert_eq!(c.hit_test(&store, &cat, probe, frame()), None);

    store.update(id, StampPatch::scale(3.0));
    assert_eq!(c.hit_test(&store, &cat, probe, frame()), Some(id));
}

#[test]
fn hit_region_follows_rotation() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let id = store.place(AssetRef::new("stamp1"), 0.5, 0.5);
    let c = InteractionController::new(FRACTION, None);
    let probe = Point::new(112.0 + 25.0, 148.0);
    assert_eq!(c.hit_test(&store, &cat, probe, frame()), None);

    store.update(id, StampPatch::rotation(FRAC_PI_4));
    assert_eq!(c.hit_test(&store, &cat, probe, frame()), Some(id));
}

#[test]
fn topmost_stamp_wins_overlap() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let _below = store.place(AssetRef::new("stamp1"), 0.5, 0.5);
    let above = store.place(AssetRef::new("stamp1"), 0.52, 0.5);
    let c = InteractionController::new(FRACTION, None);
    assert_eq!(
        c.hit_test(&store, &cat, Point::new(114.0, 148.0), frame()),
        Some(above)
    );
}

#[test]
fn stamp_limit_refuses_placement() {
    let (cat, mut store) = (catalog(), OverlayStore::default());
    let mut c = InteractionController::new(FRACTION, Some(1));
    c.set_pending_asset(Some(AssetRef::new("stamp1")));

    assert!(matches!(
        c.handle(&ev(1, PointerPhase::Down, 20.0, 20.0), &mut store, &cat),
        InteractionOutcome::Placed(_)
    ));
    c.handle(&ev(1, PointerPhase::Up, 20.0, 20.0), &mut store, &cat);

    assert_eq!(
        c.handle(&ev(1, PointerPhase::Down, 200.0, 280.0), &mut store, &cat),
        InteractionOutcome::LimitReached
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.active(), None);
    assert_eq!(c.state(), InteractionState::Idle);
}
