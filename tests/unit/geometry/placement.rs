use std::f64::consts::{FRAC_PI_4, PI};

use super::*;

const EPS: f64 = 1e-9;

#[test]
fn cover_square_photo_into_tall_output_crops_sides() {
    let out = OutputSize::reference();
    let s = cover_scale(1000.0, 1000.0, out);
    assert!((s - 1.427).abs() < EPS);

    let win = cover_window(1000.0, 1000.0, out);
    assert!((win.height() - 1000.0).abs() < EPS);
    assert!((win.width() - 1080.0 / 1.427).abs() < EPS);
    assert!((win.center().x - 500.0).abs() < EPS);
    assert!((win.center().y - 500.0).abs() < EPS);
}

#[test]
fn cover_affine_maps_window_onto_output() {
    let out = OutputSize::reference();
    let a = cover_affine(4000.0, 3000.0, out);
    let win = cover_window(4000.0, 3000.0, out);
    let p0 = a * Point::new(win.x0, win.y0);
    let p1 = a * Point::new(win.x1, win.y1);
    assert!(p0.x.abs() < 1e-6 && p0.y.abs() < 1e-6);
    assert!((p1.x - 1080.0).abs() < 1e-6 && (p1.y - 1427.0).abs() < 1e-6);
}

#[test]
fn default_stamp_is_194_4_px_wide_on_reference_output() {
    let out = OutputSize::reference();
    let p = StampPlacement::resolve(out.rect(), NormPoint::CENTER, 0.18, 1.0, 0.0);
    assert!((p.width - 194.4).abs() < EPS);
    assert!((p.center.x - 540.0).abs() < EPS);
    assert!((p.center.y - 713.5).abs() < EPS);

    let b = p.bounds(80.0, 80.0);
    assert!((b.width() - 194.4).abs() < 1e-6);
    assert!((b.center().x - 540.0).abs() < 1e-6);
}

#[test]
fn rotation_is_reduced_mod_two_pi() {
    assert!((effective_rotation(2.0 * PI + 0.5) - 0.5).abs() < EPS);
    assert!((effective_rotation(-0.5) - (2.0 * PI - 0.5)).abs() < EPS);
    assert_eq!(effective_rotation(f64::INFINITY), 0.0);
}

#[test]
fn rotated_bounds_grow_to_enclose_the_stamp() {
    let target = Rect::new(0.0, 0.0, 100.0, 100.0);
    let p = StampPlacement::resolve(target, NormPoint::CENTER, 0.2, 1.0, FRAC_PI_4);
    let b = p.bounds(10.0, 10.0);
    let expected = 20.0 * 2f64.sqrt();
    assert!((b.width() - expected).abs() < 1e-6);
    assert!((b.height() - expected).abs() < 1e-6);
    assert!((b.center().x - 50.0).abs() < 1e-6);
}

#[test]
fn non_square_asset_keeps_aspect() {
    let target = Rect::new(0.0, 0.0, 1000.0, 1000.0);
    let p = StampPlacement::resolve(target, NormPoint::CENTER, 0.1, 2.0, 0.0);
    assert!((p.width - 200.0).abs() < EPS);
    assert!((p.height_for(40.0, 20.0) - 100.0).abs() < EPS);
}
