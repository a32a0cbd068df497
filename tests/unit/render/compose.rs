use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;

use super::*;
use crate::editor::store::{OverlayStore, StampPatch};

fn png(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    png(image::RgbaImage::from_pixel(w, h, image::Rgba(rgba)))
}

fn settings(w: u32, h: u32, fraction: f64) -> ComposeSettings {
    ComposeSettings {
        output: OutputSize::new(w, h).unwrap(),
        stamp_width_fraction: fraction,
        jpeg_quality: 90,
        background_rgba: [255, 255, 255, 255],
    }
}

fn close(px: [u8; 4], want: [u8; 3]) -> bool {
    px[..3]
        .iter()
        .zip(want)
        .all(|(&a, b)| (i16::from(a) - i16::from(b)).abs() <= 3)
}

fn catalog() -> StampCatalog {
    StampCatalog::builder()
        .insert("red", solid(40, 40, [255, 0, 0, 255]))
        .unwrap()
        .insert("blue", solid(40, 40, [0, 0, 255, 255]))
        .unwrap()
        .insert("wide", solid(80, 40, [0, 0, 0, 255]))
        .unwrap()
        .build()
}

#[test]
fn photo_is_cover_fitted_and_center_cropped() {
    let mut img = image::RgbaImage::from_pixel(200, 100, image::Rgba([255, 0, 0, 255]));
    for y in 0..100 {
        for x in 100..200 {
            img.put_pixel(x, y, image::Rgba([0, 0, 255, 255]));
        }
        for x in 0..40 {
            img.put_pixel(x, y, image::Rgba([0, 255, 0, 255]));
        }
    }
    let photo = BasePhoto::new(png(img));
    let out = Compositor::new(settings(100, 100, 0.18))
        .render(&photo, &[], &StampCatalog::default())
        .unwrap();

    assert_eq!((out.frame.width, out.frame.height), (100, 100));
    assert!(close(out.frame.pixel(10, 50).unwrap(), [255, 0, 0]));
    assert!(close(out.frame.pixel(90, 50).unwrap(), [0, 0, 255]));
    assert!(close(out.frame.pixel(0, 0).unwrap(), [255, 0, 0]));
}

#[test]
fn transparent_photo_shows_background() {
    let photo = BasePhoto::new(solid(10, 10, [0, 0, 0, 0]));
    let mut s = settings(20, 20, 0.18);
    s.background_rgba = [0, 128, 0, 255];
    let out = Compositor::new(s)
        .render(&photo, &[], &StampCatalog::default())
        .unwrap();
    assert!(close(out.frame.pixel(5, 5).unwrap(), [0, 128, 0]));
}

#[test]
fn later_stamps_draw_on_top() {
    let cat = catalog();
    let mut store = OverlayStore::default();
    store.place(AssetRef::new("red"), 0.5, 0.5);
    store.place(AssetRef::new("blue"), 0.5, 0.5);
    let photo = BasePhoto::new(solid(10, 10, [255, 255, 255, 255]));

    let out = Compositor::new(settings(200, 200, 0.2))
        .render(&photo, store.stamps(), &cat)
        .unwrap();
    assert!(close(out.frame.pixel(100, 100).unwrap(), [0, 0, 255]));
    assert!(out.skipped.is_empty());
}

#[test]
fn rotation_turns_stamp_about_its_center() {
    let cat = catalog();
    let photo = BasePhoto::new(solid(10, 10, [255, 255, 255, 255]));
    let compositor = Compositor::new(settings(200, 200, 0.5));
    let mut store = OverlayStore::default();
    let id = store.place(AssetRef::new("wide"), 0.5, 0.5);

    // 100 x 50 drawn, centered at (100, 100)
    let upright = compositor.render(&photo, store.stamps(), &cat).unwrap();
    assert!(close(upright.frame.pixel(140, 100).unwrap(), [0, 0, 0]));
    assert!(close(upright.frame.pixel(100, 140).unwrap(), [255, 255, 255]));

    store.update(id, StampPatch::rotation(FRAC_PI_2));
    let turned = compositor.render(&photo, store.stamps(), &cat).unwrap();
    assert!(close(turned.frame.pixel(140, 100).unwrap(), [255, 255, 255]));
    assert!(close(turned.frame.pixel(100, 140).unwrap(), [0, 0, 0]));
}

#[test]
fn full_turns_render_like_no_rotation() {
    let cat = catalog();
    let photo = BasePhoto::new(solid(10, 10, [255, 255, 255, 255]));
    let compositor = Compositor::new(settings(64, 64, 0.5));
    let mut store = OverlayStore::default();
    let id = store.place(AssetRef::new("wide"), 0.3, 0.6);
    let a = compositor.render(&photo, store.stamps(), &cat).unwrap();

    store.update(id, StampPatch::rotation(2.0 * TAU));
    let b = compositor.render(&photo, store.stamps(), &cat).unwrap();
    assert_eq!(a.frame, b.frame);
}

#[test]
fn unknown_stamp_asset_is_skipped() {
    let cat = catalog();
    let mut store = OverlayStore::default();
    let missing = store.place(AssetRef::new("nope"), 0.5, 0.5);
    store.place(AssetRef::new("red"), 0.5, 0.5);
    let photo = BasePhoto::new(solid(10, 10, [255, 255, 255, 255]));

    let out = Compositor::new(settings(100, 100, 0.2))
        .compose(&photo, store.stamps(), &cat)
        .unwrap();
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].stamp, missing);
    assert!(close(out.frame.pixel(50, 50).unwrap(), [255, 0, 0]));
}

#[test]
fn undecodable_photo_is_a_decode_error() {
    let photo = BasePhoto::new(b"definitely not an image".to_vec());
    let err = Compositor::default()
        .compose(&photo, &[], &StampCatalog::default())
        .unwrap_err();
    assert!(err.is_decode(), "{err}");
}

#[test]
fn encoded_output_is_jpeg_of_output_size() {
    let photo = BasePhoto::new(solid(30, 30, [10, 200, 30, 255]));
    let out = Compositor::new(settings(56, 74, 0.18))
        .compose(&photo, &[], &StampCatalog::default())
        .unwrap();
    assert_eq!(&out.encoded[..2], &[0xFF, 0xD8]);
    let decoded = image::load_from_memory(&out.encoded).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (56, 74));
}

#[test]
fn jpeg_encode_failure_is_not_a_decode_error() {
    let empty = FrameRGBA {
        width: 0,
        height: 0,
        data: Vec::new(),
        premultiplied: true,
    };
    let err = encode_jpeg(&empty, 90).unwrap_err();
    assert!(!err.is_decode(), "{err}");
    assert!(matches!(err, PhotostampError::Other(_)), "{err}");
}

#[test]
fn settings_follow_config() {
    let cfg = EditorConfig {
        jpeg_quality: 70,
        stamp_width_fraction: 0.25,
        ..EditorConfig::default()
    };
    let s = ComposeSettings::from(&cfg);
    assert_eq!(s.jpeg_quality, 70);
    assert_eq!(s.stamp_width_fraction, 0.25);
    assert_eq!(s.output, OutputSize::reference());
}
