use super::*;

#[test]
fn reference_size_matches_frame_aspect() {
    let derived = OutputSize::from_width_and_aspect(
        OutputSize::REFERENCE_WIDTH,
        OutputSize::FRAME_ASPECT_W,
        OutputSize::FRAME_ASPECT_H,
    )
    .unwrap();
    assert_eq!(derived, OutputSize::reference());
    assert_eq!(derived.height, 1427);
}

#[test]
fn output_size_rejects_zero_and_oversized() {
    assert!(OutputSize::new(0, 10).is_err());
    assert!(OutputSize::new(10, 0).is_err());
    assert!(OutputSize::new(70_000, 10).is_err());
    assert!(OutputSize::from_width_and_aspect(100, 0, 1).is_err());
}

#[test]
fn norm_point_clamps_components() {
    let p = NormPoint::clamped(-0.25, 1.75);
    assert_eq!(p, NormPoint { x: 0.0, y: 1.0 });
}

#[test]
fn frame_pixel_is_bounds_checked() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.pixel(0, 1), None);
}
