use crate::foundation::core::{NormPoint, Point, Rect};

/// Map a device-space point into normalized photo space for the current on-screen frame.
///
/// The result is clamped into `[0, 1] x [0, 1]`, so pointers outside the frame pin to its edge.
/// A degenerate frame (zero or negative extent) maps to `0` on that axis.
pub fn to_normalized(device: Point, frame: Rect) -> NormPoint {
    let frame = frame.abs();
    let axis = |v: f64, origin: f64, extent: f64| {
        if extent > 0.0 {
            (v - origin) / extent
        } else {
            0.0
        }
    };
    NormPoint::clamped(
        axis(device.x, frame.x0, frame.width()),
        axis(device.y, frame.y0, frame.height()),
    )
}

/// Inverse of [`to_normalized`] for points inside the frame.
pub fn to_device(p: NormPoint, frame: Rect) -> Point {
    let frame = frame.abs();
    Point::new(
        frame.x0 + p.x * frame.width(),
        frame.y0 + p.y * frame.height(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/mapper.rs"]
mod tests;
