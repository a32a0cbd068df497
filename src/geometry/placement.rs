use std::f64::consts::TAU;

use crate::foundation::core::{Affine, NormPoint, OutputSize, Point, Rect, Vec2};

/// Uniform scale that makes an `img_w x img_h` image cover `out` with no letterboxing.
pub fn cover_scale(img_w: f64, img_h: f64, out: OutputSize) -> f64 {
    (out.width_f64() / img_w).max(out.height_f64() / img_h)
}

/// Source-space window sampled by a cover fit: centered, `out / scale` in size.
pub fn cover_window(img_w: f64, img_h: f64, out: OutputSize) -> Rect {
    let s = cover_scale(img_w, img_h, out);
    let (ww, wh) = (out.width_f64() / s, out.height_f64() / s);
    let x0 = (img_w - ww) / 2.0;
    let y0 = (img_h - wh) / 2.0;
    Rect::new(x0, y0, x0 + ww, y0 + wh)
}

/// Transform mapping image pixel space onto the output raster under a cover fit.
pub fn cover_affine(img_w: f64, img_h: f64, out: OutputSize) -> Affine {
    let s = cover_scale(img_w, img_h, out);
    let tx = (out.width_f64() - img_w * s) / 2.0;
    let ty = (out.height_f64() - img_h * s) / 2.0;
    Affine::translate(Vec2::new(tx, ty)) * Affine::scale(s)
}

/// Drawn stamp width: `frame_width * fraction * scale`.
pub fn stamp_draw_width(frame_width: f64, fraction: f64, scale: f64) -> f64 {
    frame_width * fraction * scale
}

/// Rotation actually applied when drawing; stored rotation is unbounded.
pub fn effective_rotation(rotation: f64) -> f64 {
    if rotation.is_finite() {
        rotation.rem_euclid(TAU)
    } else {
        0.0
    }
}

/// Where one stamp lands inside a target rectangle (output raster or on-screen frame).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StampPlacement {
    /// Center in target space.
    pub center: Point,
    /// Drawn width in target pixels.
    pub width: f64,
    /// Rotation in radians, already reduced into `[0, 2pi)`.
    pub rotation: f64,
}

impl StampPlacement {
    /// Resolve placement of a stamp at normalized `position` inside `target`.
    pub fn resolve(
        target: Rect,
        position: NormPoint,
        fraction: f64,
        scale: f64,
        rotation: f64,
    ) -> Self {
        Self {
            center: Point::new(
                target.x0 + position.x * target.width(),
                target.y0 + position.y * target.height(),
            ),
            width: stamp_draw_width(target.width(), fraction, scale),
            rotation: effective_rotation(rotation),
        }
    }

    /// Drawn height for an asset of intrinsic size `asset_w x asset_h`.
    pub fn height_for(&self, asset_w: f64, asset_h: f64) -> f64 {
        self.width * asset_h / asset_w
    }

    /// Transform mapping asset pixel space `[0, asset_w] x [0, asset_h]` into target space:
    /// scaled to the drawn width, rotated about the asset center, centered on `center`.
    pub fn affine(&self, asset_w: f64, asset_h: f64) -> Affine {
        let s = self.width / asset_w;
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale(s)
            * Affine::translate(Vec2::new(-asset_w / 2.0, -asset_h / 2.0))
    }

    /// Upright bounding box around the (possibly rotated) stamp.
    pub fn bounds(&self, asset_w: f64, asset_h: f64) -> Rect {
        self.affine(asset_w, asset_h)
            .transform_rect_bbox(Rect::new(0.0, 0.0, asset_w, asset_h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/placement.rs"]
mod tests;
