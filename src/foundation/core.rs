use crate::foundation::error::{PhotostampError, PhotostampResult};
use crate::foundation::math::clamp01;

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Position in normalized photo space.
///
/// `(0, 0)` is the top-left and `(1, 1)` the bottom-right corner of the visible (cover-cropped)
/// photo area. Both components are always within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPoint {
    /// Horizontal position, `0` = left edge.
    pub x: f64,
    /// Vertical position, `0` = top edge.
    pub y: f64,
}

impl NormPoint {
    /// Build a point, clamping both components into `[0, 1]`.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp01(x),
            y: clamp01(y),
        }
    }

    /// Center of the photo.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
}

/// Fixed output raster size of the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl OutputSize {
    /// Reference width of the posted image.
    pub const REFERENCE_WIDTH: u32 = 1080;
    /// On-screen photo frame aspect, width part.
    pub const FRAME_ASPECT_W: u32 = 56;
    /// On-screen photo frame aspect, height part.
    pub const FRAME_ASPECT_H: u32 = 74;

    /// Create a validated size.
    pub fn new(width: u32, height: u32) -> PhotostampResult<Self> {
        if width == 0 || height == 0 {
            return Err(PhotostampError::validation(
                "output size must be non-zero in both dimensions",
            ));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(PhotostampError::validation(format!(
                "output size {width}x{height} exceeds {}x{}",
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Size with the given width and the height implied by an `aspect_w:aspect_h` frame, rounded.
    pub fn from_width_and_aspect(
        width: u32,
        aspect_w: u32,
        aspect_h: u32,
    ) -> PhotostampResult<Self> {
        if aspect_w == 0 || aspect_h == 0 {
            return Err(PhotostampError::validation("aspect parts must be > 0"));
        }
        let height = (f64::from(width) * f64::from(aspect_h) / f64::from(aspect_w)).round() as u32;
        Self::new(width, height)
    }

    /// `1080 x round(1080 * 74 / 56)` = `1080 x 1427`.
    pub fn reference() -> Self {
        Self {
            width: Self::REFERENCE_WIDTH,
            height: 1427,
        }
    }

    /// Width as `f64`.
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    /// Output rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width_f64(), self.height_f64())
    }
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::reference()
    }
}

/// A rendered raster as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
