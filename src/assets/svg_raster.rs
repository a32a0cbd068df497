use crate::foundation::error::{PhotostampError, PhotostampResult};

const MAX_DIM: u32 = 8_192;

/// Raster size for drawing an SVG `draw_width` pixels wide, keeping its aspect ratio.
pub(crate) fn svg_raster_size(tree: &usvg::Tree, draw_width: f64) -> PhotostampResult<(u32, u32)> {
    let size = tree.size();
    let (sw, sh) = (f64::from(size.width()), f64::from(size.height()));
    if !(sw.is_finite() && sh.is_finite()) || sw <= 0.0 || sh <= 0.0 {
        return Err(PhotostampError::decode("svg has invalid width/height"));
    }
    if !draw_width.is_finite() || draw_width <= 0.0 {
        return Err(PhotostampError::validation("svg draw width must be > 0"));
    }

    let w = draw_width.ceil().max(1.0) as u32;
    let h = (draw_width * sh / sw).ceil().max(1.0) as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(PhotostampError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize into premultiplied RGBA8, stretching the document to `width x height`.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> PhotostampResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PhotostampError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
