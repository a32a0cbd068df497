use std::sync::Arc;

use crate::foundation::error::{PhotostampError, PhotostampResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Parsed SVG document, rasterized on demand at draw size.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

/// Decode encoded image bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PhotostampResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PhotostampError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PhotostampError::decode("decoded image is empty"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> PhotostampResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| PhotostampError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// `true` when the bytes look like an SVG document rather than a binary raster.
pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
