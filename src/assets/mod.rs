//! Decoding of the base photo and the fixed stamp catalog.

/// Stamp catalog: fixed, pre-registered decoration images.
pub mod catalog;
/// Raster/SVG decoding into premultiplied RGBA8.
pub mod decode;
/// Immutable base photo handle.
pub mod photo;
pub(crate) mod svg_raster;
