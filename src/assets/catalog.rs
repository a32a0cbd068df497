use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::Context;

use crate::assets::decode::{self, PreparedImage, PreparedSvg};
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::foundation::error::{PhotostampError, PhotostampResult};

/// Reference to a stamp in the catalog, by registered name.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Build a reference from a catalog name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Registered name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AssetKind {
    Raster,
    Svg,
}

#[derive(Clone, Debug)]
enum DecodedStamp {
    Raster(PreparedImage),
    Svg(PreparedSvg),
}

#[derive(Debug)]
struct CatalogEntry {
    name: AssetRef,
    kind: AssetKind,
    bytes: Arc<Vec<u8>>,
    // Decoded at most once; a failure is cached as its message.
    decoded: OnceLock<Result<DecodedStamp, String>>,
}

impl CatalogEntry {
    fn decoded(&self) -> PhotostampResult<&DecodedStamp> {
        let slot = self.decoded.get_or_init(|| {
            let res = match self.kind {
                AssetKind::Raster => decode::decode_image(&self.bytes).map(DecodedStamp::Raster),
                AssetKind::Svg => decode::parse_svg(&self.bytes).map(DecodedStamp::Svg),
            };
            res.map_err(|e| e.to_string())
        });
        slot.as_ref().map_err(|msg| {
            PhotostampError::decode(format!("stamp '{}': {msg}", self.name))
        })
    }
}

/// Fixed, pre-registered list of stamp images.
///
/// Built once through [`StampCatalogBuilder`] or [`StampCatalog::from_dir`] and immutable
/// afterwards. Entries keep their encoded bytes and decode lazily on first use.
#[derive(Debug, Default)]
pub struct StampCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<AssetRef, usize>,
}

impl StampCatalog {
    /// Start building a catalog.
    pub fn builder() -> StampCatalogBuilder {
        StampCatalogBuilder::default()
    }

    /// Register every `png`/`jpg`/`jpeg`/`webp`/`svg` file in `dir`, named by file stem, in
    /// lexicographic file-name order.
    pub fn from_dir(dir: impl AsRef<Path>) -> PhotostampResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read stamp catalog dir '{}'", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("list stamp catalog dir '{}'", dir.display()))?
                .path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            if matches!(
                ext.as_deref(),
                Some("png" | "jpg" | "jpeg" | "webp" | "svg")
            ) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut builder = Self::builder();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read stamp '{}'", path.display()))?;
            builder = builder.insert(stem, bytes)?;
        }
        tracing::debug!(dir = %dir.display(), stamps = builder.entries.len(), "loaded stamp catalog");
        Ok(builder.build())
    }

    /// Number of registered stamps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when `asset` is registered.
    pub fn contains(&self, asset: &AssetRef) -> bool {
        self.index.contains_key(asset)
    }

    /// Registered references in registration order.
    pub fn assets(&self) -> impl Iterator<Item = &AssetRef> {
        self.entries.iter().map(|e| &e.name)
    }

    fn entry(&self, asset: &AssetRef) -> PhotostampResult<&CatalogEntry> {
        self.index
            .get(asset)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| PhotostampError::decode(format!("stamp '{asset}' is not in the catalog")))
    }

    /// Intrinsic `(width, height)` of a stamp, used for aspect ratio and hit testing.
    pub fn intrinsic_size(&self, asset: &AssetRef) -> PhotostampResult<(f64, f64)> {
        match self.entry(asset)?.decoded()? {
            DecodedStamp::Raster(img) => Ok((f64::from(img.width), f64::from(img.height))),
            DecodedStamp::Svg(svg) => {
                let size = svg.tree.size();
                Ok((f64::from(size.width()), f64::from(size.height())))
            }
        }
    }

    /// Pixels for drawing `asset` at `draw_width` output pixels wide.
    ///
    /// Raster stamps return their decoded pixels unchanged; SVG stamps are rasterized at the
    /// draw size so they stay sharp when scaled up.
    pub fn raster_for_width(
        &self,
        asset: &AssetRef,
        draw_width: f64,
    ) -> PhotostampResult<PreparedImage> {
        match self.entry(asset)?.decoded()? {
            DecodedStamp::Raster(img) => Ok(img.clone()),
            DecodedStamp::Svg(svg) => {
                let (w, h) = svg_raster_size(&svg.tree, draw_width)?;
                let rgba8_premul = rasterize_svg_to_premul_rgba8(&svg.tree, w, h)?;
                Ok(PreparedImage {
                    width: w,
                    height: h,
                    rgba8_premul: Arc::new(rgba8_premul),
                })
            }
        }
    }
}

/// Accumulates stamp registrations before freezing them into a [`StampCatalog`].
#[derive(Debug, Default)]
pub struct StampCatalogBuilder {
    entries: Vec<CatalogEntry>,
    index: HashMap<AssetRef, usize>,
}

impl StampCatalogBuilder {
    /// Register encoded stamp bytes under `name`. SVG is detected from the content.
    pub fn insert(mut self, name: impl Into<String>, bytes: Vec<u8>) -> PhotostampResult<Self> {
        let name = AssetRef::new(name);
        if name.as_str().is_empty() {
            return Err(PhotostampError::validation("stamp name must not be empty"));
        }
        if self.index.contains_key(&name) {
            return Err(PhotostampError::validation(format!(
                "stamp '{name}' registered twice"
            )));
        }
        let kind = if decode::looks_like_svg(&bytes) {
            AssetKind::Svg
        } else {
            AssetKind::Raster
        };
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(CatalogEntry {
            name,
            kind,
            bytes: Arc::new(bytes),
            decoded: OnceLock::new(),
        });
        Ok(self)
    }

    /// Freeze the registrations.
    pub fn build(self) -> StampCatalog {
        StampCatalog {
            entries: self.entries,
            index: self.index,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
