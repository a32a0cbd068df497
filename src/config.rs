use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::editor::store::ScaleBounds;
use crate::foundation::core::OutputSize;
use crate::foundation::error::{PhotostampError, PhotostampResult};
use crate::theme::CatTheme;

/// Editor and compositor settings injected at session start.
///
/// Every field has a default, so a JSON config only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Fixed compositor output size.
    pub output: OutputSize,
    /// Unscaled stamp width as a fraction of the output (or frame) width.
    pub stamp_width_fraction: f64,
    /// JPEG quality for the encoded composite, `1..=100`.
    pub jpeg_quality: u8,
    /// Lower scale bound.
    pub min_scale: f64,
    /// Upper scale bound.
    pub max_scale: f64,
    /// Step used by the transform editor's scale buttons.
    pub scale_step: f64,
    /// Step used by the transform editor's rotate buttons, radians.
    pub rotate_step_rad: f64,
    /// Optional cap on placed stamps. `None` means unbounded.
    pub max_stamps: Option<usize>,
    /// Worker threads in the preview render pool.
    pub preview_threads: usize,
    /// Straight RGBA colour painted beneath the photo.
    pub background_rgba: [u8; 4],
    /// UI theme. Never consulted by the compositor.
    pub theme: CatTheme,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            output: OutputSize::reference(),
            stamp_width_fraction: 0.18,
            jpeg_quality: 92,
            min_scale: 0.3,
            max_scale: 3.0,
            scale_step: 0.1,
            rotate_step_rad: std::f64::consts::PI / 12.0,
            max_stamps: None,
            preview_threads: 2,
            background_rgba: [255, 255, 255, 255],
            theme: CatTheme::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> PhotostampResult<Self> {
        let cfg: EditorConfig = serde_json::from_reader(r)
            .map_err(|e| PhotostampError::validation(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PhotostampResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PhotostampError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ranges and cross-field constraints.
    pub fn validate(&self) -> PhotostampResult<()> {
        OutputSize::new(self.output.width, self.output.height)?;
        if !(self.stamp_width_fraction.is_finite() && self.stamp_width_fraction > 0.0) {
            return Err(PhotostampError::validation(
                "stamp_width_fraction must be finite and > 0",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PhotostampError::validation(
                "jpeg_quality must be within 1..=100",
            ));
        }
        self.scale_bounds()?;
        if !(self.scale_step.is_finite() && self.scale_step > 0.0) {
            return Err(PhotostampError::validation("scale_step must be > 0"));
        }
        if !self.rotate_step_rad.is_finite() {
            return Err(PhotostampError::validation(
                "rotate_step_rad must be finite",
            ));
        }
        if self.preview_threads == 0 {
            return Err(PhotostampError::validation("preview_threads must be >= 1"));
        }
        Ok(())
    }

    /// Scale bounds handed to the overlay store.
    pub fn scale_bounds(&self) -> PhotostampResult<ScaleBounds> {
        ScaleBounds::new(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
