use std::sync::Arc;

use anyhow::Context;

use crate::assets::catalog::{AssetRef, StampCatalog};
use crate::assets::decode::PreparedImage;
use crate::assets::photo::BasePhoto;
use crate::config::EditorConfig;
use crate::editor::store::{Stamp, StampId};
use crate::foundation::core::{Affine, FrameRGBA, OutputSize};
use crate::foundation::error::{PhotostampError, PhotostampResult};
use crate::foundation::math::unpremultiply_to_rgb8;
use crate::geometry::placement::{StampPlacement, cover_affine};

/// Content type of [`ComposedImage::encoded`].
pub const COMPOSITE_CONTENT_TYPE: &str = "image/jpeg";

/// Inputs of the compositor that do not come from the editing session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeSettings {
    /// Fixed output raster size.
    pub output: OutputSize,
    /// Unscaled stamp width as a fraction of the output width.
    pub stamp_width_fraction: f64,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
    /// Straight RGBA painted beneath the photo.
    pub background_rgba: [u8; 4],
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ComposeSettings {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            output: cfg.output,
            stamp_width_fraction: cfg.stamp_width_fraction,
            jpeg_quality: cfg.jpeg_quality,
            background_rgba: cfg.background_rgba,
        }
    }
}

/// A stamp left out of a composite because its asset could not be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedStamp {
    /// Skipped stamp.
    pub stamp: StampId,
    /// Its asset.
    pub asset: AssetRef,
    /// Why it was skipped.
    pub reason: String,
}

/// Raster output of [`Compositor::render`].
#[derive(Clone, Debug)]
pub struct RenderedComposite {
    /// Premultiplied RGBA8 raster at the configured output size.
    pub frame: FrameRGBA,
    /// Stamps that were not drawn.
    pub skipped: Vec<SkippedStamp>,
}

/// Encoded composite ready for display or upload.
#[derive(Clone, Debug)]
pub struct ComposedImage {
    /// Premultiplied RGBA8 raster.
    pub frame: FrameRGBA,
    /// JPEG bytes of `frame`.
    pub encoded: Vec<u8>,
    /// Stamps that were not drawn.
    pub skipped: Vec<SkippedStamp>,
}

/// Deterministic base photo + stamps compositor on the `vello_cpu` rasterizer.
///
/// The photo is cover-fitted into the output raster, then stamps are drawn oldest first, each
/// centered at its normalized position, sized to `output.width * fraction * scale` and rotated
/// about its own center. The same inputs always produce the same pixels.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    settings: ComposeSettings,
}

impl Compositor {
    /// Compositor with fixed settings.
    pub fn new(settings: ComposeSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &ComposeSettings {
        &self.settings
    }

    /// Rasterize without encoding.
    ///
    /// Fails with a decode error only when the base photo cannot be decoded; stamps whose asset
    /// cannot be decoded are skipped and reported in [`RenderedComposite::skipped`].
    pub fn render(
        &self,
        photo: &BasePhoto,
        stamps: &[Stamp],
        catalog: &StampCatalog,
    ) -> PhotostampResult<RenderedComposite> {
        let out = self.settings.output;
        let (w, h) = output_dims_u16(out)?;

        let base = photo.decode()?;
        let base_paint = image_paint(&base)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = self.settings.background_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            out.width_f64(),
            out.height_f64(),
        ));

        let (bw, bh) = (f64::from(base.width), f64::from(base.height));
        fill_image(&mut ctx, base_paint, cover_affine(bw, bh, out), bw, bh);

        let mut skipped = Vec::new();
        for stamp in stamps {
            if let Err(e) = self.draw_stamp(&mut ctx, stamp, catalog) {
                tracing::warn!(stamp = stamp.id().as_u64(), asset = %stamp.asset(), error = %e, "skipping stamp");
                skipped.push(SkippedStamp {
                    stamp: stamp.id(),
                    asset: stamp.asset().clone(),
                    reason: e.to_string(),
                });
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RenderedComposite {
            frame: FrameRGBA {
                width: out.width,
                height: out.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            },
            skipped,
        })
    }

    /// Rasterize and encode to JPEG.
    #[tracing::instrument(skip_all, fields(stamps = stamps.len()))]
    pub fn compose(
        &self,
        photo: &BasePhoto,
        stamps: &[Stamp],
        catalog: &StampCatalog,
    ) -> PhotostampResult<ComposedImage> {
        let RenderedComposite { frame, skipped } = self.render(photo, stamps, catalog)?;
        let encoded = encode_jpeg(&frame, self.settings.jpeg_quality)?;
        Ok(ComposedImage {
            frame,
            encoded,
            skipped,
        })
    }

    fn draw_stamp(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        stamp: &Stamp,
        catalog: &StampCatalog,
    ) -> PhotostampResult<()> {
        let placement = StampPlacement::resolve(
            self.settings.output.rect(),
            stamp.position(),
            self.settings.stamp_width_fraction,
            stamp.scale(),
            stamp.rotation(),
        );
        let img = catalog.raster_for_width(stamp.asset(), placement.width)?;
        let paint = image_paint(&img)?;
        let (iw, ih) = (f64::from(img.width), f64::from(img.height));
        fill_image(ctx, paint, placement.affine(iw, ih), iw, ih);
        Ok(())
    }
}

/// Encode a raster as baseline JPEG. Alpha is dropped after unpremultiplying.
pub fn encode_jpeg(frame: &FrameRGBA, quality: u8) -> PhotostampResult<Vec<u8>> {
    let rgb = if frame.premultiplied {
        unpremultiply_to_rgb8(&frame.data)
    } else {
        frame
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    };

    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .context("encode composite jpeg")?;
    Ok(buf)
}

fn output_dims_u16(out: OutputSize) -> PhotostampResult<(u16, u16)> {
    let w: u16 = out
        .width
        .try_into()
        .map_err(|_| PhotostampError::validation("output width exceeds u16"))?;
    let h: u16 = out
        .height
        .try_into()
        .map_err(|_| PhotostampError::validation("output height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(PhotostampError::validation("output size must be non-zero"));
    }
    Ok((w, h))
}

fn fill_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: vello_cpu::Image,
    transform: Affine,
    w: f64,
    h: f64,
) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(img: &PreparedImage) -> PhotostampResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PhotostampResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PhotostampError::decode(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PhotostampError::decode(format!("image height {height} exceeds u16")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PhotostampError::decode(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
