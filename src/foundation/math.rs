/// Clamp into `[0, 1]`; NaN maps to `0`.
pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

/// Premultiplied RGBA8 to straight RGB8, dropping alpha.
pub(crate) fn unpremultiply_to_rgb8(rgba_premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba_premul.len() / 4 * 3);
    for px in rgba_premul.chunks_exact(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            let straight = ((u32::from(c) * 255 + a / 2) / a).min(255);
            out.push(straight as u8);
        }
    }
    out
}
