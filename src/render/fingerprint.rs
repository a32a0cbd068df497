use xxhash_rust::xxh3::Xxh3;

use crate::assets::photo::BasePhoto;
use crate::editor::store::Stamp;
use crate::geometry::placement::effective_rotation;
use crate::render::compose::ComposeSettings;

const XXH3_SEED: u64 = 0x5a3c_91d2_77e0_b64f;

/// Stable fingerprint of everything that affects composite pixels.
///
/// Stamp ids and the selection are not hashed: two stamp lists that draw identically have equal
/// fingerprints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComposeFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

/// Fingerprint compose inputs.
pub fn fingerprint_compose(
    photo: &BasePhoto,
    stamps: &[Stamp],
    settings: &ComposeSettings,
) -> ComposeFingerprint {
    let mut h = StableHasher::new();

    h.write_u32(settings.output.width);
    h.write_u32(settings.output.height);
    h.write_f64(settings.stamp_width_fraction);
    h.write_u8(settings.jpeg_quality);
    h.write_bytes(&settings.background_rgba);

    h.write_u64(photo.digest());
    h.write_u64(photo.bytes().len() as u64);

    h.write_u64(stamps.len() as u64);
    for s in stamps {
        h.write_str(s.asset().as_str());
        h.write_f64(s.position().x);
        h.write_f64(s.position().y);
        h.write_f64(s.scale());
        h.write_f64(effective_rotation(s.rotation()));
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 draw the same
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> ComposeFingerprint {
        let v = self.inner.digest128();
        ComposeFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
