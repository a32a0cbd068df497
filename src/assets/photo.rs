use std::sync::Arc;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::error::PhotostampResult;

/// The captured photo an editing session decorates.
///
/// Immutable once created. Cloning shares the encoded bytes.
#[derive(Clone, Debug)]
pub struct BasePhoto {
    bytes: Arc<Vec<u8>>,
    digest: u64,
}

impl BasePhoto {
    /// Wrap encoded photo bytes as handed over by the capture step.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let digest = xxhash_rust::xxh3::xxh3_64(&bytes);
        Self {
            bytes: Arc::new(bytes),
            digest,
        }
    }

    /// Encoded bytes exactly as captured. Used as the fallback upload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content digest of the encoded bytes.
    pub fn digest(&self) -> u64 {
        self.digest
    }

    /// Decode into premultiplied RGBA8.
    pub fn decode(&self) -> PhotostampResult<PreparedImage> {
        decode_image(&self.bytes)
    }
}

impl PartialEq for BasePhoto {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.bytes == other.bytes
    }
}

impl Eq for BasePhoto {}
