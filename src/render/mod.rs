//! Deterministic compositing of the base photo and placed stamps.

/// Compositor and JPEG encoding.
pub mod compose;
/// Input fingerprints used to skip redundant preview renders.
pub mod fingerprint;
