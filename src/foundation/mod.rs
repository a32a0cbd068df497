//! Shared primitives: geometry/pixel types, the error taxonomy, and small math helpers.

/// Core value types shared by every subsystem.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
pub(crate) mod math;
