//! Coordinate mapping between the on-screen frame and normalized photo space, plus the stamp
//! placement math shared by the compositor and pointer hit testing.

/// Device <-> normalized photo coordinates.
pub mod mapper;
/// Cover fit and stamp transforms.
pub mod placement;
