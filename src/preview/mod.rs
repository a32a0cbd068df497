//! Live preview rendering off the interaction thread.

/// Token-based preview scheduler.
pub mod scheduler;
