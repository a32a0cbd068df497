//! Interactive overlay editing: the stamp store, pointer handling, and discrete transforms.

/// Pointer interaction state machine.
pub mod interaction;
/// Ordered stamp collection and change notification.
pub mod store;
/// Bounded scale/rotate/delete steps for the active stamp.
pub mod transform;
