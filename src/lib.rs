//! Photostamp places decorative stamps on a captured photo and composites the result.
//!
//! The public API is session-oriented:
//!
//! - Build a [`StampCatalog`] and an [`EditorConfig`]
//! - Create an [`EditingSession`] for the captured photo
//! - Feed pointer events and transform steps; previews render in the background
//! - Submit: compose authoritatively and hand the image to an [`ObjectStore`] / [`DocumentStore`]
//!
//! Stamp positions are stored in normalized photo space, so the same stamp list renders
//! identically at any display size.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Photo and stamp asset decoding.
pub mod assets;
/// Editor configuration.
pub mod config;
/// Overlay store, pointer interaction, and transform steps.
pub mod editor;
/// Shared value types and errors.
pub mod foundation;
/// Coordinate mapping and stamp placement math.
pub mod geometry;
/// Background preview rendering.
pub mod preview;
/// Persistence handoff for finished posts.
pub mod publish;
/// Compositor.
pub mod render;
/// Editing session.
pub mod session;
/// UI themes.
pub mod theme;

pub use crate::assets::catalog::{AssetRef, StampCatalog, StampCatalogBuilder};
pub use crate::assets::photo::BasePhoto;
pub use crate::config::EditorConfig;
pub use crate::editor::interaction::{
    InteractionController, InteractionOutcome, InteractionState, PointerEvent, PointerId,
    PointerPhase,
};
pub use crate::editor::store::{OverlayStore, ScaleBounds, Stamp, StampId, StampPatch, StoreEvent, StoreObserver};
pub use crate::editor::transform::TransformEditor;
pub use crate::foundation::core::{Affine, FrameRGBA, NormPoint, OutputSize, Point, Rect, Vec2};
pub use crate::foundation::error::{PhotostampError, PhotostampResult};
pub use crate::preview::scheduler::{PreviewFrame, PreviewImage, PreviewScheduler, RequestToken};
pub use crate::publish::{
    DocumentStore, FsObjectStore, InMemoryDocumentStore, InMemoryObjectStore,
    JsonlDocumentStore, ObjectStore, Owner, PostDocument, PostDraft, SubmitReceipt,
};
pub use crate::render::compose::{ComposeSettings, ComposedImage, Compositor};
pub use crate::session::EditingSession;
pub use crate::theme::CatTheme;
