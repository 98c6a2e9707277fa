//! Headless scene model for PopArt.
//!
//! This crate provides a flat, non-hierarchical stand-in for the external
//! canvas editor's shape graph: image/text/arrow shapes, image assets,
//! selection, and a viewport. It exists so the placement engine and the
//! AI workflows can run and be tested without an editor or a browser.
//! Rendering, hit-testing, and undo/redo stay with the real editor.

mod asset;
mod scene;
mod shape;
mod shape_id;
mod viewport;

pub use asset::{AssetId, ImageAsset, MAX_DISPLAY_HEIGHT, MAX_DISPLAY_WIDTH};
pub use scene::Scene;
pub use shape::{Shape, ShapeKind};
pub use shape_id::ShapeId;
pub use viewport::Viewport;
