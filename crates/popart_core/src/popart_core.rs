//! # Core geometry and placement for PopArt
//!
//! This crate provides the shared geometry type (`Bounds`) and the
//! placement engine that decides where newly generated or imported
//! images land on the canvas relative to existing content.

pub mod bounds;
pub mod placement;

pub use bounds::Bounds;
pub use placement::{
    compute_placement, place_near, CanvasSource, PlacementError, PlacementOptions, DEFAULT_GAP,
    DEFAULT_MAX_ATTEMPTS,
};
