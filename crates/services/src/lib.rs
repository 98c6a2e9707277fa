//! AI service clients for PopArt.
//!
//! Thin wrappers over the three vendor HTTP APIs the workflows call:
//! Nebula `images/generations` for text-to-image and image-to-image
//! (Gemini and Seedream model families), remove.bg for background
//! removal, and Replicate's Real-ESRGAN for upscaling. Plus the model
//! catalog, data-URL helpers, and API key storage.
//!
//! Every failure surfaces as a [`ServiceError`] message; nothing here
//! panics or retries on its own.

pub mod background;
pub mod data_url;
mod error;
pub mod generation;
pub mod keys;
pub mod models;
pub mod upscale;

pub use background::{ProcessedImage, RemoveBgClient};
pub use error::ServiceError;
pub use generation::{GenerateImageParams, GeneratedImage, NebulaClient};
pub use keys::{ApiKeys, KeySlot};
pub use models::{
    default_model, find_model, GeminiImageSize, ImageModel, Provider, SeedreamSize,
    DEFAULT_GEMINI_ASPECT_RATIO, DEFAULT_SEEDREAM_SIZE, GEMINI_ASPECT_RATIOS, IMAGE_MODELS,
    SEEDREAM_SIZES_2K,
};
pub use upscale::{ReplicateClient, UpscaleFactor, UpscaledImage};
