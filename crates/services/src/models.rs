//! Image model catalog.
//!
//! The models the generation endpoint accepts, with the per-provider
//! size options the prompt panel exposes. Gemini models take an aspect
//! ratio plus a resolution tier; Seedream models take explicit pixel
//! dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which API family a model belongs to. The two families want
/// differently shaped request bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Gemini,
    Seedream,
}

/// A selectable image generation model.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ImageModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Default size: aspect ratio for Gemini (e.g. `1:1`), pixel
    /// dimensions for Seedream (e.g. `2048x2048`).
    pub size: &'static str,
    pub provider: Provider,
}

pub const IMAGE_MODELS: [ImageModel; 5] = [
    // Gemini models (default) - sized by aspect ratio, b64_json output only
    ImageModel {
        id: "gemini-2.5-flash-image",
        name: "Nano Banana",
        description: "Default, fastest",
        size: "1:1",
        provider: Provider::Gemini,
    },
    ImageModel {
        id: "gemini-3-pro-image-preview",
        name: "Nano Banana Pro",
        description: "Higher quality output",
        size: "1:1",
        provider: Provider::Gemini,
    },
    // Seedream models - sized by pixel dimensions
    ImageModel {
        id: "doubao-seedream-4-5-251128",
        name: "Seedream 4.5",
        description: "Best image quality",
        size: "2048x2048",
        provider: Provider::Seedream,
    },
    ImageModel {
        id: "doubao-seedream-4-0-250828",
        name: "Seedream 4.0",
        description: "Stable, multi-image fusion",
        size: "2048x2048",
        provider: Provider::Seedream,
    },
    ImageModel {
        id: "doubao-seedream-3-0-t2i-250415",
        name: "Seedream 3.0",
        description: "Classic, fast",
        size: "1024x1024",
        provider: Provider::Seedream,
    },
];

pub fn default_model() -> &'static ImageModel {
    &IMAGE_MODELS[0]
}

pub fn find_model(id: &str) -> Option<&'static ImageModel> {
    IMAGE_MODELS.iter().find(|m| m.id == id)
}

/// Aspect ratios accepted by the Gemini models.
pub const GEMINI_ASPECT_RATIOS: [&str; 8] =
    ["1:1", "2:3", "3:2", "3:4", "4:3", "9:16", "16:9", "21:9"];

pub const DEFAULT_GEMINI_ASPECT_RATIO: &str = "1:1";

/// Output resolution tier for Gemini models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeminiImageSize {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl GeminiImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1K" => Some(Self::OneK),
            "2K" => Some(Self::TwoK),
            "4K" => Some(Self::FourK),
            _ => None,
        }
    }

    pub const ALL: [GeminiImageSize; 3] = [Self::OneK, Self::TwoK, Self::FourK];
}

impl fmt::Display for GeminiImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Seedream size option: exact pixel dimensions plus the aspect-ratio
/// label shown in the picker.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SeedreamSize {
    pub value: &'static str,
    pub label: &'static str,
}

/// 2K-class Seedream sizes.
pub const SEEDREAM_SIZES_2K: [SeedreamSize; 6] = [
    SeedreamSize {
        value: "2048x2048",
        label: "1:1",
    },
    SeedreamSize {
        value: "2304x1728",
        label: "4:3",
    },
    SeedreamSize {
        value: "1728x2304",
        label: "3:4",
    },
    SeedreamSize {
        value: "2560x1440",
        label: "16:9",
    },
    SeedreamSize {
        value: "1440x2560",
        label: "9:16",
    },
    SeedreamSize {
        value: "2496x1664",
        label: "3:2",
    },
];

pub const DEFAULT_SEEDREAM_SIZE: &str = "2048x2048";

/// Aspect-ratio label for a Seedream size value, when it's in the table.
pub fn seedream_aspect_label(value: &str) -> Option<&'static str> {
    SEEDREAM_SIZES_2K
        .iter()
        .find(|s| s.value == value)
        .map(|s| s.label)
}
