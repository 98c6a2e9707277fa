use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Images inserted larger than this are scaled down to fit.
pub const MAX_DISPLAY_WIDTH: f32 = 800.0;
pub const MAX_DISPLAY_HEIGHT: f32 = 600.0;

/// Unique identifier for an image asset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(uuid::Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse an AssetId from its UUID string form.
    pub fn parse(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the full UUID string.
    pub fn to_uuid_string(&self) -> String {
        self.0.to_string()
    }

    /// Create an AssetId from a u128 (useful for tests).
    pub fn from_u128(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", &self.0.to_string()[..8])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// An image stored with the scene.
///
/// Assets hold the pixel data (as a data URL) and the source dimensions;
/// shapes referencing an asset carry their own display size.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: AssetId,
    /// Original file name or a generated name like `generated-image.png`.
    pub name: String,
    /// `data:<mime>;base64,...` payload.
    pub src: String,
    /// Source image width in pixels.
    pub width: u32,
    /// Source image height in pixels.
    pub height: u32,
    pub mime_type: String,
}

impl ImageAsset {
    pub fn new(
        name: impl Into<String>,
        src: impl Into<String>,
        width: u32,
        height: u32,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: AssetId::new(),
            name: name.into(),
            src: src.into(),
            width,
            height,
            mime_type: mime_type.into(),
        }
    }

    /// Source size in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Display size for inserting this asset onto the canvas: the pixel
    /// size, scaled down (never up) to fit within the maximum display
    /// box, preserving aspect ratio.
    pub fn display_size(&self) -> Vec2 {
        let size = self.pixel_size();
        if size.x > MAX_DISPLAY_WIDTH || size.y > MAX_DISPLAY_HEIGHT {
            let scale = (MAX_DISPLAY_WIDTH / size.x).min(MAX_DISPLAY_HEIGHT / size.y);
            size * scale
        } else {
            size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(width: u32, height: u32) -> ImageAsset {
        ImageAsset::new("test.png", "data:image/png;base64,AA==", width, height, "image/png")
    }

    #[test]
    fn small_images_keep_their_pixel_size() {
        assert_eq!(asset(640, 480).display_size(), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn oversized_images_scale_down_to_fit() {
        // 2048x2048 limited by height: 600/2048.
        let size = asset(2048, 2048).display_size();
        assert_eq!(size, Vec2::new(600.0, 600.0));

        // Wide image limited by width.
        let size = asset(1600, 400).display_size();
        assert_eq!(size, Vec2::new(800.0, 200.0));
    }

    #[test]
    fn display_size_preserves_aspect_ratio() {
        let size = asset(2048, 1024).display_size();
        assert!((size.x / size.y - 2.0).abs() < 1e-6);
        assert!(size.x <= MAX_DISPLAY_WIDTH && size.y <= MAX_DISPLAY_HEIGHT);
    }
}
