use crate::{AssetId, ShapeId};
use glam::Vec2;
use popart_core::Bounds;
use serde::{Deserialize, Serialize};

/// The kind of shape, with its kind-specific properties.
///
/// PopArt scenes only ever contain the shapes the workflows produce:
/// images, annotation text, and connecting arrows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    /// An image backed by a stored asset.
    Image { asset: AssetId },
    /// A text label.
    Text {
        content: String,
        /// Secondary labels (example prompts) render grey.
        #[serde(default)]
        grey: bool,
    },
    /// A straight arrow from the shape position to `end` (relative).
    Arrow { end: Vec2 },
}

/// A shape on the canvas.
///
/// Shapes are flat (no hierarchy) and are rendered in z-order, which is
/// their index in the containing list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// Top-left corner in canvas space.
    pub position: Vec2,
    /// Display size in canvas units.
    pub size: Vec2,
}

impl Shape {
    pub fn new(kind: ShapeKind, position: Vec2, size: Vec2) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
            position,
            size,
        }
    }

    pub fn image(asset: AssetId, position: Vec2, size: Vec2) -> Self {
        Self::new(ShapeKind::Image { asset }, position, size)
    }

    pub fn text(content: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self::new(
            ShapeKind::Text {
                content: content.into(),
                grey: false,
            },
            position,
            size,
        )
    }

    pub fn grey_text(content: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self::new(
            ShapeKind::Text {
                content: content.into(),
                grey: true,
            },
            position,
            size,
        )
    }

    pub fn arrow(position: Vec2, end: Vec2) -> Self {
        // An arrow's occupied box spans from its start to its end point.
        let size = Vec2::new(end.x.abs(), end.y.abs().max(1.0));
        Self::new(ShapeKind::Arrow { end }, position, size)
    }

    /// The axis-aligned box this shape occupies on the canvas.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.position, self.size)
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ShapeKind::Image { .. })
    }

    /// The backing asset, for image shapes.
    pub fn asset_id(&self) -> Option<AssetId> {
        match self.kind {
            ShapeKind::Image { asset } => Some(asset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_shape_reports_its_asset_and_bounds() {
        let asset = AssetId::from_u128(7);
        let shape = Shape::image(asset, Vec2::new(10.0, 20.0), Vec2::new(300.0, 200.0));
        assert!(shape.is_image());
        assert_eq!(shape.asset_id(), Some(asset));

        let bounds = shape.bounds();
        assert_eq!(bounds.origin(), Vec2::new(10.0, 20.0));
        assert_eq!(bounds.size(), Vec2::new(300.0, 200.0));
    }

    #[test]
    fn text_and_arrow_are_not_images() {
        let text = Shape::text("pick an image", Vec2::ZERO, Vec2::new(120.0, 24.0));
        let arrow = Shape::arrow(Vec2::new(360.0, 150.0), Vec2::new(60.0, 0.0));
        assert!(!text.is_image());
        assert!(arrow.asset_id().is_none());
    }

    #[test]
    fn shape_kind_serializes_with_type_tag() {
        let shape = Shape::grey_text("\"watercolor style\"", Vec2::ZERO, Vec2::new(80.0, 20.0));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["kind"]["type"], "text");
        assert_eq!(json["kind"]["grey"], true);
        // Vec2 serializes as [x, y].
        assert_eq!(json["position"], serde_json::json!([0.0, 0.0]));
    }
}
