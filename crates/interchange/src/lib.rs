//! PopArt scene interchange format.
//!
//! KDL-based document format for saving a scene between invocations.
//! Pure data, no expressions - what you see is what's there.
//!
//! # Document format
//!
//! ```kdl
//! scene version="0.1" {
//!   viewport offset-x=0.0 offset-y=0.0 zoom=1.0 view-width=1280.0 view-height=720.0
//!   asset "9f2c1a77-..." name="cat.png" width=1024 height=1024 mime="image/png" src="data:image/png;base64,..."
//!   image "ab12cd34-..." x=100.0 y=100.0 width=300.0 height=300.0 asset="9f2c1a77-..." selected=#true
//!   text "c0ffee00-..." x=40.0 y=420.0 width=140.0 height=24.0 content="pick an image"
//!   arrow "d4d4d4d4-..." x=360.0 y=150.0 end-x=60.0 end-y=0.0
//! }
//! ```

use glam::Vec2;
use kdl::{KdlDocument, KdlEntry, KdlNode};
use scene::{AssetId, ImageAsset, Scene, Shape, ShapeId, ShapeKind, Viewport};
use std::path::Path;

pub const FORMAT_VERSION: &str = "0.1";

/// Error type for interchange operations.
#[derive(Debug)]
pub enum InterchangeError {
    Parse(String),
    InvalidStructure(String),
    MissingField(String),
    InvalidValue(String),
    Io(String),
}

impl std::fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::InvalidStructure(msg) => write!(f, "Invalid structure: {}", msg),
            Self::MissingField(msg) => write!(f, "Missing field: {}", msg),
            Self::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            Self::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for InterchangeError {}

/// A PopArt scene document that can be serialized to/from KDL.
#[derive(Debug, Clone)]
pub struct Document {
    pub version: String,
    pub scene: Scene,
}

impl Document {
    pub fn new(scene: Scene) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            scene,
        }
    }

    /// Serialize the document to a KDL string.
    pub fn to_kdl(&self) -> String {
        let mut doc = KdlDocument::new();

        let mut scene_node = KdlNode::new("scene");
        scene_node.push(KdlEntry::new_prop("version", self.version.clone()));

        let children = scene_node
            .children_mut()
            .get_or_insert_with(KdlDocument::new);
        children.nodes_mut().push(viewport_to_kdl(&self.scene.viewport));
        for asset in self.scene.assets() {
            children.nodes_mut().push(asset_to_kdl(asset));
        }
        for shape in self.scene.shapes() {
            children
                .nodes_mut()
                .push(shape_to_kdl(shape, self.scene.is_selected(shape.id)));
        }

        doc.nodes_mut().push(scene_node);
        doc.to_string()
    }

    /// Parse a document from a KDL string.
    pub fn from_kdl(input: &str) -> Result<Self, InterchangeError> {
        let doc: KdlDocument = input
            .parse()
            .map_err(|e| InterchangeError::Parse(format!("{}", e)))?;

        let scene_node = doc
            .get("scene")
            .ok_or_else(|| InterchangeError::InvalidStructure("Missing 'scene' node".into()))?;

        let version = scene_node
            .get("version")
            .and_then(|v| v.as_string())
            .map(|s| s.to_string())
            .unwrap_or_else(|| FORMAT_VERSION.to_string());

        let mut scene = Scene::new();
        let mut selected = Vec::new();
        if let Some(children) = scene_node.children() {
            for node in children.nodes() {
                match node.name().value() {
                    "viewport" => scene.viewport = parse_viewport(node),
                    "asset" => {
                        scene.add_asset(parse_asset(node)?);
                    }
                    "image" | "text" | "arrow" => {
                        let (shape, is_selected) = parse_shape(node)?;
                        let id = scene.add_shape(shape);
                        if is_selected {
                            selected.push(id);
                        }
                    }
                    other => {
                        return Err(InterchangeError::InvalidStructure(format!(
                            "Unknown node: {}",
                            other
                        )))
                    }
                }
            }
        }
        for id in selected {
            scene.select(id, true);
        }

        Ok(Self { version, scene })
    }

    /// Save the document to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), InterchangeError> {
        std::fs::write(path.as_ref(), self.to_kdl())
            .map_err(|e| InterchangeError::Io(format!("{}", e)))
    }

    /// Load a document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InterchangeError> {
        let input = std::fs::read_to_string(path.as_ref())
            .map_err(|e| InterchangeError::Io(format!("{}", e)))?;
        Self::from_kdl(&input)
    }
}

fn viewport_to_kdl(viewport: &Viewport) -> KdlNode {
    let mut node = KdlNode::new("viewport");
    node.push(KdlEntry::new_prop("offset-x", viewport.offset.x as f64));
    node.push(KdlEntry::new_prop("offset-y", viewport.offset.y as f64));
    node.push(KdlEntry::new_prop("zoom", viewport.zoom as f64));
    node.push(KdlEntry::new_prop("view-width", viewport.view_size.x as f64));
    node.push(KdlEntry::new_prop("view-height", viewport.view_size.y as f64));
    node
}

fn asset_to_kdl(asset: &ImageAsset) -> KdlNode {
    let mut node = KdlNode::new("asset");
    node.push(KdlEntry::new(asset.id.to_uuid_string()));
    node.push(KdlEntry::new_prop("name", asset.name.clone()));
    node.push(KdlEntry::new_prop("width", asset.width as i128));
    node.push(KdlEntry::new_prop("height", asset.height as i128));
    node.push(KdlEntry::new_prop("mime", asset.mime_type.clone()));
    node.push(KdlEntry::new_prop("src", asset.src.clone()));
    node
}

fn shape_to_kdl(shape: &Shape, selected: bool) -> KdlNode {
    let type_name = match shape.kind {
        ShapeKind::Image { .. } => "image",
        ShapeKind::Text { .. } => "text",
        ShapeKind::Arrow { .. } => "arrow",
    };

    let mut node = KdlNode::new(type_name);

    // ID as first argument (full UUID for round-trip fidelity)
    node.push(KdlEntry::new(shape.id.to_uuid_string()));

    node.push(KdlEntry::new_prop("x", shape.position.x as f64));
    node.push(KdlEntry::new_prop("y", shape.position.y as f64));
    node.push(KdlEntry::new_prop("width", shape.size.x as f64));
    node.push(KdlEntry::new_prop("height", shape.size.y as f64));

    match &shape.kind {
        ShapeKind::Image { asset } => {
            node.push(KdlEntry::new_prop("asset", asset.to_uuid_string()));
        }
        ShapeKind::Text { content, grey } => {
            node.push(KdlEntry::new_prop("content", content.clone()));
            if *grey {
                node.push(KdlEntry::new_prop("grey", true));
            }
        }
        ShapeKind::Arrow { end } => {
            node.push(KdlEntry::new_prop("end-x", end.x as f64));
            node.push(KdlEntry::new_prop("end-y", end.y as f64));
        }
    }

    if selected {
        node.push(KdlEntry::new_prop("selected", true));
    }

    node
}

fn parse_viewport(node: &KdlNode) -> Viewport {
    let defaults = Viewport::default();
    Viewport {
        offset: Vec2::new(
            get_f32_prop(node, "offset-x").unwrap_or(0.0),
            get_f32_prop(node, "offset-y").unwrap_or(0.0),
        ),
        zoom: get_f32_prop(node, "zoom").unwrap_or(1.0),
        view_size: Vec2::new(
            get_f32_prop(node, "view-width").unwrap_or(defaults.view_size.x),
            get_f32_prop(node, "view-height").unwrap_or(defaults.view_size.y),
        ),
    }
}

fn parse_asset(node: &KdlNode) -> Result<ImageAsset, InterchangeError> {
    let id = first_argument(node)
        .and_then(AssetId::parse)
        .unwrap_or_default();
    let name = get_string_prop(node, "name")
        .ok_or_else(|| InterchangeError::MissingField("asset name".into()))?;
    let src = get_string_prop(node, "src")
        .ok_or_else(|| InterchangeError::MissingField("asset src".into()))?;
    let width = get_u32_prop(node, "width")
        .ok_or_else(|| InterchangeError::MissingField("asset width".into()))?;
    let height = get_u32_prop(node, "height")
        .ok_or_else(|| InterchangeError::MissingField("asset height".into()))?;
    let mime = get_string_prop(node, "mime").unwrap_or_else(|| "image/png".to_string());

    let mut asset = ImageAsset::new(name, src, width, height, mime);
    asset.id = id;
    Ok(asset)
}

fn parse_shape(node: &KdlNode) -> Result<(Shape, bool), InterchangeError> {
    // Parse ID from first argument (or generate a new one)
    let id = first_argument(node)
        .and_then(ShapeId::parse)
        .unwrap_or_default();

    let position = Vec2::new(
        get_f32_prop(node, "x").unwrap_or(0.0),
        get_f32_prop(node, "y").unwrap_or(0.0),
    );
    let size = Vec2::new(
        get_f32_prop(node, "width").unwrap_or(100.0),
        get_f32_prop(node, "height").unwrap_or(100.0),
    );

    let mut shape = match node.name().value() {
        "image" => {
            let asset_ref = get_string_prop(node, "asset")
                .ok_or_else(|| InterchangeError::MissingField("image asset".into()))?;
            let asset = AssetId::parse(&asset_ref).ok_or_else(|| {
                InterchangeError::InvalidValue(format!("Bad asset reference: {}", asset_ref))
            })?;
            Shape::image(asset, position, size)
        }
        "text" => {
            let content = get_string_prop(node, "content")
                .ok_or_else(|| InterchangeError::MissingField("text content".into()))?;
            let grey = node.get("grey").and_then(|v| v.as_bool()).unwrap_or(false);
            if grey {
                Shape::grey_text(content, position, size)
            } else {
                Shape::text(content, position, size)
            }
        }
        "arrow" => {
            let end = Vec2::new(
                get_f32_prop(node, "end-x")
                    .ok_or_else(|| InterchangeError::MissingField("arrow end-x".into()))?,
                get_f32_prop(node, "end-y")
                    .ok_or_else(|| InterchangeError::MissingField("arrow end-y".into()))?,
            );
            let mut arrow = Shape::arrow(position, end);
            arrow.size = size;
            arrow
        }
        other => {
            return Err(InterchangeError::InvalidValue(format!(
                "Unknown shape type: {}",
                other
            )))
        }
    };
    shape.id = id;

    let selected = node
        .get("selected")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Ok((shape, selected))
}

fn first_argument(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
}

fn get_f32_prop(node: &KdlNode, name: &str) -> Option<f32> {
    let value = node.get(name)?;
    value
        .as_float()
        .or_else(|| value.as_integer().map(|v| v as f64))
        .map(|v| v as f32)
}

fn get_u32_prop(node: &KdlNode, name: &str) -> Option<u32> {
    node.get(name)
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name).and_then(|v| v.as_string()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        let asset = scene.add_asset(ImageAsset::new(
            "cat.png",
            "data:image/png;base64,iVBORw0KGgo=",
            1024,
            1024,
            "image/png",
        ));
        let image = scene.add_shape(Shape::image(
            asset,
            Vec2::new(100.0, 100.0),
            Vec2::new(300.0, 300.0),
        ));
        scene.add_shape(Shape::text(
            "pick an image",
            Vec2::new(160.0, 420.0),
            Vec2::new(180.0, 24.0),
        ));
        scene.add_shape(Shape::arrow(Vec2::new(430.0, 250.0), Vec2::new(60.0, 0.0)));
        scene.select(image, false);
        scene.viewport.zoom = 0.8;
        scene
    }

    #[test]
    fn test_roundtrip() {
        let doc = Document::new(sample_scene());
        let kdl = doc.to_kdl();

        let parsed = Document::from_kdl(&kdl).expect("Failed to parse");
        let scene = &parsed.scene;

        assert_eq!(scene.shape_count(), 3);
        assert_eq!(scene.assets().len(), 1);
        assert_eq!(scene.viewport.zoom, 0.8);

        let original = doc.scene.shapes();
        let restored = scene.shapes();
        for (a, b) in original.iter().zip(restored.iter()) {
            assert_eq!(a, b);
        }

        // Selection survives the round trip.
        assert_eq!(scene.selected_images().len(), 1);

        let asset = &scene.assets()[0];
        assert_eq!(asset.name, "cat.png");
        assert_eq!(asset.width, 1024);
        assert_eq!(asset.src, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn missing_scene_node_is_an_error() {
        let err = Document::from_kdl("canvas { }").unwrap_err();
        assert!(matches!(err, InterchangeError::InvalidStructure(_)));
    }

    #[test]
    fn unknown_child_node_is_an_error() {
        let input = r#"scene version="0.1" { widget "a" }"#;
        let err = Document::from_kdl(input).unwrap_err();
        assert!(matches!(err, InterchangeError::InvalidStructure(_)));
    }

    #[test]
    fn image_without_asset_reference_is_an_error() {
        let input = r#"scene version="0.1" { image "x" x=0.0 y=0.0 width=10.0 height=10.0 }"#;
        let err = Document::from_kdl(input).unwrap_err();
        assert!(matches!(err, InterchangeError::MissingField(_)));
    }

    #[test]
    fn garbage_input_is_a_parse_error() {
        let err = Document::from_kdl("scene {").unwrap_err();
        assert!(matches!(err, InterchangeError::Parse(_)));
    }

    #[test]
    fn viewport_defaults_apply_when_absent() {
        let input = r#"scene version="0.1" { }"#;
        let doc = Document::from_kdl(input).unwrap();
        assert_eq!(doc.scene.viewport, Viewport::default());
        assert_eq!(doc.version, "0.1");
    }
}
