use crate::{AssetId, ImageAsset, Shape, ShapeId, Viewport};
use glam::Vec2;
use popart_core::{Bounds, CanvasSource};
use std::collections::HashSet;

/// The scene state.
///
/// Flat shape list in z-order (back to front), stored assets, selection,
/// and viewport. This is the model the workflow operations read and
/// mutate; the real editor owns everything else.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// All shapes on the canvas, in z-order (back to front).
    shapes: Vec<Shape>,
    /// Image assets referenced by image shapes.
    assets: Vec<ImageAsset>,
    /// Currently selected shape IDs.
    selection: HashSet<ShapeId>,
    /// Viewport (pan/zoom) state.
    pub viewport: Viewport,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the canvas, on top of existing content.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.shapes.push(shape);
        id
    }

    /// Remove a shape from the canvas.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let pos = self.shapes.iter().position(|s| s.id == id)?;
        self.selection.remove(&id);
        Some(self.shapes.remove(pos))
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Store an asset with the scene.
    pub fn add_asset(&mut self, asset: ImageAsset) -> AssetId {
        let id = asset.id;
        self.assets.push(asset);
        id
    }

    /// Get an asset by ID.
    pub fn get_asset(&self, id: AssetId) -> Option<&ImageAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    /// Select a shape, optionally adding to the selection.
    pub fn select(&mut self, id: ShapeId, add_to_selection: bool) {
        if !add_to_selection {
            self.selection.clear();
        }
        if self.get_shape(id).is_some() {
            self.selection.insert(id);
        }
    }

    /// Clear the selection.
    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected shapes, in z-order.
    pub fn selected_shapes(&self) -> Vec<&Shape> {
        self.shapes
            .iter()
            .filter(|s| self.selection.contains(&s.id))
            .collect()
    }

    /// Selected image shapes, in z-order. These are the reference shapes
    /// (anchors) for generation workflows.
    pub fn selected_images(&self) -> Vec<&Shape> {
        self.shapes
            .iter()
            .filter(|s| s.is_image() && self.selection.contains(&s.id))
            .collect()
    }

    /// Bounds of the selected image shapes.
    pub fn selected_image_bounds(&self) -> Vec<Bounds> {
        self.selected_images().iter().map(|s| s.bounds()).collect()
    }

    /// Smallest bounds enclosing all shapes, or None for an empty scene.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Bounds of every shape except the given ids. Used when a workflow
    /// replaces a shape and that shape must not block its successor.
    pub fn obstacle_bounds_excluding(&self, exclude: &[ShapeId]) -> Vec<Bounds> {
        self.shapes
            .iter()
            .filter(|s| !exclude.contains(&s.id))
            .map(Shape::bounds)
            .collect()
    }
}

impl CanvasSource for Scene {
    fn obstacle_bounds(&self) -> Vec<Bounds> {
        self.shapes.iter().map(Shape::bounds).collect()
    }

    fn viewport_center(&self) -> Vec2 {
        self.viewport.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_shape(scene: &mut Scene, x: f32, y: f32, w: f32, h: f32) -> ShapeId {
        let asset = scene.add_asset(ImageAsset::new(
            "test.png",
            "data:image/png;base64,AA==",
            w as u32,
            h as u32,
            "image/png",
        ));
        scene.add_shape(Shape::image(asset, Vec2::new(x, y), Vec2::new(w, h)))
    }

    #[test]
    fn add_select_and_remove_shapes() {
        let mut scene = Scene::new();
        let a = image_shape(&mut scene, 0.0, 0.0, 100.0, 100.0);
        let b = image_shape(&mut scene, 200.0, 0.0, 100.0, 100.0);
        assert_eq!(scene.shape_count(), 2);

        scene.select(a, false);
        scene.select(b, true);
        assert_eq!(scene.selected_images().len(), 2);

        scene.select(b, false);
        assert!(!scene.is_selected(a));
        assert!(scene.is_selected(b));

        scene.remove_shape(b);
        assert_eq!(scene.shape_count(), 1);
        assert!(!scene.is_selected(b));
    }

    #[test]
    fn selecting_a_missing_shape_is_a_no_op() {
        let mut scene = Scene::new();
        scene.select(ShapeId::from_u128(42), false);
        assert!(scene.selected_shapes().is_empty());
    }

    #[test]
    fn selection_ignores_non_image_shapes_for_anchors() {
        let mut scene = Scene::new();
        let image = image_shape(&mut scene, 0.0, 0.0, 100.0, 100.0);
        let text = scene.add_shape(Shape::text("label", Vec2::new(0.0, 120.0), Vec2::new(80.0, 20.0)));

        scene.select(image, false);
        scene.select(text, true);

        assert_eq!(scene.selected_shapes().len(), 2);
        assert_eq!(scene.selected_image_bounds().len(), 1);
    }

    #[test]
    fn content_bounds_unions_all_shapes() {
        let mut scene = Scene::new();
        assert!(scene.content_bounds().is_none());

        image_shape(&mut scene, 0.0, 0.0, 100.0, 100.0);
        image_shape(&mut scene, 300.0, -50.0, 100.0, 100.0);

        let bounds = scene.content_bounds().unwrap();
        assert_eq!(bounds.origin(), Vec2::new(0.0, -50.0));
        assert_eq!(bounds.size(), Vec2::new(400.0, 150.0));
    }

    #[test]
    fn canvas_source_reports_all_shapes_and_viewport_center() {
        let mut scene = Scene::new();
        let a = image_shape(&mut scene, 0.0, 0.0, 100.0, 100.0);
        image_shape(&mut scene, 200.0, 0.0, 100.0, 100.0);

        assert_eq!(scene.obstacle_bounds().len(), 2);
        assert_eq!(scene.obstacle_bounds_excluding(&[a]).len(), 1);
        assert_eq!(scene.viewport_center(), Vec2::new(640.0, 360.0));
    }
}
