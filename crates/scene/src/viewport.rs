use glam::Vec2;
use popart_core::Bounds;
use serde::{Deserialize, Serialize};

/// Zoom never goes above this after a fit, so freshly seeded content
/// keeps some breathing room around it.
const FIT_MAX_ZOOM: f32 = 0.8;

/// Camera/viewport state for the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Pan offset in canvas coordinates
    pub offset: Vec2,
    /// Zoom level (1.0 = 100%)
    pub zoom: f32,
    /// Visible area size in screen pixels
    pub view_size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            view_size: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a point from screen coordinates to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Vec2) -> Vec2 {
        (screen_point / self.zoom) - self.offset
    }

    /// Convert a point from canvas coordinates to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Vec2) -> Vec2 {
        (canvas_point + self.offset) * self.zoom
    }

    /// Midpoint of the visible area, in canvas coordinates.
    pub fn center(&self) -> Vec2 {
        self.screen_to_canvas(self.view_size * 0.5)
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta / self.zoom;
    }

    /// Fit the given canvas bounds into view, centered, zooming out as
    /// far as needed but never past 100%, then capped at `FIT_MAX_ZOOM`.
    pub fn zoom_to_fit(&mut self, bounds: Bounds) {
        let size = bounds.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let fit = (self.view_size.x / size.x).min(self.view_size.y / size.y);
        self.zoom = fit.min(1.0).min(FIT_MAX_ZOOM);
        // Place the bounds center at the view center.
        self.offset = self.view_size * 0.5 / self.zoom - bounds.center();
    }

    /// Reset to default view.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
