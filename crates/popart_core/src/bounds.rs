//! Axis-aligned bounding box implementation using glam
//!
//! This module provides the AABB (Axis-Aligned Bounding Box) type shared
//! by the scene model and the placement engine. PopArt shapes never
//! rotate, so all bounds stay axis-aligned and the overlap and union
//! operations are simple min/max comparisons.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box represented by minimum and maximum points
///
/// This representation is efficient for the clearance tests and unions
/// the placement engine performs. Coordinates are canvas (page) space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// The minimum point (top-left in canvas coordinates)
    pub min: Vec2,
    /// The maximum point (bottom-right in canvas coordinates)
    pub max: Vec2,
}

impl Bounds {
    /// Creates a new bounds from minimum and maximum points
    ///
    /// Note: This doesn't validate that min is actually less than max.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates bounds from an origin point and size
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Creates bounds from center point and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half_size = size * 0.5;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Creates an empty bounds at the origin
    pub fn zero() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::ZERO,
        }
    }

    /// Returns the origin (minimum point) of the bounds
    pub fn origin(&self) -> Vec2 {
        self.min
    }

    /// Returns the size of the bounds
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Returns the center point of the bounds
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns the width of the bounds
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Returns the height of the bounds
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Returns the area of the bounds
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Left edge x coordinate
    pub fn left(&self) -> f32 {
        self.min.x
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.max.x
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.min.y
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Computes the union of two bounds
    ///
    /// The union is the smallest bounds that contains both input bounds
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Tests whether two bounds overlap once a minimum clearance is
    /// required between them.
    ///
    /// Boxes exactly `gap` apart on either axis count as non-overlapping:
    /// the boundary is exclusive in favor of allowing placement.
    pub fn overlaps(&self, other: &Self, gap: f32) -> bool {
        let separated = self.max.x + gap <= other.min.x
            || other.max.x + gap <= self.min.x
            || self.max.y + gap <= other.min.y
            || other.max.y + gap <= self.min.y;
        !separated
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_origin_size(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0));
        assert_eq!(bounds.min, Vec2::new(10.0, 20.0));
        assert_eq!(bounds.max, Vec2::new(110.0, 70.0));
        assert_eq!(bounds.size(), Vec2::new(100.0, 50.0));
        assert_eq!(bounds.center(), Vec2::new(60.0, 45.0));
        assert_eq!(bounds.right(), 110.0);
        assert_eq!(bounds.bottom(), 70.0);
        assert_eq!(bounds.width(), 100.0);
        assert_eq!(bounds.height(), 50.0);
        assert_eq!(bounds.area(), 5000.0);
    }

    #[test]
    fn test_bounds_from_center() {
        let bounds = Bounds::from_center_size(Vec2::new(500.0, 500.0), Vec2::new(80.0, 80.0));
        assert_eq!(bounds.min, Vec2::new(460.0, 460.0));
        assert_eq!(bounds.max, Vec2::new(540.0, 540.0));
    }

    #[test]
    fn test_bounds_union() {
        let a = Bounds::from_origin_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        let b = Bounds::from_origin_size(Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0));

        let union = a.union(&b);
        assert_eq!(union.min, Vec2::new(0.0, 0.0));
        assert_eq!(union.max, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Bounds::from_origin_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        let b = Bounds::from_origin_size(Vec2::new(90.0, 90.0), Vec2::new(100.0, 100.0));
        let c = Bounds::from_origin_size(Vec2::new(500.0, 500.0), Vec2::new(10.0, 10.0));

        for gap in [0.0, 15.0, 30.0] {
            assert_eq!(a.overlaps(&b, gap), b.overlaps(&a, gap));
            assert_eq!(a.overlaps(&c, gap), c.overlaps(&a, gap));
        }
    }

    #[test]
    fn box_with_positive_area_overlaps_itself() {
        let a = Bounds::from_origin_size(Vec2::new(10.0, 10.0), Vec2::new(50.0, 50.0));
        assert!(a.overlaps(&a, 0.0));
        assert!(a.overlaps(&a, 30.0));
    }

    #[test]
    fn clearance_boundary_is_exclusive() {
        let a = Bounds::from_origin_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        // Exactly 30 apart on the x axis: allowed at gap 30.
        let b = Bounds::from_origin_size(Vec2::new(130.0, 0.0), Vec2::new(100.0, 100.0));
        assert!(!a.overlaps(&b, 30.0));
        // One unit closer: blocked.
        let c = Bounds::from_origin_size(Vec2::new(129.0, 0.0), Vec2::new(100.0, 100.0));
        assert!(a.overlaps(&c, 30.0));
        // Same boxes with a larger gap requirement: blocked.
        assert!(a.overlaps(&b, 31.0));
    }

    #[test]
    fn diagonal_neighbors_need_clearance_on_one_axis_only() {
        let a = Bounds::from_origin_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        // Clear of `a` on the y axis, overlapping range on the x axis.
        let below = Bounds::from_origin_size(Vec2::new(50.0, 140.0), Vec2::new(100.0, 100.0));
        assert!(!a.overlaps(&below, 30.0));
    }
}
