//! Non-overlapping placement for new canvas content.
//!
//! Given the bounds of the shapes a new image derives from (its anchors)
//! and the bounds of everything currently on the canvas (the obstacles),
//! the engine picks a position for the new image: near the anchors when
//! there are any, otherwise near the viewport center, keeping a minimum
//! clearance from existing content whenever a clear slot exists within
//! the search budget.
//!
//! The search is deterministic and always returns a position. Candidate
//! slots are tried right, below, left, then above the anchor region,
//! stepping farther out each round; when every slot is occupied the
//! engine falls back to a fixed spot to the right of the anchors even if
//! it overlaps.

use crate::Bounds;
use glam::Vec2;
use std::fmt;

/// Default minimum clearance between the placed image and other shapes.
pub const DEFAULT_GAP: f32 = 30.0;

/// Default number of outward search rounds before falling back.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Gap multiplier for the unconditional fallback slot.
const FALLBACK_GAP_FACTOR: f32 = 5.0;

/// Read-only view of the canvas the engine places into.
///
/// The real editor sits behind this boundary; the scene crate implements
/// it for the headless scene and tests implement it with synthetic data.
pub trait CanvasSource {
    /// Bounds of every shape currently occupying canvas space.
    fn obstacle_bounds(&self) -> Vec<Bounds>;

    /// Midpoint of the visible canvas area, in canvas coordinates.
    fn viewport_center(&self) -> Vec2;
}

/// Tunable knobs for a placement call.
#[derive(Clone, Copy, Debug)]
pub struct PlacementOptions {
    /// Minimum clearance kept between the new image and any obstacle.
    pub gap: f32,
    /// Number of outward rounds tried before the fallback.
    pub max_attempts: u32,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Error type for invalid placement input.
///
/// Given valid input the engine cannot fail; these only guard against
/// degenerate target rectangles and negative clearance.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// Target width/height must be finite and positive.
    InvalidSize(Vec2),
    /// Gap must be finite and non-negative.
    InvalidGap(f32),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize(size) => {
                write!(f, "Invalid target size: {}x{}", size.x, size.y)
            }
            Self::InvalidGap(gap) => write!(f, "Invalid gap: {}", gap),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Search directions, in preference order: right of the anchors, below,
/// left, above. The order is part of the product behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Bottom,
    Left,
    Top,
}

impl Direction {
    const ORDER: [Direction; 4] = [
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
        Direction::Top,
    ];

    /// Candidate bounds for a box of `size` placed on this side of
    /// `reference`, `offset` away from its edge and centered on the
    /// cross axis.
    fn candidate(self, reference: &Bounds, size: Vec2, offset: f32) -> Bounds {
        let center = reference.center();
        let origin = match self {
            Direction::Right => Vec2::new(reference.right() + offset, center.y - size.y * 0.5),
            Direction::Bottom => Vec2::new(center.x - size.x * 0.5, reference.bottom() + offset),
            Direction::Left => {
                Vec2::new(reference.left() - offset - size.x, center.y - size.y * 0.5)
            }
            Direction::Top => Vec2::new(center.x - size.x * 0.5, reference.top() - offset - size.y),
        };
        Bounds::from_origin_size(origin, size)
    }
}

/// Compute where a new box of `size` should land.
///
/// `anchors` are the bounds of the shapes the new content derives from
/// (empty for content with no reference, e.g. a plain import);
/// `obstacles` are the bounds of everything already on the canvas.
/// Anchors are not excluded from the obstacles: an anchor is a real shape
/// occupying real space, and callers replacing a shape drop it from
/// `obstacles` explicitly.
///
/// Returns the top-left corner for the new box. The call is pure: the
/// same input always produces the same output, and no input is mutated.
pub fn compute_placement(
    anchors: &[Bounds],
    obstacles: &[Bounds],
    size: Vec2,
    viewport_center: Vec2,
    options: PlacementOptions,
) -> Result<Vec2, PlacementError> {
    if !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0) {
        return Err(PlacementError::InvalidSize(size));
    }
    if !(options.gap.is_finite() && options.gap >= 0.0) {
        return Err(PlacementError::InvalidGap(options.gap));
    }

    let reference = match union_of(anchors) {
        Some(bounds) => bounds,
        None => {
            // No anchors: a candidate centered on the viewport wins
            // outright when nothing blocks it.
            let centered = Bounds::from_center_size(viewport_center, size);
            if is_clear(&centered, obstacles, options.gap) {
                return Ok(centered.origin());
            }
            // Otherwise search outward from a zero-size reference at the
            // viewport center.
            Bounds::from_center_size(viewport_center, Vec2::ZERO)
        }
    };

    for round in 0..options.max_attempts {
        let offset = options.gap * (round + 1) as f32;
        for direction in Direction::ORDER {
            let candidate = direction.candidate(&reference, size, offset);
            if is_clear(&candidate, obstacles, options.gap) {
                log::debug!(
                    "placement: {:?} slot at round {} -> ({}, {})",
                    direction,
                    round,
                    candidate.min.x,
                    candidate.min.y
                );
                return Ok(candidate.origin());
            }
        }
    }

    // Every slot within the budget is occupied; land to the right of the
    // anchors anyway so the call always terminates with a position.
    let fallback = Vec2::new(
        reference.right() + options.gap * FALLBACK_GAP_FACTOR,
        reference.center().y - size.y * 0.5,
    );
    log::debug!(
        "placement: no clear slot in {} rounds, falling back to ({}, {})",
        options.max_attempts,
        fallback.x,
        fallback.y
    );
    Ok(fallback)
}

/// Place against a live canvas: obstacles and viewport center come from
/// the injected source.
pub fn place_near<C: CanvasSource>(
    source: &C,
    anchors: &[Bounds],
    size: Vec2,
    options: PlacementOptions,
) -> Result<Vec2, PlacementError> {
    compute_placement(
        anchors,
        &source.obstacle_bounds(),
        size,
        source.viewport_center(),
        options,
    )
}

/// Smallest bounds enclosing all anchors, or None when there are none.
fn union_of(anchors: &[Bounds]) -> Option<Bounds> {
    anchors.iter().copied().reduce(|acc, b| acc.union(&b))
}

fn is_clear(candidate: &Bounds, obstacles: &[Bounds], gap: f32) -> bool {
    obstacles.iter().all(|o| !candidate.overlaps(o, gap))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::from_origin_size(Vec2::new(x, y), Vec2::new(w, h))
    }

    fn place(
        anchors: &[Bounds],
        obstacles: &[Bounds],
        size: Vec2,
        viewport_center: Vec2,
    ) -> Vec2 {
        compute_placement(
            anchors,
            obstacles,
            size,
            viewport_center,
            PlacementOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn empty_canvas_places_at_viewport_center() {
        let result = place(&[], &[], Vec2::new(80.0, 80.0), Vec2::new(500.0, 500.0));
        assert_eq!(result, Vec2::new(460.0, 460.0));
    }

    #[test]
    fn single_anchor_places_right_at_round_zero() {
        let anchor = bounds(0.0, 0.0, 100.0, 100.0);
        let result = place(&[anchor], &[], Vec2::new(200.0, 50.0), Vec2::ZERO);
        // Right of the anchor (100 + 30), vertically centered (50 - 25).
        assert_eq!(result, Vec2::new(130.0, 25.0));
    }

    #[test]
    fn anchor_union_is_the_reference_box() {
        let anchors = [bounds(0.0, 0.0, 50.0, 50.0), bounds(100.0, 0.0, 50.0, 50.0)];
        let result = place(&anchors, &[], Vec2::new(60.0, 60.0), Vec2::ZERO);
        // Union is {0,0,150,50}; right slot offset by the gap, centered
        // on the union's vertical midline (25 - 30).
        assert_eq!(result, Vec2::new(180.0, -5.0));

        let reversed = [anchors[1], anchors[0]];
        assert_eq!(
            place(&reversed, &[], Vec2::new(60.0, 60.0), Vec2::ZERO),
            result
        );
    }

    #[test]
    fn blocked_right_slot_falls_through_to_bottom_in_same_round() {
        let anchor = bounds(0.0, 0.0, 100.0, 100.0);
        let size = Vec2::new(50.0, 50.0);
        // Exactly the round-0 right slot.
        let right_slot = bounds(130.0, 25.0, 50.0, 50.0);
        let result = place(&[anchor], &[anchor, right_slot], size, Vec2::ZERO);
        // Bottom slot at round 0: horizontally centered, 30 below.
        assert_eq!(result, Vec2::new(25.0, 130.0));
    }

    #[test]
    fn anchor_counts_as_obstacle_but_leaves_its_own_side_slots_clear() {
        let anchor = bounds(0.0, 0.0, 100.0, 100.0);
        // The anchor itself is in the obstacle set; the right slot sits
        // exactly one gap away and is still allowed.
        let result = place(&[anchor], &[anchor], Vec2::new(50.0, 50.0), Vec2::ZERO);
        assert_eq!(result, Vec2::new(130.0, 25.0));
    }

    #[test]
    fn fully_blocked_canvas_returns_fallback() {
        let anchor = bounds(0.0, 0.0, 100.0, 100.0);
        // One obstacle large enough to cover every candidate in every
        // round (10 rounds * 30 gap plus the target size).
        let wall = bounds(-2000.0, -2000.0, 4000.0, 4000.0);
        let result = place(&[anchor], &[wall], Vec2::new(50.0, 50.0), Vec2::ZERO);
        // anchor.right + gap * 5, vertically centered.
        assert_eq!(result, Vec2::new(250.0, 25.0));
    }

    #[test]
    fn blocked_viewport_center_searches_outward_from_zero_size_reference() {
        let obstacle = bounds(460.0, 460.0, 80.0, 80.0);
        let result = place(&[], &[obstacle], Vec2::new(80.0, 80.0), Vec2::new(500.0, 500.0));
        // Rounds 0 and 1 stay within the obstacle's clearance in every
        // direction; round 2 clears it on the right first.
        assert_eq!(result, Vec2::new(590.0, 460.0));
    }

    #[test]
    fn placement_is_deterministic() {
        let anchors = [bounds(0.0, 0.0, 100.0, 100.0)];
        let obstacles = [bounds(130.0, 25.0, 50.0, 50.0), bounds(25.0, 130.0, 40.0, 40.0)];
        let size = Vec2::new(50.0, 50.0);
        let first = place(&anchors, &obstacles, size, Vec2::ZERO);
        let second = place(&anchors, &obstacles, size, Vec2::ZERO);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_degenerate_input() {
        let err = compute_placement(
            &[],
            &[],
            Vec2::new(0.0, 50.0),
            Vec2::ZERO,
            PlacementOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::InvalidSize(Vec2::new(0.0, 50.0)));

        let err = compute_placement(
            &[],
            &[],
            Vec2::new(50.0, 50.0),
            Vec2::ZERO,
            PlacementOptions {
                gap: -1.0,
                max_attempts: 10,
            },
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::InvalidGap(-1.0));
    }

    #[test]
    fn zero_attempts_goes_straight_to_fallback() {
        let anchor = bounds(0.0, 0.0, 100.0, 100.0);
        let result = compute_placement(
            &[anchor],
            &[],
            Vec2::new(50.0, 50.0),
            Vec2::ZERO,
            PlacementOptions {
                gap: 30.0,
                max_attempts: 0,
            },
        )
        .unwrap();
        assert_eq!(result, Vec2::new(250.0, 25.0));
    }

    struct FakeCanvas {
        obstacles: Vec<Bounds>,
        center: Vec2,
    }

    impl CanvasSource for FakeCanvas {
        fn obstacle_bounds(&self) -> Vec<Bounds> {
            self.obstacles.clone()
        }

        fn viewport_center(&self) -> Vec2 {
            self.center
        }
    }

    #[test]
    fn place_near_reads_the_injected_source() {
        let canvas = FakeCanvas {
            obstacles: vec![],
            center: Vec2::new(500.0, 500.0),
        };
        let result = place_near(
            &canvas,
            &[],
            Vec2::new(80.0, 80.0),
            PlacementOptions::default(),
        )
        .unwrap();
        assert_eq!(result, Vec2::new(460.0, 460.0));
    }
}
