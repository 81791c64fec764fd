//! Collision detection for circles against axis-aligned rectangles
//!
//! Everything in the playfield that the ball can hit (paddle, bricks) is an
//! axis-aligned rectangle, so a single circle/rect test covers the whole game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis along which a collision is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// An axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.w / 2.0, self.h / 2.0)
    }

    /// Point inside the rectangle nearest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.x + self.w),
            p.y.clamp(self.y, self.y + self.h),
        )
    }
}

/// Check whether a circle overlaps (or touches) a rectangle
///
/// Clamps the circle center into the rectangle to find the nearest point and
/// compares the squared distance against `radius²`.
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let nearest = rect.closest_point(center);
    center.distance_squared(nearest) <= radius * radius
}

/// Pick the axis a circle most plausibly struck a rectangle on
///
/// Penetration on each axis is `(half_extent + radius) - |center offset|`; the
/// axis with the smaller overlap wins, ties go to Y. This is a minimum
/// penetration heuristic, not a time-of-impact solve, so a deep corner hit can
/// occasionally pick the wrong axis.
pub fn resolve_axis(center: Vec2, radius: f32, rect: &Rect) -> Axis {
    let offset = (center - rect.center()).abs();
    let overlap = rect.half_extents() + Vec2::splat(radius) - offset;

    if overlap.x < overlap.y { Axis::X } else { Axis::Y }
}

/// Invert the velocity component along `axis`
#[inline]
pub fn reflect_axis(velocity: Vec2, axis: Axis) -> Vec2 {
    match axis {
        Axis::X => Vec2::new(-velocity.x, velocity.y),
        Axis::Y => Vec2::new(velocity.x, -velocity.y),
    }
}
