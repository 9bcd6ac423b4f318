//! Axis-aligned geometry shared by placement, collision and rendering
//!
//! World space is y-down: smaller y is higher up the tower.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Check if a point lies inside (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }
}

/// Strict overlap test: rectangles that only share an edge do not overlap
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    let (a_max, b_max) = (a.max(), b.max());
    a.min.x < b_max.x && b.min.x < a_max.x && a.min.y < b_max.y && b.min.y < a_max.y
}

/// Clamp a left edge so a span of `width` stays inside `[0, field_width]`.
/// Spans wider than the field are pinned to the left wall.
#[inline]
pub fn clamp_span(x: f32, width: f32, field_width: f32) -> f32 {
    x.clamp(0.0, (field_width - width).max(0.0))
}
