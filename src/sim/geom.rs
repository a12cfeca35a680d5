//! Axis-aligned rectangles
//!
//! Screen space: origin top-left, y grows downward. A rect is stored by its
//! top-left corner and size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
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

    /// Rect centered on a point
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    /// Build a rect only from finite, non-negative extents.
    ///
    /// A `None` means the geometry is not usable this frame and any
    /// interaction depending on it should be skipped.
    pub fn checked(pos: Vec2, size: Vec2) -> Option<Self> {
        if pos.is_finite() && size.is_finite() && size.x >= 0.0 && size.y >= 0.0 {
            Some(Self::new(pos.x, pos.y, size.x, size.y))
        } else {
            None
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Same rect moved horizontally to `x`
    pub fn with_x(&self, x: f32) -> Self {
        Self { x, ..*self }
    }
}
