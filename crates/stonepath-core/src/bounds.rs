//! Axis-aligned bounding boxes as reported by the host binding.
//!
//! Hosts report boxes as (left, bottom, right, top) in a y-up document space.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    /// Create bounds from edges. Swapped edges are normalized.
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        debug_assert!(
            left.is_finite() && bottom.is_finite() && right.is_finite() && top.is_finite(),
            "bounds must be finite, got ({left}, {bottom}, {right}, {top})"
        );
        Self {
            left: left.min(right),
            bottom: bottom.min(top),
            right: left.max(right),
            top: bottom.max(top),
        }
    }

    /// Create bounds from an origin corner and a size
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest bounds enclosing all points, or `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bounds.left = bounds.left.min(p.x);
            bounds.bottom = bounds.bottom.min(p.y);
            bounds.right = bounds.right.max(p.x);
            bounds.top = bounds.top.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }

    /// Larger of width and height
    pub fn max_dimension(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Mean of width and height, used as the diameter of round elements
    pub fn mean_dimension(&self) -> f64 {
        (self.width() + self.height()) / 2.0
    }

    /// Inclusive containment test
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// Shrink every edge by `margin`, collapsing to the center when too small
    pub fn inset(&self, margin: f64) -> Bounds {
        let c = self.center();
        let half_w = (self.width() / 2.0 - margin).max(0.0);
        let half_h = (self.height() / 2.0 - margin).max(0.0);
        Bounds::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h)
    }

    /// Smallest bounds enclosing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.left.min(other.left),
            self.bottom.min(other.bottom),
            self.right.max(other.right),
            self.top.max(other.top),
        )
    }

    /// Bounds moved by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(self.left + dx, self.bottom + dy, self.right + dx, self.top + dy)
    }
}
