//! Axis-aligned rectangle primitives shared by every rule kind.
//!
//! All rectangles use the page's top-left origin: `y` grows downwards.
//! Containment tests are inclusive on every edge because extracted token
//! boxes frequently touch rule boundaries exactly.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by two corners.
///
/// Corners are not required to be ordered; every predicate normalizes them
/// first. Use [`Rect::normalized`] to get `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns the same rectangle with min/max corners per axis.
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.x1 + self.x2) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f64 {
        (self.y1 + self.y2) / 2.0
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let a = self.normalized();
        let b = other.normalized();
        Rect {
            x1: a.x1.min(b.x1),
            y1: a.y1.min(b.y1),
            x2: a.x2.max(b.x2),
            y2: a.y2.max(b.y2),
        }
    }

    /// Grows the rectangle by `dx` on both horizontal sides and `dy` on both
    /// vertical sides.
    pub fn expand(&self, dx: f64, dy: f64) -> Rect {
        let r = self.normalized();
        Rect {
            x1: r.x1 - dx,
            y1: r.y1 - dy,
            x2: r.x2 + dx,
            y2: r.y2 + dy,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }
}

/// Inclusive point-in-rectangle test on normalized corners.
pub fn point_in_rect(rx1: f64, ry1: f64, rx2: f64, ry2: f64, px: f64, py: f64) -> bool {
    let (left, right) = (rx1.min(rx2), rx1.max(rx2));
    let (top, bottom) = (ry1.min(ry2), ry1.max(ry2));
    px >= left && px <= right && py >= top && py <= bottom
}

/// True iff `inner` lies entirely within `outer`, edges included.
pub fn rect_contains(outer: &Rect, inner: &Rect) -> bool {
    let o = outer.normalized();
    let i = inner.normalized();
    i.x1 >= o.x1 && i.x2 <= o.x2 && i.y1 >= o.y1 && i.y2 <= o.y2
}

/// Standard rectangle intersection test; touching edges count as overlap.
pub fn rect_overlaps(a: &Rect, b: &Rect) -> bool {
    let a = a.normalized();
    let b = b.normalized();
    a.x1 <= b.x2 && b.x1 <= a.x2 && a.y1 <= b.y2 && b.y1 <= a.y2
}

/// Loose "inside the region" test used by token search.
///
/// Either horizontal edge of `candidate` must fall within the region's
/// x-span, and either vertical edge within its y-span. A token wider than
/// the region on both sides is therefore not a candidate.
pub fn any_edge_in_range(region: &Rect, candidate: &Rect) -> bool {
    let r = region.normalized();
    let c = candidate.normalized();
    let in_x = |x: f64| x >= r.x1 && x <= r.x2;
    let in_y = |y: f64| y >= r.y1 && y <= r.y2;
    (in_x(c.x1) || in_x(c.x2)) && (in_y(c.y1) || in_y(c.y2))
}
