//! Page-relative rectangles

use serde::{Deserialize, Serialize};

/// Tolerance for floating error on the right/bottom page edge
pub const RECT_EPSILON: f64 = 1e-6;

/// Rectangle in `[0,1]` page-relative coordinates, origin top-left.
///
/// Independent of render scale: `x`/`w` are fractions of the page width,
/// `y`/`h` fractions of the page height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedRect {
    /// Build from edges, clamping into the unit square
    pub fn from_edges(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        let x0 = min_x.clamp(0.0, 1.0);
        let y0 = min_y.clamp(0.0, 1.0);
        let x1 = max_x.clamp(x0, 1.0);
        let y1 = max_y.clamp(y0, 1.0);
        Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
    }

    /// Full page width, thin strip at the top. Used when a quote can't be located.
    pub fn placeholder() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 0.05,
        }
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.h / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Check the page-relative invariant
    pub fn is_valid(&self) -> bool {
        let finite = self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite();
        finite
            && self.x >= 0.0
            && self.y >= 0.0
            && self.w >= 0.0
            && self.h >= 0.0
            && self.right() <= 1.0 + RECT_EPSILON
            && self.bottom() <= 1.0 + RECT_EPSILON
    }
}
