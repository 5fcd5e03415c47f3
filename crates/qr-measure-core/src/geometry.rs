use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in a single coordinate space.
///
/// `(x, y)` is the top-left origin. A rectangle is usable only when
/// [`Rect::is_valid`] holds; every measuring operation checks it first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing both points, in any order.
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        Self::new(x0, y0, a.x.max(b.x) - x0, a.y.max(b.y) - y0)
    }

    /// Bounding box of a set of points; `None` for an empty set.
    pub fn bounding(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// No component is NaN and both extents are non-negative.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !(self.x.is_nan()
            || self.y.is_nan()
            || self.width.is_nan()
            || self.height.is_nan()
            || self.width < 0.0
            || self.height < 0.0)
    }

    #[inline]
    pub fn min(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Point2<f64> {
        Point2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }
}

/// Width/height pair used for image and display extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Finite and strictly positive on both axes.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}
