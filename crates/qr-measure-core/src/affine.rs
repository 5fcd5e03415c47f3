use crate::{Rect, Size};
use nalgebra::{Matrix3, Point2, Vector3};

/// 2D affine map stored as a 3x3 homogeneous matrix with last row `[0 0 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMap {
    pub m: Matrix3<f64>,
}

impl AffineMap {
    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn new(m: Matrix3<f64>) -> Self {
        Self { m }
    }

    /// Build from the top two rows `[[a, b, tx], [c, d, ty]]`.
    pub fn from_array(rows: [[f64; 3]; 2]) -> Self {
        Self::new(Matrix3::new(
            rows[0][0], rows[0][1], rows[0][2], //
            rows[1][0], rows[1][1], rows[1][2], //
            0.0, 0.0, 1.0,
        ))
    }

    /// Translation by `(tx, ty)` after a uniform scale `s`.
    pub fn scale_translate(s: f64, tx: f64, ty: f64) -> Self {
        Self::from_array([[s, 0.0, tx], [0.0, s, ty]])
    }

    /// Image-to-display map for an aspect-fit presentation.
    ///
    /// The image is scaled uniformly by the smaller of the two axis ratios and
    /// centred, leaving equal margins on the letterboxed axis. Returns `None`
    /// when either size is zero, negative or not finite.
    pub fn aspect_fit(image: Size, display: Size) -> Option<Self> {
        if !image.is_usable() || !display.is_usable() {
            return None;
        }
        let s = (display.width / image.width).min(display.height / image.height);
        let tx = 0.5 * (display.width - image.width * s);
        let ty = 0.5 * (display.height - image.height * s);
        Some(Self::scale_translate(s, tx, ty))
    }

    /// Inverse of [`AffineMap::aspect_fit`]: display coordinates back to image pixels.
    pub fn display_to_image(image: Size, display: Size) -> Option<Self> {
        Self::aspect_fit(image, display)?.inverse()
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.m * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0], v[1])
    }

    /// Map a rectangle through its two opposite corners.
    ///
    /// Exact for scale + translation maps; for maps with rotation or shear the
    /// result is the box spanned by the mapped corners, not the full hull.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        Rect::from_corners(self.apply(r.min()), self.apply(r.max()))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(Self::new)
    }

    /// `self` applied after `first`.
    pub fn compose(&self, first: &AffineMap) -> Self {
        Self::new(self.m * first.m)
    }
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}
