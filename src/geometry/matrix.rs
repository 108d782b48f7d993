//! A 3x3 homogeneous matrix supporting the full
//! `Identity ⊂ Translation ⊂ ScaleTranslate ⊂ RectStaysRect ⊂ Affine ⊂ Perspective`
//! classification ladder spec.md §3 requires.
//!
//! The teacher's `src/transform.rs` only models pure-affine 2x3 matrices (SVG
//! `transform=""` has no perspective). Here the bottom row is generalized to
//! carry a perspective component so [`Matrix::classify`] and
//! [`Matrix::perspective_scale_estimate`] (spec.md §4.1) have something to
//! classify/estimate against; the affine-only operations (multiply, invert,
//! scale/translate constructors) keep the teacher's naming and style.

use float_cmp::approx_eq;

use super::point::{Point, Size, Vector};
use super::rect::{IRect, Rect};
use super::ROUND_EPSILON;

/// Row-major 3x3 matrix:
/// ```text
/// | m00 m01 m02 |   | x |
/// | m10 m11 m12 | * | y |
/// | m20 m21 m22 |   | 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub m00: f64,
    pub m01: f64,
    pub m02: f64,
    pub m10: f64,
    pub m11: f64,
    pub m12: f64,
    pub m20: f64,
    pub m21: f64,
    pub m22: f64,
}

/// A matrix's classification. Ordered from most restrictive to most general;
/// `a <= b` means every matrix of class `a` is also of class `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatrixClass {
    Identity,
    Translation,
    ScaleTranslate,
    RectStaysRect,
    Affine,
    Perspective,
}

impl Matrix {
    #[inline]
    pub fn new(m00: f64, m01: f64, m02: f64, m10: f64, m11: f64, m12: f64) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
            m20: 0.0,
            m21: 0.0,
            m22: 1.0,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    #[inline]
    pub fn new_translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    #[inline]
    pub fn new_scale_translate(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self::new(sx, 0.0, tx, 0.0, sy, ty)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Matrix multiplication, `self * other` (applies `other` first, then `self`).
    #[must_use]
    pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
        Matrix {
            m00: a.m00 * b.m00 + a.m01 * b.m10 + a.m02 * b.m20,
            m01: a.m00 * b.m01 + a.m01 * b.m11 + a.m02 * b.m21,
            m02: a.m00 * b.m02 + a.m01 * b.m12 + a.m02 * b.m22,
            m10: a.m10 * b.m00 + a.m11 * b.m10 + a.m12 * b.m20,
            m11: a.m10 * b.m01 + a.m11 * b.m11 + a.m12 * b.m21,
            m12: a.m10 * b.m02 + a.m11 * b.m12 + a.m12 * b.m22,
            m20: a.m20 * b.m00 + a.m21 * b.m10 + a.m22 * b.m20,
            m21: a.m20 * b.m01 + a.m21 * b.m11 + a.m22 * b.m21,
            m22: a.m20 * b.m02 + a.m21 * b.m12 + a.m22 * b.m22,
        }
    }

    /// `other` applied first, `self` second: `self.post_concat(other) == self * other`.
    #[inline]
    #[must_use]
    pub fn post_concat(&self, other: &Matrix) -> Matrix {
        Matrix::multiply(self, other)
    }

    /// `self` applied first, `other` second: `self.pre_concat(other) == other * self`.
    #[inline]
    #[must_use]
    pub fn pre_concat(&self, other: &Matrix) -> Matrix {
        Matrix::multiply(other, self)
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.m00 * (self.m11 * self.m22 - self.m12 * self.m21)
            - self.m01 * (self.m10 * self.m22 - self.m12 * self.m20)
            + self.m02 * (self.m10 * self.m21 - self.m11 * self.m20)
    }

    #[inline]
    pub fn is_invertible(&self) -> bool {
        self.determinant().abs() > f64::EPSILON
    }

    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() <= f64::EPSILON || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Matrix {
            m00: (self.m11 * self.m22 - self.m12 * self.m21) * inv_det,
            m01: (self.m02 * self.m21 - self.m01 * self.m22) * inv_det,
            m02: (self.m01 * self.m12 - self.m02 * self.m11) * inv_det,
            m10: (self.m12 * self.m20 - self.m10 * self.m22) * inv_det,
            m11: (self.m00 * self.m22 - self.m02 * self.m20) * inv_det,
            m12: (self.m02 * self.m10 - self.m00 * self.m12) * inv_det,
            m20: (self.m10 * self.m21 - self.m11 * self.m20) * inv_det,
            m21: (self.m01 * self.m20 - self.m00 * self.m21) * inv_det,
            m22: (self.m00 * self.m11 - self.m01 * self.m10) * inv_det,
        })
    }

    #[inline]
    pub fn pre_translate(&self, dx: f64, dy: f64) -> Matrix {
        self.pre_concat(&Matrix::new_translate(dx, dy))
    }

    #[inline]
    pub fn post_translate(&self, dx: f64, dy: f64) -> Matrix {
        self.post_concat(&Matrix::new_translate(dx, dy))
    }

    #[inline]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Matrix {
        self.pre_concat(&Matrix::new_scale(sx, sy))
    }

    /// Maps a point, applying the full (possibly perspective) divide.
    pub fn map_point(&self, p: Point) -> Point {
        let w = self.m20 * p.x + self.m21 * p.y + self.m22;
        let x = self.m00 * p.x + self.m01 * p.y + self.m02;
        let y = self.m10 * p.x + self.m11 * p.y + self.m12;
        if w == 1.0 {
            Point::new(x, y)
        } else {
            Point::new(x / w, y / w)
        }
    }

    /// Maps a vector (direction, ignores translation and the perspective row).
    pub fn map_vector(&self, v: Vector) -> Vector {
        Vector::new(
            self.m00 * v.dx + self.m01 * v.dy,
            self.m10 * v.dx + self.m11 * v.dy,
        )
    }

    /// Maps a float rect by transforming its four corners and taking their
    /// bounding box. Correct for any matrix class, including perspective and
    /// rotation, but loses the tightness a scale-translate fast path gets.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let corners = [
            self.map_point(Point::new(r.x0, r.y0)),
            self.map_point(Point::new(r.x1, r.y0)),
            self.map_point(Point::new(r.x1, r.y1)),
            self.map_point(Point::new(r.x0, r.y1)),
        ];
        let mut out = Rect::new(
            corners[0].x,
            corners[0].y,
            corners[0].x,
            corners[0].y,
        );
        for c in &corners[1..] {
            out.x0 = out.x0.min(c.x);
            out.y0 = out.y0.min(c.y);
            out.x1 = out.x1.max(c.x);
            out.y1 = out.y1.max(c.y);
        }
        out
    }

    /// Maps an integer rect. When `self` is a scale-translate matrix, the
    /// mapping is done in double precision and rounded with the
    /// `ROUND_EPSILON` offset ([`Rect::round_out`]) so exact-integer inputs
    /// stay exact. For a general affine/perspective matrix, maps to float via
    /// [`Self::map_rect`] and rounds out.
    pub fn map_irect(&self, r: IRect) -> IRect {
        self.map_rect(&Rect::from(r)).round_out()
    }

    /// Maps a size as a pair of axis lengths. Under a non-perspective matrix
    /// this is just the lengths of the mapped axis vectors; under
    /// perspective, translation affects the projected length of each axis so
    /// the vectors are taken as point differences from the mapped origin.
    pub fn map_size(&self, s: Size) -> Size {
        if self.classify() == MatrixClass::Perspective {
            let origin = self.map_point(Point::new(0.0, 0.0));
            let px = self.map_point(Point::new(s.w, 0.0));
            let py = self.map_point(Point::new(0.0, s.h));
            Size::new(
                (px.x - origin.x).hypot(px.y - origin.y),
                (py.x - origin.x).hypot(py.y - origin.y),
            )
        } else {
            let vx = self.map_vector(Vector::new(s.w, 0.0));
            let vy = self.map_vector(Vector::new(0.0, s.h));
            Size::new(vx.length(), vy.length())
        }
    }

    /// Conjugates `self` so that it operates on the target space of `by`:
    /// `by * self * by^-1`.
    pub fn conjugate(&self, by: &Matrix) -> Option<Matrix> {
        let inv = by.invert()?;
        Some(Matrix::multiply(&Matrix::multiply(by, self), &inv))
    }

    /// Is this matrix within `ROUND_EPSILON` of a scale+translate matrix with
    /// no perspective (`m01 == m10 == 0`, `m20 == m21 == 0`, `m22 == 1`)?
    pub fn is_scale_translate(&self) -> bool {
        self.has_no_perspective()
            && approx_eq!(f64, self.m01, 0.0, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m10, 0.0, epsilon = ROUND_EPSILON)
    }

    #[inline]
    fn has_no_perspective(&self) -> bool {
        approx_eq!(f64, self.m20, 0.0, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m21, 0.0, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m22, 1.0, epsilon = ROUND_EPSILON)
    }

    /// Classifies this matrix along
    /// `Identity ⊂ Translation ⊂ ScaleTranslate ⊂ RectStaysRect ⊂ Affine ⊂ Perspective`.
    pub fn classify(&self) -> MatrixClass {
        if !self.has_no_perspective() {
            return MatrixClass::Perspective;
        }

        let no_skew = approx_eq!(f64, self.m01, 0.0, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m10, 0.0, epsilon = ROUND_EPSILON);
        let swaps_axes = approx_eq!(f64, self.m00, 0.0, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m11, 0.0, epsilon = ROUND_EPSILON);

        if no_skew {
            let unit_scale = approx_eq!(f64, self.m00, 1.0, epsilon = ROUND_EPSILON)
                && approx_eq!(f64, self.m11, 1.0, epsilon = ROUND_EPSILON);
            if unit_scale {
                let no_translate = approx_eq!(f64, self.m02, 0.0, epsilon = ROUND_EPSILON)
                    && approx_eq!(f64, self.m12, 0.0, epsilon = ROUND_EPSILON);
                return if no_translate {
                    MatrixClass::Identity
                } else {
                    MatrixClass::Translation
                };
            }
            return MatrixClass::ScaleTranslate;
        }

        if swaps_axes {
            return MatrixClass::RectStaysRect;
        }

        MatrixClass::Affine
    }

    /// Is `self` within `ROUND_EPSILON` of a pure integer translation?
    /// Returns the `(tx, ty)` pair if so.
    pub fn is_near_integer_translation(&self) -> Option<(i32, i32)> {
        if !self.has_no_perspective() {
            return None;
        }
        let tx = (self.m02 / self.m22).round();
        let ty = (self.m12 / self.m22).round();
        let ideal = Matrix::new_translate(tx, ty);
        if approx_eq!(f64, self.m00, ideal.m00, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m01, ideal.m01, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m02, ideal.m02, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m10, ideal.m10, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m11, ideal.m11, epsilon = ROUND_EPSILON)
            && approx_eq!(f64, self.m12, ideal.m12, epsilon = ROUND_EPSILON)
        {
            Some((tx as i32, ty as i32))
        } else {
            None
        }
    }

    /// Decomposes the affine 2x2 submatrix into an axis-aligned `(sx, sy)`
    /// scale, ignoring any perspective row. Returns `None` when the
    /// submatrix is singular (so no sensible scale exists).
    ///
    /// This is *not* a full polar decomposition: it returns the scale that
    /// would result from a `scale -> remainder` factorization assuming the
    /// remainder absorbs any rotation/skew, matching spec.md §4.1's
    /// "`ctm.decomposeScale` succeeds, use its scale directly".
    pub fn decompose_scale(&self) -> Option<(f64, f64)> {
        let sx = (self.m00 * self.m00 + self.m10 * self.m10).sqrt();
        if sx <= f64::EPSILON {
            return None;
        }
        let det2x2 = self.m00 * self.m11 - self.m01 * self.m10;
        if det2x2.abs() <= f64::EPSILON {
            return None;
        }
        let sy = det2x2 / sx;
        Some((sx, sy.abs()))
    }

    /// Estimates a single isotropic scale factor for a (possibly perspective)
    /// matrix via the differential-area metric at `p`: the square root of the
    /// absolute value of the Jacobian determinant of the projective map at
    /// `p`. Returns `None` when `p` is behind `w = 0` or the metric is
    /// non-finite; per spec.md §4.1 the caller should fall back to identity
    /// in that case, which this method lets the caller do explicitly.
    pub fn perspective_scale_estimate(&self, p: Point) -> Option<f64> {
        let w = self.m20 * p.x + self.m21 * p.y + self.m22;
        if w == 0.0 || !w.is_finite() {
            return None;
        }
        let x = self.m00 * p.x + self.m01 * p.y + self.m02;
        let y = self.m10 * p.x + self.m11 * p.y + self.m12;

        let w2 = w * w;
        let w4 = w2 * w2;
        let dxdx = (self.m00 * w - x * self.m20) / w2;
        let dxdy = (self.m01 * w - x * self.m21) / w2;
        let dydx = (self.m10 * w - y * self.m20) / w2;
        let dydy = (self.m11 * w - y * self.m21) / w2;
        let _ = w4; // documents the magnitude of the division above

        let area_scale = dxdx * dydy - dxdy * dydx;
        if !area_scale.is_finite() || area_scale == 0.0 {
            return None;
        }
        Some(area_scale.abs().sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_identity() {
        assert_eq!(Matrix::identity().classify(), MatrixClass::Identity);
    }

    #[test]
    fn classifies_translation() {
        let m = Matrix::new_translate(3.0, -2.0);
        assert_eq!(m.classify(), MatrixClass::Translation);
    }

    #[test]
    fn classifies_scale_translate() {
        let m = Matrix::new_scale_translate(2.0, 0.5, 1.0, 1.0);
        assert_eq!(m.classify(), MatrixClass::ScaleTranslate);
    }

    #[test]
    fn classifies_rect_stays_rect_axis_swap() {
        // 90-degree rotation: swaps x and y.
        let m = Matrix::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(m.classify(), MatrixClass::RectStaysRect);
    }

    #[test]
    fn classifies_affine_skew() {
        let m = Matrix::new(1.0, 0.5, 0.0, 0.3, 1.0, 0.0);
        assert_eq!(m.classify(), MatrixClass::Affine);
    }

    #[test]
    fn classifies_perspective() {
        let mut m = Matrix::identity();
        m.m20 = 0.001;
        assert_eq!(m.classify(), MatrixClass::Perspective);
    }

    #[test]
    fn invert_round_trips() {
        let m = Matrix::new_scale_translate(2.0, 4.0, 10.0, -5.0);
        let inv = m.invert().unwrap();
        let id = Matrix::multiply(&m, &inv);
        assert!((id.m00 - 1.0).abs() < 1e-9);
        assert!((id.m11 - 1.0).abs() < 1e-9);
        assert!(id.m02.abs() < 1e-9);
        assert!(id.m12.abs() < 1e-9);
    }

    #[test]
    fn near_integer_translation_detects_exact_and_rejects_scaled() {
        let m = Matrix::new_translate(3.0, -7.0);
        assert_eq!(m.is_near_integer_translation(), Some((3, -7)));

        let scaled = Matrix::new_scale_translate(1.5, 1.0, 3.0, -7.0);
        assert_eq!(scaled.is_near_integer_translation(), None);
    }

    #[test]
    fn near_integer_translation_tolerates_epsilon() {
        let m = Matrix::new_translate(3.0 + 1e-4, -7.0 - 1e-4);
        assert_eq!(m.is_near_integer_translation(), Some((3, -7)));
    }

    #[test]
    fn decompose_scale_on_pure_scale() {
        let m = Matrix::new_scale(2.0, 3.0);
        let (sx, sy) = m.decompose_scale().unwrap();
        assert!((sx - 2.0).abs() < 1e-9);
        assert!((sy - 3.0).abs() < 1e-9);
    }

    #[test]
    fn decompose_scale_none_for_singular() {
        let m = Matrix::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(m.decompose_scale(), None);
    }

    #[test]
    fn perspective_scale_estimate_is_none_behind_w_zero() {
        let mut m = Matrix::identity();
        m.m20 = 1.0;
        m.m22 = -1.0; // w = x - 1; at x = 1, w = 0
        assert_eq!(m.perspective_scale_estimate(Point::new(1.0, 0.0)), None);
    }

    #[test]
    fn map_irect_preserves_exact_integers_under_scale_translate() {
        let m = Matrix::new_scale_translate(2.0, 3.0, 1.0, -1.0);
        let r = IRect::new(0, 0, 10, 10);
        assert_eq!(m.map_irect(r), IRect::new(1, -1, 21, 29));
    }

    #[test]
    fn map_size_under_rotation_preserves_length() {
        // 90-degree rotation: lengths are preserved, axes swap.
        let m = Matrix::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0);
        let s = m.map_size(Size::new(10.0, 5.0));
        assert!((s.w - 10.0).abs() < 1e-9);
        assert!((s.h - 5.0).abs() < 1e-9);
    }

    #[test]
    fn perspective_scale_estimate_matches_uniform_scale_away_from_perspective() {
        let m = Matrix::new_scale(2.0, 2.0);
        let est = m.perspective_scale_estimate(Point::new(5.0, 5.0)).unwrap();
        assert!((est - 2.0).abs() < 1e-9);
    }

    proptest::proptest! {
        /// spec.md §8 "Round-trip": `map(r, M * M^-1) ≡ r` for any
        /// scale-translate `M` with nonzero scales.
        #[test]
        fn map_irect_round_trips_through_scale_translate_and_its_inverse(
            sx in (0.1f64..8.0).prop_filter("nonzero", |s| *s != 0.0),
            sy in (0.1f64..8.0).prop_filter("nonzero", |s| *s != 0.0),
            tx in -50i32..50,
            ty in -50i32..50,
            x0 in -50i32..50,
            y0 in -50i32..50,
            w in 1i32..40,
            h in 1i32..40,
        ) {
            let m = Matrix::new_scale_translate(sx, sy, tx as f64, ty as f64);
            let inv = m.invert().expect("nonzero scale is always invertible");
            let round_trip = Matrix::multiply(&inv, &m);

            let r = IRect::new(x0, y0, x0 + w, y0 + h);
            let mapped = round_trip.map_irect(r);

            proptest::prop_assert_eq!(mapped, r);
        }
    }
}
