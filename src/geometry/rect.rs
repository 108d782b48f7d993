//! Rectangle types: `Rect` (float, half-open `[x0, x1) x [y0, y1)`) and `IRect`
//! (integer, same half-open convention).
//!
//! Grounded on the teacher's `src/rect.rs`: same generic-over-scalar shape for
//! the shared arithmetic, specialized methods for the float and integer
//! instantiations.

use super::ROUND_EPSILON;

fn min<T: PartialOrd>(x: T, y: T) -> T {
    if x <= y {
        x
    } else {
        y
    }
}

fn max<T: PartialOrd>(x: T, y: T) -> T {
    if x >= y {
        x
    } else {
        y
    }
}

/// A half-open axis-aligned rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn from_size(w: f64, h: f64) -> Self {
        Self::new(0.0, 0.0, w, h)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    #[inline]
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x0 * sx, self.y0 * sy, self.x1 * sx, self.y1 * sy)
    }

    /// Grows the rectangle by `d` on every side. Negative `d` shrinks it, and
    /// may produce an empty (or inverted-looking, but treated as empty) rect.
    #[inline]
    pub fn outset(&self, d: f64) -> Self {
        Self::new(self.x0 - d, self.y0 - d, self.x1 + d, self.y1 + d)
    }

    #[inline]
    pub fn inset(&self, d: f64) -> Self {
        self.outset(-d)
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let r = Self::new(
            max(self.x0, other.x0),
            max(self.y0, other.y0),
            min(self.x1, other.x1),
            min(self.y1, other.y1),
        );
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            min(self.x0, other.x0),
            min(self.y0, other.y0),
            max(self.x1, other.x1),
            max(self.y1, other.y1),
        )
    }

    #[inline]
    pub fn contains_rect(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        self.x0 <= other.x0 + ROUND_EPSILON
            && self.y0 <= other.y0 + ROUND_EPSILON
            && self.x1 >= other.x1 - ROUND_EPSILON
            && self.y1 >= other.y1 - ROUND_EPSILON
    }

    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// `(r inset by +eps).round_out()`: the smallest integer rect containing
    /// `self`, with a tolerance so that values that are integers up to float
    /// error round to that integer rather than overshooting outward.
    pub fn round_out(&self) -> IRect {
        IRect::new(
            (self.x0 + ROUND_EPSILON).floor() as i32,
            (self.y0 + ROUND_EPSILON).floor() as i32,
            (self.x1 - ROUND_EPSILON).ceil() as i32,
            (self.y1 - ROUND_EPSILON).ceil() as i32,
        )
    }

    /// `(r outset by +eps).round_in()`: the largest integer rect contained in
    /// `self`, with the same tolerance as [`Self::round_out`].
    pub fn round_in(&self) -> IRect {
        let r = IRect::new(
            (self.x0 - ROUND_EPSILON).ceil() as i32,
            (self.y0 - ROUND_EPSILON).ceil() as i32,
            (self.x1 + ROUND_EPSILON).floor() as i32,
            (self.y1 + ROUND_EPSILON).floor() as i32,
        );
        if r.is_empty() {
            IRect::default()
        } else {
            r
        }
    }
}

impl From<IRect> for Rect {
    #[inline]
    fn from(r: IRect) -> Self {
        Self::new(r.x0 as f64, r.y0 as f64, r.x1 as f64, r.y1 as f64)
    }
}

/// A half-open integer rectangle `[x0, x1) x [y0, y1)`.
///
/// Empty iff `x1 <= x0` or `y1 <= y0`. Empty rectangles are absorbing under
/// intersection and neutral under union.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl IRect {
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn from_size(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }

    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    #[inline]
    pub fn outset(&self, d: i32) -> Self {
        Self::new(self.x0 - d, self.y0 - d, self.x1 + d, self.y1 + d)
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let r = Self::new(
            max(self.x0, other.x0),
            max(self.y0, other.y0),
            min(self.x1, other.x1),
            min(self.y1, other.y1),
        );
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            min(self.x0, other.x0),
            min(self.y0, other.y0),
            max(self.x1, other.x1),
            max(self.y1, other.y1),
        )
    }

    #[inline]
    pub fn contains_rect(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
            && self.x0 <= other.x0
            && self.y0 <= other.y0
            && self.x1 >= other.x1
            && self.y1 >= other.y1
    }

    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Scales an integer rect by float factors, producing the smallest
    /// integer rect that covers the scaled float rect (outward rounding,
    /// like the teacher's `Rect<i32>::scale`).
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Rect::from(*self).scale(sx, sy).round_out()
    }
}
