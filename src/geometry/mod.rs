//! Geometry primitives: rectangles, points, vectors, sizes and affine/perspective
//! matrices, plus the rounding helpers that give pixel semantics to float math.
//!
//! Grounded on the teacher's `src/rect.rs` and `src/transform.rs`: same generic
//! `Rect<T>` shape and the same style of inherent methods, extended with the
//! integer rounding and matrix-classification machinery spec.md §3 requires.

mod matrix;
mod point;
mod rect;

pub use matrix::{Matrix, MatrixClass};
pub use point::{ISize, Point, Size, Vector};
pub use rect::{IRect, Rect};

/// `kRoundEpsilon`: guards against float math producing a sub-pixel overshoot
/// from operations that would yield integers in infinite precision.
///
/// Open question (spec.md §9, unresolved by design): whether this should be
/// relative to rectangle magnitude rather than an absolute constant. Kept
/// absolute here, matching the single empirically-chosen constant the spec
/// names.
pub const ROUND_EPSILON: f64 = 1e-3;
