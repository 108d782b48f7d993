//! Internal error types.
//!
//! The public operation surface is total: every [`crate::filter_result::FilterResult`]
//! operation returns a `FilterResult`, empty on failure, per the error-handling design
//! (empty result is the single failure value). `CoreError` exists only so that the
//! *internal* fallible steps that produce that emptiness (a non-invertible matrix, a
//! backend surface allocation failure, ...) have a named cause that can be logged at
//! `debug` level before being collapsed.

use std::fmt;

use thiserror::Error;

/// A cause for an operation to collapse to an empty `FilterResult`.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// [`crate::mapping::Mapping::decompose_ctm`] or
    /// [`crate::mapping::Mapping::adjust_layer_space`] was given a singular matrix.
    #[error("matrix is not invertible")]
    NonInvertibleMatrix,

    /// The backend's `make_device` returned `None`.
    #[error("backend surface allocation failed for size {0:?}")]
    SurfaceAllocationFailed(IntSize),

    /// A tile-mode simplification detected that the transform would lose pixel
    /// precision if represented as a plain axis-aligned mapping (see
    /// `periodic_axis_transform` in the crop decision ladder).
    #[error("transform does not round-trip exactly as a periodic axis mapping")]
    LossyPeriodicTransform,

    /// The desired output or an input rectangle was empty.
    #[error("empty rectangle: {0}")]
    EmptyRegion(&'static str),
}

/// Lightweight `(width, height)` pair, used only for error messages so that
/// `error.rs` has no dependency on `geometry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntSize {
    pub width: i32,
    pub height: i32,
}

impl fmt::Display for IntSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
