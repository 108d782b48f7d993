//! A backend-agnostic 2D image-filter evaluation core: typed coordinate
//! spaces, a lazily-materialized [`filter_result::FilterResult`] value, a
//! bounds analyzer, a quality-preserving multi-pass downscaler, and a small
//! [`builder::Builder`] for composing results (merge / draw-shader / blur).
//!
//! Concrete pixel backends, the image-filter node DAG, picture recording,
//! and the public drawing API are all out of scope here — see
//! [`backend`] for the trait boundary a caller is expected to implement.
//!
//! # Logging
//!
//! Diagnostic output goes through the [`log`] crate rather than a
//! project-specific macro: `trace!` for algebra-branch decisions (matrix
//! classification choices, sampling-merge fallbacks) and `debug!` for
//! materialization events (offscreen surface allocation, cache misses). A
//! caller wires up a subscriber (`env_logger` in this crate's own tests and
//! benches); nothing here assumes one is installed.
//!
//! # Errors
//!
//! Internal fallibility (a singular matrix, a failed surface allocation, an
//! attempt to crop a periodic tile mode losslessly) is represented by
//! [`error::CoreError`]. At the public boundary of [`filter_result`] and
//! [`builder`], failure collapses to an empty [`filter_result::FilterResult`]
//! rather than propagating a `Result` further, matching the "a filter that
//! cannot be evaluated draws nothing" contract most callers actually want.

pub mod backend;
pub mod builder;
pub mod context;
pub mod error;
pub mod filter_result;
pub mod geometry;
pub mod mapping;
pub mod sampling;
pub mod space;
pub mod stats;
pub mod surface;
mod util;

#[cfg(test)]
mod testutil;

pub use backend::{Backend, BlurEngine, ColorSpace, Device, SpecialImage};
pub use builder::Builder;
pub use context::Context;
pub use error::{CoreError, CoreResult};
pub use filter_result::FilterResult;
pub use geometry::{IRect, ISize, Matrix, MatrixClass, Point, Rect, Size, Vector};
pub use mapping::{Capability, Mapping};
pub use sampling::{CubicResampler, FilterMode, MipmapMode, SamplingOptions, TileMode};
pub use stats::Stats;
