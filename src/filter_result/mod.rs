//! `FilterResult`: a lazy image plus pending transform, sampling, tile mode,
//! color filter and layer-space crop (spec.md §3 "FilterResult", §4.2-§4.9).
//!
//! Grounded in role on the teacher's `FilterInput`/`filters::context` duo
//! (`src/filters/context.rs`), which likewise wraps a possibly-absent
//! rendered surface together with the bounding box it is valid within and
//! defers materialization until a primitive actually needs pixels.

mod bounds;
mod color_filter;
mod crop;
mod draw;
mod rescale;
mod resolve;
mod shader;
mod transform;

pub use bounds::{BoundsAnalysis, BoundsAnalysisResult};

use std::sync::Arc;

use crate::backend::{ColorFilter, SpecialImage};
use crate::geometry::Matrix;
use crate::sampling::{SamplingOptions, TileMode, DEFAULT_SAMPLING};
use crate::space::{LayerIRect, Space};

/// A lazily-evaluated image: an optional source image, the pending
/// axis-aligned (usually) transform from its pixel rectangle into layer
/// space, the sampling to use when drawing it, a tile mode, an optional
/// color filter applied after sampling, and a layer-space crop.
///
/// `image = None` means transparent black everywhere; every other field is
/// then meaningless and must have been reset by whichever constructor
/// produced the empty value (spec.md's "Invariants").
#[derive(Clone)]
pub struct FilterResult {
    image: Option<Arc<dyn SpecialImage>>,
    transform: Matrix,
    sampling: SamplingOptions,
    tile_mode: TileMode,
    color_filter: Option<Arc<dyn ColorFilter>>,
    layer_bounds: LayerIRect,
}

impl FilterResult {
    /// The canonical transparent-black value.
    pub fn empty() -> Self {
        Self {
            image: None,
            transform: Matrix::identity(),
            sampling: DEFAULT_SAMPLING,
            tile_mode: TileMode::Decal,
            color_filter: None,
            layer_bounds: LayerIRect::default(),
        }
    }

    /// Wraps a raw image with an identity-sampling, decal-tiled result whose
    /// layer bounds exactly cover the image's mapped pixel rectangle.
    pub fn from_image(image: Arc<dyn SpecialImage>, transform: Matrix, tile_mode: TileMode) -> Self {
        let layer_bounds = transform.map_irect(image.subset());
        Self {
            image: Some(image),
            transform,
            sampling: DEFAULT_SAMPLING,
            tile_mode,
            color_filter: None,
            layer_bounds: Space::reinterpret(layer_bounds),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    #[inline]
    pub fn image(&self) -> Option<&Arc<dyn SpecialImage>> {
        self.image.as_ref()
    }

    #[inline]
    pub fn transform(&self) -> Matrix {
        self.transform
    }

    #[inline]
    pub fn sampling(&self) -> SamplingOptions {
        self.sampling
    }

    #[inline]
    pub fn tile_mode(&self) -> TileMode {
        self.tile_mode
    }

    #[inline]
    pub fn color_filter(&self) -> Option<&Arc<dyn ColorFilter>> {
        self.color_filter.as_ref()
    }

    #[inline]
    pub fn layer_bounds(&self) -> LayerIRect {
        self.layer_bounds
    }
}

impl std::fmt::Debug for FilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterResult")
            .field("image", &self.image.as_ref().map(|i| i.subset()))
            .field("transform", &self.transform)
            .field("sampling", &self.sampling)
            .field("tile_mode", &self.tile_mode)
            .field("has_color_filter", &self.color_filter.is_some())
            .field("layer_bounds", &self.layer_bounds)
            .finish()
    }
}
