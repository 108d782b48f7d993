//! `Builder` (spec.md §4.10): composes several [`FilterResult`] inputs into
//! a merge, a shader fill, or a blur, each producing one fresh
//! `FilterResult`.
//!
//! Grounded in role on the teacher's multi-input filter primitives (e.g.
//! `filters::blend::Blend` / `filters::merge::Merge` in
//! `src/filters/blend.rs`), which likewise gather several already-rendered
//! inputs and composite them into one surface sized to their union.

use std::sync::Arc;

use crate::backend::Shader;
use crate::context::Context;
use crate::filter_result::FilterResult;
use crate::geometry::{IRect, ISize, Matrix};
use crate::sampling::{SamplingOptions, TileMode};
use crate::space::{LayerIRect, Space};
use crate::surface::AutoSurface;

/// One operand of a [`Builder`] composition.
#[derive(Clone)]
pub struct Input {
    result: FilterResult,
    sampling: SamplingOptions,
    sample_bounds_override: Option<LayerIRect>,
    prefer_shader: bool,
}

impl Input {
    pub fn new(result: FilterResult, sampling: SamplingOptions) -> Self {
        Self {
            result,
            sampling,
            sample_bounds_override: None,
            prefer_shader: false,
        }
    }

    #[inline]
    pub fn with_sample_bounds(mut self, bounds: LayerIRect) -> Self {
        self.sample_bounds_override = Some(bounds);
        self
    }

    #[inline]
    pub fn prefer_shader(mut self, prefer: bool) -> Self {
        self.prefer_shader = prefer;
        self
    }

    fn sample_bounds(&self) -> LayerIRect {
        self.sample_bounds_override.unwrap_or_else(|| self.result.layer_bounds())
    }
}

/// Accumulates [`Input`]s and produces a single [`FilterResult`] per
/// composition method; stateless beyond the inputs passed to each call.
#[derive(Default)]
pub struct Builder;

impl Builder {
    pub fn new() -> Self {
        Self
    }

    /// spec.md §4.10 "merge": draws every input in order into one surface
    /// sized to the union of their layer bounds (intersected with desired
    /// output). A single-input list is returned verbatim, with no surface
    /// allocated.
    pub fn merge(&self, ctx: &Context, inputs: &[Input]) -> FilterResult {
        let non_empty: Vec<&Input> = inputs.iter().filter(|i| !i.result.is_empty()).collect();
        if non_empty.is_empty() {
            return FilterResult::empty();
        }
        if inputs.len() == 1 {
            return inputs[0].result.clone();
        }

        let desired = ctx.desired_output().into_inner();
        let mut union_bounds = IRect::empty();
        for input in &non_empty {
            let b = input.sample_bounds().into_inner();
            union_bounds = if union_bounds.is_empty() {
                b
            } else {
                union_bounds.union(&b)
            };
        }
        let Some(bounds) = union_bounds.intersection(&desired) else {
            return FilterResult::empty();
        };
        if bounds.is_empty() {
            return FilterResult::empty();
        }

        let size = ISize::new(bounds.width(), bounds.height());
        let Some(mut surface) = AutoSurface::new(ctx.backend(), size, ctx.color_space()) else {
            return FilterResult::empty();
        };
        ctx.record_offscreen_surface();

        let layer_to_device = Matrix::new_translate(-bounds.x0 as f64, -bounds.y0 as f64);
        let device_bounds = IRect::from_size(size.w, size.h);
        for input in &non_empty {
            if input.prefer_shader {
                if let Some(shader) = input.result.as_shader(ctx, Some(input.sampling), input.sample_bounds()) {
                    surface.device_mut().draw_paint(Some(shader.as_ref()), None, None);
                    continue;
                }
            }
            input
                .result
                .draw(ctx, surface.device_mut(), layer_to_device, device_bounds, None, true);
        }

        match surface.snap(device_bounds) {
            Some(image) => FilterResult::from_image(
                image,
                Matrix::new_translate(bounds.x0 as f64, bounds.y0 as f64),
                TileMode::Decal,
            ),
            None => FilterResult::empty(),
        }
    }

    /// spec.md §4.10 "drawShader": fills a surface sized to the desired
    /// output with `shader`. When `use_layer_matrix` is set, the mapping's
    /// param-to-layer matrix is concatenated first so a shader defined in
    /// parameter space evaluates correctly in the device-space draw.
    pub fn draw_shader(&self, ctx: &Context, shader: &dyn Shader, use_layer_matrix: bool) -> FilterResult {
        let desired = ctx.desired_output().into_inner();
        if desired.is_empty() {
            return FilterResult::empty();
        }

        let size = ISize::new(desired.width(), desired.height());
        let Some(mut surface) = AutoSurface::new(ctx.backend(), size, ctx.color_space()) else {
            return FilterResult::empty();
        };
        ctx.record_offscreen_surface();

        let local_matrix = use_layer_matrix.then(|| ctx.mapping().param_to_layer().matrix);
        let device_bounds = IRect::from_size(size.w, size.h);
        surface.device_mut().draw_paint(Some(shader), None, local_matrix);

        match surface.snap(device_bounds) {
            Some(image) => FilterResult::from_image(
                image,
                Matrix::new_translate(desired.x0 as f64, desired.y0 as f64),
                TileMode::Decal,
            ),
            None => FilterResult::empty(),
        }
    }

    /// spec.md §4.10 "blur": looks up a blur algorithm from the backend,
    /// resolves `input` with its sample bounds outset by `ceil(3*sigma)`,
    /// and wraps the blurred image back into a `FilterResult` at its
    /// original origin.
    pub fn blur(&self, ctx: &Context, input: &FilterResult, sigma: (f64, f64)) -> FilterResult {
        if input.is_empty() || sigma.0 < 0.0 || sigma.1 < 0.0 {
            return FilterResult::empty();
        }
        let Some(engine) = ctx.backend().get_blur_engine() else {
            return FilterResult::empty();
        };

        let outset_x = (3.0 * sigma.0).ceil() as i32;
        let outset_y = (3.0 * sigma.1).ceil() as i32;
        let desired = ctx.desired_output().into_inner();
        let sample_bounds = desired.outset(outset_x.max(outset_y));

        let resolved = input.resolve(ctx, Space::reinterpret(sample_bounds), true);
        let Some(image) = resolved.image() else {
            return FilterResult::empty();
        };

        let dst_bounds = resolved.layer_bounds().into_inner();
        let Some(blurred) = engine.blur(image.as_ref(), sigma.0, sigma.1, dst_bounds, TileMode::Decal) else {
            return FilterResult::empty();
        };

        FilterResult::from_image(
            blurred,
            Matrix::new_translate(dst_bounds.x0 as f64, dst_bounds.y0 as f64),
            TileMode::Decal,
        )
    }
}
