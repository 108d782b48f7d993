//! `FilterResult::draw` (spec.md §4.7): the terminal operation that actually
//! puts pixels on a device.

use crate::backend::{Blender, ClipOp, Device, DrawConstraint};
use crate::context::Context;
use crate::geometry::{IRect, Matrix};
use crate::sampling::{TileMode, NEAREST_SAMPLING};
use crate::space::Space;

use super::shader::ShaderFlags;
use super::FilterResult;

impl FilterResult {
    /// Draws `self` into `device`. `layer_to_device` and `dst_bounds` stand
    /// in for the device's own current-transform/clip state (spec.md §4.7
    /// reads these off the device directly; here they are threaded in
    /// explicitly, which keeps every `FilterResult` operation free of hidden
    /// device-side mutable state).
    ///
    /// `preserve_device_state` controls whether a clip this call pushes is
    /// popped again before returning; callers about to discard `device`
    /// (e.g. [`super::resolve`]'s fresh surface) may pass `false`.
    pub fn draw(
        &self,
        ctx: &Context,
        device: &mut dyn Device,
        layer_to_device: Matrix,
        dst_bounds: IRect,
        blender: Option<&dyn Blender>,
        preserve_device_state: bool,
    ) {
        self.draw_with_shader_flags(
            ctx,
            device,
            layer_to_device,
            dst_bounds,
            blender,
            preserve_device_state,
            ShaderFlags::default(),
        )
    }

    /// As [`Self::draw`], but lets the caller override the flags passed to
    /// the shader-fill branch's `as_shader` call (used by `rescale`'s first
    /// downsample pass to mask `RequiresDecalInLayerSpace`).
    pub(super) fn draw_with_shader_flags(
        &self,
        ctx: &Context,
        device: &mut dyn Device,
        layer_to_device: Matrix,
        dst_bounds: IRect,
        blender: Option<&dyn Blender>,
        preserve_device_state: bool,
        shader_flags: ShaderFlags,
    ) {
        let blender_affects_transparent = blender.is_some_and(|b| b.affects_transparent_black());

        if self.is_empty() {
            if blender_affects_transparent {
                device.draw_paint(None, blender, None);
            }
            return;
        }

        let analysis = self.analyze_bounds(layer_to_device, dst_bounds);

        if analysis.flags.requires_layer_crop && blender_affects_transparent {
            // Bake the crop into a fresh image before blending, so the
            // blender only ever sees pixels that already respect it.
            let Some(inv) = layer_to_device.invert() else {
                return;
            };
            let layer_clip = inv.map_irect(dst_bounds);
            let resolved = self.resolve(ctx, Space::reinterpret(layer_clip), true);
            resolved.draw_with_shader_flags(
                ctx,
                device,
                layer_to_device,
                dst_bounds,
                blender,
                preserve_device_state,
                shader_flags,
            );
            return;
        }

        let mut pushed_clip = false;
        if analysis.flags.requires_layer_crop {
            if preserve_device_state {
                device.push_clip_stack();
                pushed_clip = true;
            }
            let device_layer_bounds = layer_to_device.map_irect(self.layer_bounds().into_inner());
            device.clip_rect(device_layer_bounds, ClipOp::Intersect, false);
        }

        let mut working = self.clone();
        let net_transform = Matrix::multiply(&layer_to_device, &working.transform());
        if working.sampling().is_default_linear() && net_transform.is_near_integer_translation().is_some() {
            working.sampling = NEAREST_SAMPLING;
        }

        if analysis.flags.has_layer_filling_effect
            || (blender_affects_transparent && analysis.flags.dst_bounds_not_covered)
        {
            let sample_bounds = working.layer_bounds();
            if let Some(shader) = working.as_shader_with_flags(ctx, None, shader_flags, sample_bounds) {
                device.draw_paint(Some(shader.as_ref()), blender, None);
            } else {
                device.draw_paint(None, blender, None);
            }
        } else if let Some(image) = working.image() {
            let constraint = if analysis.flags.requires_shader_tiling {
                ctx.record_shader_tiled_draw();
                DrawConstraint::Strict
            } else {
                if working.tile_mode() == TileMode::Decal {
                    ctx.record_shader_clamped_draw();
                }
                DrawConstraint::Fast
            };
            device.draw_special(
                image.as_ref(),
                net_transform,
                working.sampling(),
                working.color_filter().map(|cf| cf.as_ref()),
                blender,
                constraint,
            );
        }

        if pushed_clip {
            device.pop_clip_stack();
        }
    }
}
