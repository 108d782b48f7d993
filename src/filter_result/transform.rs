//! `FilterResult::apply_transform` (spec.md §4.5): folds an extra transform
//! into the pending state when sampling stays compatible, otherwise resolves
//! first so the new transform starts from a fresh, tightly-bound image.

use crate::context::Context;
use crate::error::CoreError;
use crate::geometry::Matrix;
use crate::sampling::{compatible_sampling, SamplingOptions, DEFAULT_SAMPLING};
use crate::space::Space;

use super::FilterResult;

impl FilterResult {
    /// spec.md §4.5. `sampling` is the sampling the *new* transform should be
    /// drawn with; if the fold goes through, it merges with the existing
    /// pending sampling via [`compatible_sampling`].
    pub fn apply_transform(&self, ctx: &Context, t: Matrix, sampling: SamplingOptions) -> FilterResult {
        if self.is_empty() || ctx.desired_output().into_inner().is_empty() {
            return FilterResult::empty();
        }

        let next_near = t.is_near_integer_translation().is_some();
        let effective_sampling = if next_near { DEFAULT_SAMPLING } else { sampling };

        let analysis = self.analyze_bounds(t, ctx.desired_output().into_inner());
        let is_cropped = !next_near && analysis.flags.requires_layer_crop;

        let current_near = self.transform().is_near_integer_translation().is_some();
        let merged = if is_cropped {
            None
        } else {
            compatible_sampling(self.sampling(), effective_sampling, current_near, next_near)
        };

        if let Some(merged_sampling) = merged {
            let new_transform = Matrix::multiply(&t, &self.transform());
            let new_layer_bounds = t.map_irect(self.layer_bounds().into_inner());
            let Some(bounded) = new_layer_bounds.intersection(&ctx.desired_output().into_inner()) else {
                return FilterResult::empty();
            };
            let mut result = self.clone();
            result.transform = new_transform;
            result.sampling = merged_sampling;
            result.layer_bounds = Space::reinterpret(bounded);
            return result;
        }

        // Resolve first: the area of `self` that maps into the desired
        // output under `t`, then apply `t` fresh to that tightly-bound image.
        let Some(inv) = t.invert() else {
            log::debug!("FilterResult::apply_transform: {}", CoreError::NonInvertibleMatrix);
            return FilterResult::empty();
        };
        let src_bounds = inv.map_irect(ctx.desired_output().into_inner());
        let resolved = self.resolve(ctx, Space::reinterpret(src_bounds), false);
        if resolved.is_empty() {
            return FilterResult::empty();
        }

        let new_transform = Matrix::multiply(&t, &resolved.transform());
        let new_layer_bounds = t.map_irect(resolved.layer_bounds().into_inner());
        let Some(bounded) = new_layer_bounds.intersection(&ctx.desired_output().into_inner()) else {
            return FilterResult::empty();
        };
        let mut result = resolved;
        result.transform = new_transform;
        result.sampling = effective_sampling;
        result.layer_bounds = Space::reinterpret(bounded);
        result
    }
}
