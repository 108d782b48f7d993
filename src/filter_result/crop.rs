//! `FilterResult::apply_crop` (spec.md §4.3): restricts a result to a
//! layer-space rectangle and re-tiles it, folding the operation into the
//! pending state wherever the algebra allows instead of materializing pixels.

use crate::context::Context;
use crate::error::CoreError;
use crate::geometry::{IRect, Matrix};
use crate::sampling::TileMode;
use crate::space::{LayerIRect, Space};

use super::FilterResult;

/// spec.md §9's open question: under `Clamp`, when `a` and `b` are disjoint,
/// the "closest" rectangle of `a`'s shape touching `b` is the relevant
/// subset (clamping repeats the nearest edge/corner pixel indefinitely, so
/// everything past the touching point reads the same color). Resolved here
/// as the minimal axis-aligned translation of `a` that touches `b`.
fn relevant_subset(a: IRect, b: IRect, tile_mode: TileMode) -> IRect {
    if a.is_empty() || b.is_empty() {
        return IRect::empty();
    }
    if let Some(hit) = a.intersection(&b) {
        return hit;
    }
    match tile_mode {
        TileMode::Decal => IRect::empty(),
        TileMode::Repeat | TileMode::Mirror => a,
        TileMode::Clamp => {
            let dx = if a.x1 <= b.x0 {
                b.x0 - a.x1
            } else if a.x0 >= b.x1 {
                b.x1 - a.x0
            } else {
                0
            };
            let dy = if a.y1 <= b.y0 {
                b.y0 - a.y1
            } else if a.y0 >= b.y1 {
                b.y1 - a.y0
            } else {
                0
            };
            a.translate(dx, dy)
        }
    }
}

/// The portion of layer space where `self` (tiled with its current mode)
/// actually has content, as relevant to intersecting against `crop`: a decal
/// result has content nowhere beyond its layer bounds; clamp/repeat/mirror
/// extend indefinitely, so their content fills the whole of `crop`.
fn crop_content(fr: &FilterResult, crop: IRect) -> IRect {
    match fr.tile_mode() {
        TileMode::Decal => fr.layer_bounds().into_inner(),
        _ => crop,
    }
}

/// One period window, on one axis, that contains `[desired_lo, desired_hi)`
/// exactly: `Some(n)` iff the window starting at `crop_lo + n * period` fully
/// contains the desired range.
fn single_period_index(desired_lo: i32, desired_hi: i32, crop_lo: i32, period: i32) -> Option<i32> {
    if period <= 0 {
        return None;
    }
    let n = (desired_lo - crop_lo).div_euclid(period);
    let window_lo = crop_lo + n * period;
    if desired_lo >= window_lo && desired_hi <= window_lo + period {
        Some(n)
    } else {
        None
    }
}

/// Builds the affine map from "coordinate within the base period" to
/// "global layer coordinate in period `n`" for one axis, honoring mirror
/// reflection on odd periods.
fn axis_period_map(crop_lo: i32, period: i32, tile_mode: TileMode, n: i32) -> (f64, f64) {
    if tile_mode == TileMode::Mirror && n.rem_euclid(2) != 0 {
        (-1.0, (2 * crop_lo + (n + 1) * period) as f64)
    } else {
        (1.0, (n * period) as f64)
    }
}

/// Tries to express a single visible period of a repeat/mirror crop as a
/// plain transform applied to the existing image, avoiding a resolve.
fn periodic_axis_transform(
    crop: IRect,
    desired: IRect,
    tile_mode: TileMode,
) -> Option<Matrix> {
    if !tile_mode.is_periodic() {
        return None;
    }
    let nx = single_period_index(desired.x0, desired.x1, crop.x0, crop.width())?;
    let ny = single_period_index(desired.y0, desired.y1, crop.y0, crop.height())?;
    let (sx, tx) = axis_period_map(crop.x0, crop.width(), tile_mode, nx);
    let (sy, ty) = axis_period_map(crop.y0, crop.height(), tile_mode, ny);
    Some(Matrix::new_scale_translate(sx, sy, tx, ty))
}

impl FilterResult {
    /// spec.md §4.3: crop to `crop` (layer space), then tile with
    /// `new_tile_mode`, bounded by `ctx`'s desired output.
    pub fn apply_crop(&self, ctx: &Context, crop: LayerIRect, new_tile_mode: TileMode) -> FilterResult {
        let crop = crop.into_inner();
        let desired = ctx.desired_output().into_inner();

        // 1. crop empty or desired-output empty.
        if crop.is_empty() {
            log::debug!("FilterResult::apply_crop: {}", CoreError::EmptyRegion("crop"));
            return FilterResult::empty();
        }
        if desired.is_empty() {
            log::debug!("FilterResult::apply_crop: {}", CoreError::EmptyRegion("desired"));
            return FilterResult::empty();
        }
        // 2. crop disjoint from layerBounds: only a dead end under Decal,
        // where nothing past layerBounds has content. Clamp/Repeat/Mirror
        // still have content there (the nearest edge/period), so they fall
        // through to the relevantSubset/fittedCrop logic below.
        if new_tile_mode == TileMode::Decal
            && crop.intersection(&self.layer_bounds().into_inner()).is_none()
        {
            return FilterResult::empty();
        }
        // 3. fittedCrop.
        let fitted_crop = relevant_subset(crop, desired, new_tile_mode);
        // 4. cropContent disjoint from fittedCrop: decal content never
        // extends past self's own footprint, so the check is real. Under
        // clamp/repeat/mirror the retiling extends self indefinitely, so
        // there is content everywhere in fittedCrop unless self has no
        // image to extend in the first place.
        if new_tile_mode == TileMode::Decal {
            if crop_content(self, crop).intersection(&fitted_crop).is_none() {
                return FilterResult::empty();
            }
        } else if self.is_empty() {
            return FilterResult::empty();
        }

        // 5. periodic axis transform: re-express the single visible tile.
        if new_tile_mode.is_periodic() && fitted_crop.contains_rect(&desired) {
            match periodic_axis_transform(crop, desired, new_tile_mode) {
                Some(m) => return self.apply_transform(ctx, m, crate::sampling::DEFAULT_SAMPLING),
                None => log::trace!("FilterResult::apply_crop: {}", CoreError::LossyPeriodicTransform),
            }
        }

        // 6. normalize.
        let (mut fitted_crop, mut new_tile_mode) = (fitted_crop, new_tile_mode);
        let mut outset_belt = false;
        if new_tile_mode == TileMode::Decal {
            fitted_crop = crop_content(self, crop);
        } else if fitted_crop.contains_rect(&desired) {
            new_tile_mode = TileMode::Decal;
            fitted_crop = desired;
        } else if self.tile_mode() == TileMode::Decal && new_tile_mode == TileMode::Clamp {
            outset_belt = true;
        }
        let content_for_fast_path = if outset_belt {
            crop_content(self, crop).outset(1)
        } else {
            fitted_crop
        };

        // 7. analytic fast path.
        if let Some((tx, ty)) = self.transform().is_near_integer_translation() {
            let double_clamp = self.tile_mode() == TileMode::Clamp && new_tile_mode == TileMode::Clamp;
            let analysis = self.analyze_bounds(Matrix::identity(), fitted_crop);
            if double_clamp || !analysis.flags.has_layer_filling_effect {
                if let Some(image) = self.image() {
                    let image_space_crop = content_for_fast_path.translate(-tx, -ty);
                    if let Some(sub) = image_space_crop.intersection(&image.subset()) {
                        let sub_image = image.make_subset(sub);
                        let mut result = FilterResult::from_image(sub_image, Matrix::new_translate(tx as f64, ty as f64), new_tile_mode);
                        result.color_filter = self.color_filter().cloned();
                        result.sampling = self.sampling();
                        result.layer_bounds = Space::reinterpret(fitted_crop);
                        return result;
                    }
                }
            }
        }

        // 8. decal just narrows layer bounds.
        if new_tile_mode == TileMode::Decal {
            let mut result = self.clone();
            result.layer_bounds = Space::reinterpret(fitted_crop);
            return result;
        }

        // 9. materialize.
        let resolved = self.resolve(ctx, Space::reinterpret(fitted_crop), true);
        let mut result = resolved;
        result.tile_mode = new_tile_mode;
        result.layer_bounds = Space::reinterpret(fitted_crop);
        result
    }
}
