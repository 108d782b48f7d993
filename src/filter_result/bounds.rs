//! Bounds analysis (spec.md §4.2): decides, for a pending draw of a
//! [`FilterResult`] through `xtra_transform` into `dst_bounds`, which of five
//! independent properties hold.
//!
//! Grounded in purpose on the teacher's `filters::bounds` module
//! (`src/filters/bounds.rs`), which likewise inspects a primitive's input
//! bounding boxes against the paint-order rectangle before deciding whether a
//! primitive can skip an intermediate surface; the five-flag shape itself has
//! no teacher analog and is built directly from this algorithm's description.

use crate::geometry::{IRect, Point, Rect, ROUND_EPSILON};

use super::FilterResult;

/// Bits independently justified by bounds analysis; see each accessor's doc
/// for the condition it records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundsAnalysis {
    /// The layer-bounds edge is visible and must be enforced with an actual
    /// clip (or resolve), not left implicit.
    pub requires_layer_crop: bool,
    /// The image's mapped pixel rectangle does not cover the working bounds;
    /// some destination pixels sample outside the image.
    pub dst_bounds_not_covered: bool,
    /// `dst_bounds_not_covered`, and the gap is visually significant because
    /// the result fills its layer bounds (a decal-free tile mode or a
    /// transparency-affecting color filter).
    pub has_layer_filling_effect: bool,
    /// Drawing directly with a backend tile mode would sample outside the
    /// image subset on an edge that is not a hardware edge; a real
    /// shader-level tile implementation is required instead.
    pub requires_shader_tiling: bool,
    /// `tileMode == Decal`, non-nearest sampling, and the net transform's
    /// scale is far enough from 1 that the decal wrapper must run in layer
    /// space rather than rely on the backend's own decal sampling.
    pub requires_decal_in_layer_space: bool,
}

/// Output of [`FilterResult::analyze_bounds`]: the flags, plus the working
/// pixel-center rectangle as restricted by any layer-bounds clip found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsAnalysisResult {
    pub flags: BoundsAnalysis,
    pub working_bounds: IRect,
}

fn scale_within_20_percent_of_one(s: f64) -> bool {
    (0.8..=1.2).contains(&s.abs())
}

impl FilterResult {
    /// spec.md §4.2. `xtra_transform` maps layer space to the target space
    /// `dst_bounds` is expressed in (often the identity, when the target
    /// space *is* layer space).
    pub fn analyze_bounds(&self, xtra_transform: crate::geometry::Matrix, dst_bounds: IRect) -> BoundsAnalysisResult {
        let mut flags = BoundsAnalysis::default();
        let mut working_bounds = dst_bounds;

        let fills_layer_bounds = self.tile_mode != crate::sampling::TileMode::Decal
            || self
                .color_filter
                .as_ref()
                .is_some_and(|cf| cf.affects_transparent_black());

        let mapped_layer_bounds = xtra_transform.map_irect(self.layer_bounds.into_inner());
        if !Rect::from(mapped_layer_bounds).contains_rect(&Rect::from(dst_bounds)) {
            let mapped_image_rect = self
                .image
                .as_ref()
                .map(|img| self.transform.map_irect(img.subset()));
            let layer_bounds_contains_image = mapped_image_rect
                .map(|r| Rect::from(self.layer_bounds.into_inner()).contains_rect(&Rect::from(r)))
                .unwrap_or(true);

            if fills_layer_bounds || !layer_bounds_contains_image {
                flags.requires_layer_crop = true;
                working_bounds = dst_bounds
                    .intersection(&mapped_layer_bounds)
                    .unwrap_or(IRect::empty());
            }
        }

        if let Some(image) = &self.image {
            let net_transform = crate::geometry::Matrix::multiply(&xtra_transform, &self.transform);
            let image_rect_target = net_transform.map_irect(image.subset());
            if !Rect::from(image_rect_target).contains_rect(&Rect::from(working_bounds)) {
                flags.dst_bounds_not_covered = true;
                if fills_layer_bounds {
                    flags.has_layer_filling_effect = true;
                }
            }

            flags.requires_shader_tiling =
                self.requires_shader_tiling_for(net_transform, working_bounds);

            if self.tile_mode == crate::sampling::TileMode::Decal && !self.sampling.is_nearest() {
                match net_transform.decompose_scale() {
                    Some((sx, sy)) => {
                        if !(scale_within_20_percent_of_one(sx) && scale_within_20_percent_of_one(sy))
                        {
                            flags.requires_decal_in_layer_space = true;
                        }
                    }
                    None => flags.requires_decal_in_layer_space = true,
                }
            }
        } else {
            // No image: nothing to sample, so nothing to cover or tile.
            flags.dst_bounds_not_covered = true;
            if fills_layer_bounds {
                flags.has_layer_filling_effect = true;
            }
        }

        BoundsAnalysisResult { flags, working_bounds }
    }

    fn requires_shader_tiling_for(
        &self,
        net_transform: crate::geometry::Matrix,
        working_bounds: IRect,
    ) -> bool {
        let Some(image) = &self.image else {
            return false;
        };
        let radius = if self.sampling.is_cubic() { 1.5 } else { 0.5 };
        let near_integer = net_transform.is_near_integer_translation().is_some();
        let extra = if self.sampling.is_default_linear() && !near_integer {
            ROUND_EPSILON
        } else {
            0.0
        };
        let subset = Rect::from(image.subset());
        let safe = subset.inset(radius + extra);
        if safe.is_empty() {
            return true;
        }

        let backing = image.backing_store_dimensions();
        let hw_left = image.subset().x0 == 0;
        let hw_right = image.subset().x1 == backing.w;
        let hw_top = image.subset().y0 == 0;
        let hw_bottom = image.subset().y1 == backing.h;

        let periodic = self.tile_mode.is_periodic();
        let safe_left = if periodic { hw_left && hw_right } else { hw_left };
        let safe_right = if periodic { hw_left && hw_right } else { hw_right };
        let safe_top = if periodic { hw_top && hw_bottom } else { hw_top };
        let safe_bottom = if periodic { hw_top && hw_bottom } else { hw_bottom };

        let Some(inv) = net_transform.invert() else {
            return true;
        };
        let centers = Rect::from(working_bounds).inset(0.5);
        let corners = [
            Point::new(centers.x0, centers.y0),
            Point::new(centers.x1, centers.y0),
            Point::new(centers.x1, centers.y1),
            Point::new(centers.x0, centers.y1),
        ];
        for c in corners {
            let p = inv.map_point(c);
            if p.x < safe.x0 && !safe_left {
                return true;
            }
            if p.x > safe.x1 && !safe_right {
                return true;
            }
            if p.y < safe.y0 && !safe_top {
                return true;
            }
            if p.y > safe.y1 && !safe_bottom {
                return true;
            }
        }
        false
    }
}
