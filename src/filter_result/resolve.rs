//! `FilterResult::resolve` (spec.md §4.6): materializes pending state into a
//! fresh pixel image.

use crate::context::Context;
use crate::error::{CoreError, IntSize};
use crate::geometry::{IRect, ISize, Matrix};
use crate::sampling::TileMode;
use crate::space::{LayerIRect, Space};

use super::FilterResult;

impl FilterResult {
    /// Materializes `self` into a new image covering `dst_bounds` (layer
    /// space). If `preserve_transparency` is false, `dst_bounds` is first
    /// narrowed to `self.layer_bounds()` since nothing outside it would be
    /// visible anyway.
    pub fn resolve(&self, ctx: &Context, dst_bounds: LayerIRect, preserve_transparency: bool) -> FilterResult {
        if self.is_empty() {
            return FilterResult::empty();
        }

        let mut dst_bounds = dst_bounds.into_inner();
        if !preserve_transparency {
            match dst_bounds.intersection(&self.layer_bounds().into_inner()) {
                Some(r) => dst_bounds = r,
                None => return FilterResult::empty(),
            }
        }
        if dst_bounds.is_empty() {
            return FilterResult::empty();
        }

        if !preserve_transparency
            && self.color_filter().is_none()
            && self.tile_mode() == TileMode::Decal
        {
            if let Some((tx, ty)) = self.transform().is_near_integer_translation() {
                if let Some(image) = self.image() {
                    let image_space = dst_bounds.translate(-tx, -ty);
                    if image_space == image_space.intersection(&image.subset()).unwrap_or(IRect::empty())
                    {
                        let sub_image = image.make_subset(image_space);
                        return FilterResult::from_image(
                            sub_image,
                            Matrix::new_translate(tx as f64, ty as f64),
                            TileMode::Decal,
                        );
                    }
                }
            }
        }

        let size = ISize::new(dst_bounds.width(), dst_bounds.height());
        let Some(mut device) = ctx.backend().make_device(size, ctx.color_space()) else {
            log::debug!(
                "FilterResult::resolve: {}",
                CoreError::SurfaceAllocationFailed(IntSize { width: size.w, height: size.h })
            );
            return FilterResult::empty();
        };
        ctx.record_offscreen_surface();

        let layer_to_device = Matrix::new_translate(-dst_bounds.x0 as f64, -dst_bounds.y0 as f64);
        let device_bounds = IRect::from_size(size.w, size.h);
        self.draw(ctx, device.as_mut(), layer_to_device, device_bounds, None, false);

        match device.snap_special(device_bounds) {
            Some(image) => FilterResult::from_image(
                image,
                Matrix::new_translate(dst_bounds.x0 as f64, dst_bounds.y0 as f64),
                TileMode::Decal,
            ),
            None => FilterResult::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::mapping::Mapping;
    use crate::testutil::TestBackend;
    use std::rc::Rc;

    fn ctx_with_desired(r: IRect) -> Context {
        let mapping = Mapping::new(Matrix::identity());
        Context::new(mapping, Space::reinterpret(r), Rc::new(TestBackend::new()))
    }

    fn image_10x10() -> FilterResult {
        let backend = TestBackend::new();
        let image = backend.make_image(IRect::new(0, 0, 10, 10)).unwrap();
        FilterResult::from_image(image, Matrix::identity(), TileMode::Decal)
    }

    #[test]
    fn resolve_of_empty_is_empty() {
        let ctx = ctx_with_desired(IRect::new(0, 0, 10, 10));
        let result = FilterResult::empty().resolve(&ctx, Space::reinterpret(IRect::new(0, 0, 10, 10)), true);
        assert!(result.is_empty());
    }

    #[test]
    fn fast_path_avoids_offscreen_surface_for_full_integer_translation_subset() {
        let fr = image_10x10();
        let ctx = ctx_with_desired(IRect::new(0, 0, 10, 10));
        let before = ctx.stats().offscreen_surfaces_created;
        let result = fr.resolve(&ctx, Space::reinterpret(IRect::new(2, 2, 8, 8)), false);
        assert!(!result.is_empty());
        assert_eq!(ctx.stats().offscreen_surfaces_created, before);
    }

    #[test]
    fn preserve_transparency_allocates_a_surface_when_padding_is_needed() {
        let fr = image_10x10();
        let ctx = ctx_with_desired(IRect::new(-5, -5, 15, 15));
        let before = ctx.stats().offscreen_surfaces_created;
        let result = fr.resolve(&ctx, Space::reinterpret(IRect::new(-5, -5, 15, 15)), true);
        assert!(!result.is_empty());
        assert_eq!(ctx.stats().offscreen_surfaces_created, before + 1);
    }
}
