//! `FilterResult::apply_color_filter` (spec.md §4.4).

use std::sync::Arc;

use crate::backend::ColorFilter;
use crate::context::Context;
use crate::geometry::Matrix;
use crate::sampling::TileMode;
use crate::space::Space;

use super::FilterResult;

/// Composes `outer` to run after `inner`: `composed(x) = outer(inner(x))`.
fn compose(outer: Arc<dyn ColorFilter>, inner: Option<Arc<dyn ColorFilter>>) -> Arc<dyn ColorFilter> {
    match inner {
        Some(inner) => outer.compose(inner),
        None => outer,
    }
}

impl FilterResult {
    /// spec.md §4.4. The new filter runs after any existing one:
    /// `composed(x) = cf(existing(x))`.
    pub fn apply_color_filter(&self, ctx: &Context, cf: Arc<dyn ColorFilter>) -> FilterResult {
        let desired = ctx.desired_output();

        if cf.affects_transparent_black() {
            let disjoint = self.is_empty()
                || self
                    .layer_bounds()
                    .into_inner()
                    .intersection(&desired.into_inner())
                    .is_none();
            if disjoint {
                // The whole result is a constant color: render transparent
                // black through `cf` once and let a 1x1 clamp-tiled image
                // stand in for "this color everywhere".
                let clamp_source = FilterResult::empty();
                let resolved = clamp_source.resolve(ctx, Space::reinterpret(crate::geometry::IRect::from_size(1, 1)), true);
                let mut result = resolved;
                result.color_filter = Some(cf);
                result.tile_mode = TileMode::Clamp;
                result.layer_bounds = desired;
                return result;
            }

            let analysis = self.analyze_bounds(Matrix::identity(), desired.into_inner());
            if analysis.flags.requires_layer_crop {
                let resolved = self.resolve(ctx, desired, false);
                let mut result = resolved;
                result.color_filter = Some(compose(cf, result.color_filter.clone()));
                result.tile_mode = TileMode::Clamp;
                result.layer_bounds = Space::reinterpret(
                    desired
                        .into_inner()
                        .intersection(&result.layer_bounds().into_inner().outset(1))
                        .unwrap_or(crate::geometry::IRect::empty()),
                );
                return result;
            }

            let mut result = self.clone();
            result.color_filter = Some(compose(cf, result.color_filter.clone()));
            result.layer_bounds = desired;
            return result;
        }

        // Doesn't affect transparent black: a plain intersection + compose.
        let new_bounds = self
            .layer_bounds()
            .into_inner()
            .intersection(&desired.into_inner());
        let Some(new_bounds) = new_bounds else {
            return FilterResult::empty();
        };
        let mut result = self.clone();
        result.color_filter = Some(compose(cf, result.color_filter.clone()));
        result.layer_bounds = Space::reinterpret(new_bounds);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::context::Context;
    use crate::geometry::IRect;
    use crate::mapping::Mapping;
    use crate::sampling::TileMode;
    use crate::space::Space;
    use crate::testutil::TestBackend;
    use std::fmt;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Invert;
    impl ColorFilter for Invert {
        fn affects_transparent_black(&self) -> bool {
            true
        }
        fn compose(self: Arc<Self>, inner: Arc<dyn ColorFilter>) -> Arc<dyn ColorFilter> {
            Arc::new(Composed { outer: self, inner })
        }
    }

    #[derive(Debug)]
    struct Saturate;
    impl ColorFilter for Saturate {
        fn affects_transparent_black(&self) -> bool {
            false
        }
        fn compose(self: Arc<Self>, inner: Arc<dyn ColorFilter>) -> Arc<dyn ColorFilter> {
            Arc::new(Composed { outer: self, inner })
        }
    }

    #[derive(Debug)]
    struct Composed {
        outer: Arc<dyn ColorFilter>,
        inner: Arc<dyn ColorFilter>,
    }
    impl ColorFilter for Composed {
        fn affects_transparent_black(&self) -> bool {
            self.outer.affects_transparent_black() || self.inner.affects_transparent_black()
        }
        fn compose(self: Arc<Self>, inner: Arc<dyn ColorFilter>) -> Arc<dyn ColorFilter> {
            Arc::new(Composed { outer: self, inner })
        }
    }

    impl fmt::Display for Composed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "composed")
        }
    }

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
    fn non_affecting_filter_keeps_bounds_when_contained() {
        let fr = image_10x10();
        let ctx = ctx_with_desired(IRect::new(0, 0, 10, 10));
        let result = fr.apply_color_filter(&ctx, Arc::new(Saturate));
        assert_eq!(result.layer_bounds().into_inner(), IRect::new(0, 0, 10, 10));
        assert!(result.color_filter().is_some());
    }

    #[test]
    fn affecting_filter_fills_desired_output() {
        let fr = image_10x10();
        let ctx = ctx_with_desired(IRect::new(0, 0, 20, 20));
        let result = fr.apply_color_filter(&ctx, Arc::new(Invert));
        assert_eq!(result.tile_mode(), TileMode::Clamp);
    }

    #[test]
    fn disjoint_non_affecting_filter_is_empty() {
        let fr = image_10x10();
        let ctx = ctx_with_desired(IRect::new(100, 100, 110, 110));
        let result = fr.apply_color_filter(&ctx, Arc::new(Saturate));
        assert!(result.is_empty());
    }

    proptest::proptest! {
        /// spec.md §8 "Color filter associativity": applying `f` then `g`,
        /// neither of which affects transparent black, lands on the same
        /// bounds/tile-mode/transform as applying their composition once
        /// (both reduce to the same intersect-and-compose path).
        #[test]
        fn sequential_non_affecting_filters_match_composed_bounds(
            dx0 in -5i32..5, dy0 in -5i32..5, dw in 5i32..30, dh in 5i32..30,
        ) {
            let fr = image_10x10();
            let ctx = ctx_with_desired(IRect::new(dx0, dy0, dx0 + dw, dy0 + dh));

            let sequential = fr
                .apply_color_filter(&ctx, Arc::new(Saturate))
                .apply_color_filter(&ctx, Arc::new(Saturate));

            let composed: Arc<dyn ColorFilter> = Arc::new(Saturate).compose(Arc::new(Saturate));
            let direct = fr.apply_color_filter(&ctx, composed);

            proptest::prop_assert_eq!(sequential.is_empty(), direct.is_empty());
            if !sequential.is_empty() {
                proptest::prop_assert_eq!(
                    sequential.layer_bounds().into_inner(),
                    direct.layer_bounds().into_inner()
                );
                proptest::prop_assert_eq!(sequential.tile_mode(), direct.tile_mode());
            }
        }
    }
}
