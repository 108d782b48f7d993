//! Benchmarks `FilterResult::rescale`'s repeated-halving downscale path
//! (spec.md §4.9) against the scenarios `downscale_step_count` is derived
//! from, mirroring the teacher's `box_blur` benchmark shape (one group, one
//! `BenchmarkId` per input variant).

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use filtres_core::backend::Backend;
use filtres_core::geometry::{IRect, Matrix};
use filtres_core::sampling::TileMode;
use filtres_core::space::Space;
use filtres_core::{Context, FilterResult, Mapping};

mod support;
use support::BenchBackend;

const SURFACE_SIDE: i32 = 512;

fn ctx_with_desired(backend: Rc<dyn Backend>, r: IRect) -> Context {
    let mapping = Mapping::new(Matrix::identity());
    Context::new(mapping, Space::reinterpret(r), backend)
}

fn bench_rescale(c: &mut Criterion) {
    let _ = env_logger::try_init();
    let mut group = c.benchmark_group("rescale downscale_step_count scenarios");

    for scale in [0.1, 0.49, 0.81].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(scale), scale, |b, &scale| {
            let backend: Rc<dyn Backend> = Rc::new(BenchBackend::new());
            let image = backend
                .make_image(IRect::from_size(SURFACE_SIDE, SURFACE_SIDE))
                .unwrap();
            let source = FilterResult::from_image(image, Matrix::identity(), TileMode::Decal);
            let ctx = ctx_with_desired(Rc::clone(&backend), IRect::from_size(SURFACE_SIDE, SURFACE_SIDE));

            b.iter(|| source.rescale(&ctx, (scale, scale), true))
        });
    }
}

criterion_group!(benches, bench_rescale);
criterion_main!(benches);
