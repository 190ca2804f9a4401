//! Bake loop benchmarks
//!
//! Measures a full re-bake (sampling, frames, bounds, texel writes) for each
//! source kind, and the cost of a clean tick that bakes nothing.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec3;
use std::hint::black_box;
use vfx_path::curve::{PathCreator, Spline, SplineContainer, VertexPath};
use vfx_path::{
    BinderSettings, Hierarchy, PathSource, SplineChainPathBinder, SplineChainSource,
    SplinePathBinder, SplineSource, VertexPathBinder,
};

fn helix(points: usize, turns: f32) -> Vec<Vec3> {
    (0..points)
        .map(|i| {
            let a = i as f32 / (points - 1) as f32 * turns * std::f32::consts::TAU;
            Vec3::new(a.cos(), i as f32 * 0.1, a.sin())
        })
        .collect()
}

fn bench_spline(c: &mut Criterion) {
    let mut group = c.benchmark_group("bake_spline");
    let mut hierarchy = Hierarchy::new();
    let effect = hierarchy.create_node("effect");
    hierarchy.update_world_matrices();

    for point_count in [64usize, 256, 4096] {
        let container =
            SplineContainer::with_splines(effect, vec![Spline::linear(&helix(32, 4.0), false)]);
        let mut binder = SplinePathBinder::new(
            effect,
            SplineSource::new(Some(container)),
            BinderSettings::with_point_count(point_count),
        );
        binder.bake(&hierarchy);

        group.bench_with_input(
            BenchmarkId::from_parameter(point_count),
            &point_count,
            |b, _| {
                b.iter(|| {
                    binder.invalidate();
                    black_box(binder.bake(&hierarchy))
                });
            },
        );
    }
    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut hierarchy = Hierarchy::new();
    let effect = hierarchy.create_node("effect");
    let splines = (0..8)
        .map(|i| {
            let offset = Vec3::new(0.0, i as f32, 0.0);
            let points: Vec<Vec3> = helix(8, 1.0).into_iter().map(|p| p + offset).collect();
            Spline::linear(&points, false)
        })
        .collect();
    let container = SplineContainer::with_splines(effect, splines);
    let mut binder = SplineChainPathBinder::new(
        effect,
        SplineChainSource::new(Some(container)),
        BinderSettings::default(),
    );
    binder.bake(&hierarchy);

    c.bench_function("bake_chain_256", |b| {
        b.iter(|| {
            binder.invalidate();
            black_box(binder.bake(&hierarchy))
        });
    });
}

fn bench_vertex_path(c: &mut Criterion) {
    let mut hierarchy = Hierarchy::new();
    let effect = hierarchy.create_node("effect");
    let creator = PathCreator::with_path(effect, VertexPath::from_points(&helix(512, 8.0), false));
    let mut binder =
        VertexPathBinder::new(effect, PathSource::new(Some(creator)), BinderSettings::default());
    binder.bake(&hierarchy);

    c.bench_function("bake_vertex_path_256", |b| {
        b.iter(|| {
            binder.invalidate();
            black_box(binder.bake(&hierarchy))
        });
    });
}

fn bench_clean_tick(c: &mut Criterion) {
    let mut hierarchy = Hierarchy::new();
    let effect = hierarchy.create_node("effect");
    let container =
        SplineContainer::with_splines(effect, vec![Spline::linear(&helix(32, 4.0), false)]);
    let mut binder = SplinePathBinder::new(
        effect,
        SplineSource::new(Some(container)),
        BinderSettings::default(),
    );
    binder.bake(&hierarchy);

    c.bench_function("clean_tick", |b| {
        b.iter(|| black_box(binder.bake(&hierarchy)));
    });
}

criterion_group!(
    benches,
    bench_spline,
    bench_chain,
    bench_vertex_path,
    bench_clean_tick
);
criterion_main!(benches);
