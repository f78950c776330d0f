//! Scene builder throughput across sphere counts and placement densities.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spheretrace::accumulation::blend_weight;
use spheretrace::scene::{RadiusRange, Scene, SceneBuilder, SceneConfig};

fn build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_build");

    for count in [10u32, 100, 400, 1000] {
        let config = SceneConfig {
            seed: 1_223_832_719,
            radius_range: RadiusRange::new(1.0, 6.0),
            max_count: count,
            placement_radius: 200.0,
        };
        let Ok(builder) = SceneBuilder::new(config) else {
            continue;
        };
        let _ = group.bench_function(format!("{count}_spheres"), |b| {
            b.iter(|| black_box(builder.build()));
        });
    }
    group.finish();
}

fn crowded_benchmark(c: &mut Criterion) {
    let config = SceneConfig {
        seed: 42,
        radius_range: RadiusRange::new(3.0, 8.0),
        max_count: 1000,
        placement_radius: 30.0,
    };
    let _ = c.bench_function("crowded_1000_attempts", |b| {
        b.iter(|| black_box(Scene::generate(black_box(&config))));
    });
}

fn blend_weight_benchmark(c: &mut Criterion) {
    let _ = c.bench_function("blend_weight", |b| {
        b.iter(|| black_box(blend_weight(black_box(1023))));
    });
}

criterion_group!(benches, build_benchmark, crowded_benchmark, blend_weight_benchmark);
criterion_main!(benches);
