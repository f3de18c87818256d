//! Criterion benchmarks for full community steps.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use sylva_bench::{reference_profile, seeded_simulation, stress_profile};
use sylva_engine::{allocate_seeds, SimRng};

fn bench_step_50_patches(c: &mut Criterion) {
    let mut sim = seeded_simulation(reference_profile(), 4, 42);
    // Warm up: the first step sizes the solver buffers.
    sim.step().unwrap();

    c.bench_function("step_50_patches", |b| {
        b.iter(|| {
            let metrics = sim.step().unwrap();
            black_box(metrics);
        });
    });
}

fn bench_step_500_patches(c: &mut Criterion) {
    let mut sim = seeded_simulation(stress_profile(), 2, 42);
    sim.step().unwrap();

    c.bench_function("step_500_patches", |b| {
        b.iter(|| {
            let metrics = sim.step().unwrap();
            black_box(metrics);
        });
    });
}

fn bench_run_to_20(c: &mut Criterion) {
    c.bench_function("run_to_20_50_patches", |b| {
        b.iter(|| {
            let mut sim = seeded_simulation(reference_profile(), 4, 42);
            black_box(sim.run_until(20.0).unwrap());
        });
    });
}

fn bench_seed_rain(c: &mut Criterion) {
    let mut rng = SimRng::seed_from_u64(7);
    let seeds = [5_000u64, 1_200, 300, 40];
    c.bench_function("allocate_seeds_500_patches", |b| {
        b.iter(|| {
            let split = allocate_seeds(black_box(&seeds), 500, &mut rng);
            black_box(split);
        });
    });
}

criterion_group!(
    benches,
    bench_step_50_patches,
    bench_step_500_patches,
    bench_run_to_20,
    bench_seed_rain
);
criterion_main!(benches);
