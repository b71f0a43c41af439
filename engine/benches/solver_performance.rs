//! Criterion benchmarks for solver, propagator and simulator throughput

use arbor_engine::test_tree::{build_layered_tree, build_test_tree};
use arbor_engine::{evaluate, sim_decisions, sim_decisions_parallel, solve, SimConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn benchmark_solve_small(c: &mut Criterion) {
    let tree = build_test_tree();
    c.bench_function("solve_11_nodes", |b| {
        b.iter(|| solve(black_box(&tree)).unwrap())
    });
}

fn benchmark_solve_layered(c: &mut Criterion) {
    // 1 + 4 + 16 + ... + 4^7 nodes
    let tree = build_layered_tree(7, 4);
    c.bench_function("solve_layered_7x4", |b| {
        b.iter(|| solve(black_box(&tree)).unwrap())
    });
}

fn benchmark_evaluate_layered(c: &mut Criterion) {
    let tree = build_layered_tree(7, 4);
    let strategy = solve(&tree).unwrap().strategy;
    c.bench_function("evaluate_layered_7x4", |b| {
        b.iter(|| evaluate(black_box(&strategy), black_box(&tree)).unwrap())
    });
}

fn benchmark_sim_sequential(c: &mut Criterion) {
    let tree = build_test_tree();
    let strategy = solve(&tree).unwrap().strategy;
    c.bench_function("sim_decisions_100k", |b| {
        b.iter_batched(
            || SmallRng::seed_from_u64(7),
            |mut rng| sim_decisions(100_000, black_box(&tree), &strategy, &mut rng).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn benchmark_sim_parallel(c: &mut Criterion) {
    let tree = build_test_tree();
    let strategy = solve(&tree).unwrap().strategy;
    let config = SimConfig {
        trials: 100_000,
        batch: 10_000,
        ..SimConfig::default()
    };
    c.bench_function("sim_decisions_parallel_100k", |b| {
        b.iter(|| sim_decisions_parallel(&config, black_box(&tree), &strategy).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_solve_small,
    benchmark_solve_layered,
    benchmark_evaluate_layered,
    benchmark_sim_sequential,
    benchmark_sim_parallel,
);
criterion_main!(benches);
