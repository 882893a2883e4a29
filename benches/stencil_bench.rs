use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use halo_heat::algs::stencil::update_row;
use halo_heat::prelude::*;

fn bench_update_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_row");
    for &n in &[256usize, 1024, 2000] {
        let above = vec![1.0; n];
        let row = vec![2.0; n];
        let below = vec![3.0; n];
        let mut out = vec![0.0; n];
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| update_row(black_box(&above), &row, &below, &mut out, 0.1))
        });
    }
    group.finish();
}

// 2) whole runs, one per execution model
fn bench_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(10);
    let cfg = SimulationConfig::new(128, 50, 0.1);
    group.bench_function("serial", |b| b.iter(|| run_serial(black_box(&cfg)).unwrap()));
    #[cfg(feature = "rayon")]
    group.bench_function("shared", |b| b.iter(|| run_shared(black_box(&cfg)).unwrap()));
    for workers in [2usize, 4] {
        let cfg = cfg.clone().with_workers(workers);
        group.bench_with_input(BenchmarkId::new("threaded", workers), &cfg, |b, cfg| {
            b.iter(|| run_threaded(cfg).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_update_row, bench_runs);
criterion_main!(benches);
