//! Criterion benchmarks for dtwpar-dtw: pairwise distance, traced alignment, and batch matrices.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use dtwpar_dtw::{BatchDtw, Dtw, Euclidean, MultivariateMode, Series, SeriesCollection};

fn make_sine_series(n: usize, dims: usize, offset: f64) -> Series {
    let data: Vec<f64> = (0..n * dims)
        .map(|i| ((i / dims) as f64 * 0.1 + (i % dims) as f64).sin() + offset)
        .collect();
    Series::from_flat(data, dims).unwrap()
}

fn make_noisy_collection(count: usize, len: usize, dims: usize) -> SeriesCollection {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let series = (0..count)
        .map(|_| {
            let data = (0..len * dims).map(|_| rng.gen_range(-1.0..1.0)).collect();
            Series::from_flat(data, dims).unwrap()
        })
        .collect();
    SeriesCollection::new(series).unwrap()
}

fn bench_dtw_distance(c: &mut Criterion) {
    let lengths = [64usize, 256, 1024];
    let modes = [
        (MultivariateMode::Dependent, "dependent"),
        (MultivariateMode::Independent, "independent"),
    ];

    let mut group = c.benchmark_group("dtw_distance");

    for &len in &lengths {
        for &(mode, label) in &modes {
            let id = BenchmarkId::new(format!("len{len}_d3"), label);
            let a = make_sine_series(len, 3, 0.0);
            let b = make_sine_series(len, 3, 1.0);
            let dtw = Dtw::new(Euclidean).with_mode(mode);

            group.bench_with_input(id, &(a, b, dtw), |bencher, (a, b, dtw)| {
                bencher.iter(|| dtw.distance(a.as_view(), b.as_view()));
            });
        }
    }

    group.finish();
}

fn bench_dtw_align(c: &mut Criterion) {
    let a = make_sine_series(256, 1, 0.0);
    let b = make_sine_series(200, 1, 0.5);
    let dtw = Dtw::new(Euclidean);

    c.bench_function("dtw_align_256x200", |bencher| {
        bencher.iter(|| dtw.align(a.as_view(), b.as_view()));
    });
}

fn bench_batch(c: &mut Criterion) {
    let collection = make_noisy_collection(40, 128, 2);
    let mut group = c.benchmark_group("batch_40x128_d2");

    for workers in [1usize, 4] {
        let batch = BatchDtw::new(Dtw::new(Euclidean), workers).unwrap();
        group.bench_function(BenchmarkId::from_parameter(workers), |bencher| {
            bencher.iter(|| batch.run(&collection, None).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dtw_distance, bench_dtw_align, bench_batch);
criterion_main!(benches);
