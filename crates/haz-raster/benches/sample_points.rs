use criterion::{black_box, criterion_group, criterion_main, Criterion};
use haz_raster::{AsciiGrid, GridHeader};

fn bench_sample(c: &mut Criterion) {
    let (ncols, nrows) = (400, 300);
    let header = GridHeader {
        ncols,
        nrows,
        xllcorner: 140.0,
        yllcorner: -40.0,
        cellsize: 0.01,
        nodata_value: Some(-9999.0),
    };
    let cells = (0..ncols * nrows).map(|i| (i % 97) as f64).collect();
    let grid = AsciiGrid::new(header, cells).expect("grid");
    let lon: Vec<f64> = (0..10_000).map(|i| 140.0 + (i % 400) as f64 * 0.01 + 0.005).collect();
    let lat: Vec<f64> = (0..10_000).map(|i| -40.0 + (i % 300) as f64 * 0.01 + 0.005).collect();

    let mut group = c.benchmark_group("raster_sample");
    group.bench_function("10k_points", |b| {
        b.iter(|| {
            let _ = grid.sample_points(black_box(&lon), black_box(&lat)).unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, bench_sample);
criterion_main!(benches);
