//! Benchmarks for mosaic assembly and hillshade

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_algorithms::mosaic::{assemble, MosaicLayout};
use tessera_algorithms::terrain::{hillshade, HillshadeParams};
use tessera_core::Raster;

fn create_dem(size: usize) -> Raster<f64> {
    Raster::from_fn(size, size, |row, col| {
        let base = (row + col) as f64;
        let variation = ((row * 7 + col * 13) % 100) as f64 / 10.0;
        base + variation
    })
}

fn bench_hillshade(c: &mut Criterion) {
    let mut group = c.benchmark_group("hillshade");

    for size in [256, 512, 1024, 2048].iter() {
        let dem = create_dem(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| hillshade(black_box(&dem), HillshadeParams::default()).unwrap())
        });
    }

    group.finish();
}

fn bench_mosaic(c: &mut Criterion) {
    let mut group = c.benchmark_group("mosaic");

    for grid in [2usize, 4, 8].iter() {
        let tiles: Vec<_> = (0..grid * grid).map(|_| create_dem(256)).collect();
        let layout = MosaicLayout::new(*grid, *grid);

        group.bench_with_input(BenchmarkId::from_parameter(grid), grid, |b, _| {
            b.iter(|| assemble(black_box(&tiles), layout).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hillshade, bench_mosaic);
criterion_main!(benches);
