//! Tower AOI benchmarks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rgb_aoi::{AoiBounds, AoiHandle, AoiIndex, TowerAoi};

fn populated(count: u64) -> TowerAoi {
    let mut aoi = TowerAoi::new(AoiBounds::new(-1000.0, 1000.0, -1000.0, 1000.0), 100.0);
    for i in 0..count {
        let x = ((i * 37) % 2000) as f32 - 1000.0;
        let y = ((i * 91) % 2000) as f32 - 1000.0;
        aoi.enter(AoiHandle(i), x, y);
    }
    aoi
}

fn enter_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("enter");

    for count in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("scattered", count), &count, |b, &count| {
            b.iter(|| black_box(populated(count)));
        });
    }

    group.finish();
}

fn moved_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("moved");

    for count in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("step", count), &count, |b, &count| {
            let mut aoi = populated(count);
            let mut step = 0.0_f32;
            b.iter(|| {
                step = if step > 0.0 { -5.0 } else { 5.0 };
                for i in 0..count {
                    let x = ((i * 37) % 2000) as f32 - 1000.0 + step;
                    let y = ((i * 91) % 2000) as f32 - 1000.0;
                    black_box(aoi.moved(AoiHandle(i), x, y));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, enter_benchmarks, moved_benchmarks);
criterion_main!(benches);
