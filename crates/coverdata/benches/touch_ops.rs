//! Touch and Merge Benchmarks
//!
//! Benchmarks for the coverage hot path and snapshot merging.
//!
//! Run with: `cargo bench --bench touch_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probar_coverdata::{BranchId, ClassData, CoverageData, LineNumber};

fn populated_class(lines: u32) -> ClassData {
    let class = ClassData::new("com.acme.Bench");
    for n in 0..lines {
        class.add_line(LineNumber::new(n));
        if n % 4 == 0 {
            let _ = class.add_line_jump(LineNumber::new(n), BranchId::new(0));
        }
    }
    class
}

fn bench_touch_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("touch_line");

    let class = populated_class(1_000);
    group.bench_function("via_class", |bench| {
        bench.iter(|| {
            let _ = class.touch(black_box(LineNumber::new(500)), black_box(1));
        });
    });

    let handle = class.add_line(LineNumber::new(500));
    group.bench_function("via_handle", |bench| {
        bench.iter(|| handle.touch(black_box(1)));
    });

    group.finish();
}

fn bench_touch_jump(c: &mut Criterion) {
    let class = populated_class(1_000);
    c.bench_function("touch_jump", |bench| {
        bench.iter(|| {
            let _ = class.touch_jump(
                black_box(LineNumber::new(400)),
                BranchId::new(0),
                black_box(true),
                1,
            );
        });
    });
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for lines in [100_u32, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_lines", lines)),
            &lines,
            |bench, &n| {
                bench.iter(|| {
                    let target = populated_class(n);
                    let snapshot = populated_class(n);
                    target.merge(&snapshot);
                    black_box(target);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_touch_line, bench_touch_jump, bench_merge);
criterion_main!(benches);
