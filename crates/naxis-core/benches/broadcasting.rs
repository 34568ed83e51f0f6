//! Benchmarks for named-shape broadcasting and the operations built on it.
//!
//! Broadcasting by name runs before every elementwise operation, so its cost
//! matters for small arrays as much as the data movement matters for large ones.
//!
//! Run with:
//! ```bash
//! cargo bench --bench broadcasting
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use naxis_core::{
    broadcast_shapes, Array, ArrayMath, Cartesian3dVectorArray, Interpolate, LinearSpace,
    Materialize, NamedShape, ScalarArray,
};
use std::collections::BTreeMap;
use std::hint::black_box;

fn shape(pairs: &[(&str, usize)]) -> NamedShape {
    NamedShape::from_pairs(pairs.iter().cloned()).expect("valid shape")
}

/// Benchmark the shape merge alone
fn bench_broadcast_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_shapes");

    let test_cases = vec![
        ("disjoint_2", vec![shape(&[("x", 3)]), shape(&[("y", 4)])]),
        (
            "overlap_3",
            vec![
                shape(&[("x", 3), ("y", 1)]),
                shape(&[("y", 4), ("z", 2)]),
                shape(&[("z", 1), ("w", 5)]),
            ],
        ),
        (
            "wide_6",
            vec![
                shape(&[("a", 2), ("b", 2), ("c", 2)]),
                shape(&[("d", 2), ("e", 2), ("f", 2)]),
                shape(&[("a", 1), ("f", 1)]),
            ],
        ),
    ];

    for (name, shapes) in test_cases {
        let refs: Vec<&NamedShape> = shapes.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(name), &refs, |b, refs| {
            b.iter(|| black_box(broadcast_shapes(black_box(refs)).expect("compatible")));
        });
    }

    group.finish();
}

/// Benchmark elementwise addition of arrays with crossed axes
fn bench_outer_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("outer_add");

    for &n in &[16usize, 128, 512] {
        let x = ScalarArray::<f64>::ones(&shape(&[("x", n)]));
        let y = ScalarArray::<f64>::ones(&shape(&[("y", n)]));
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &(x, y), |b, (x, y)| {
            b.iter(|| black_box(x.checked_add(black_box(y)).expect("broadcastable")));
        });
    }

    group.finish();
}

/// Benchmark promotion of scalars to vectors inside a ufunc
fn bench_vector_promotion(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_promotion");

    for &n in &[64usize, 1024] {
        let t = ScalarArray::<f64>::ones(&shape(&[("t", n)]));
        let v = Cartesian3dVectorArray::constant(1.0, 2.0, 3.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &(t, v), |b, (t, v)| {
            b.iter(|| black_box(t.try_mul(black_box(v)).expect("promotable")));
        });
    }

    group.finish();
}

/// Benchmark bilinear interpolation at many coordinates
fn bench_interp_linear(c: &mut Criterion) {
    let mut group = c.benchmark_group("interp_linear");

    let grid = ScalarArray::from_vec(
        (0..64 * 64).map(|i| i as f64).collect(),
        &shape(&[("x", 64), ("y", 64)]),
    )
    .expect("grid");
    for &n in &[16usize, 256] {
        let coords = LinearSpace::new(0.0, 62.5, "q", n)
            .expect("space")
            .explicit()
            .expect("materialized");
        let item = BTreeMap::from([
            ("x".to_string(), Array::Scalar(coords.clone())),
            ("y".to_string(), Array::Scalar(coords)),
        ]);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &item, |b, item| {
            b.iter(|| black_box(grid.interp_linear(black_box(item)).expect("interpolated")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_broadcast_shapes,
    bench_outer_add,
    bench_vector_promotion,
    bench_interp_linear
);

criterion_main!(benches);
