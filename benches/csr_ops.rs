use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use csrgraph::{row_wise_sampling, row_wise_topk, union_csr, CsrConfig, CsrMatrix};

/// Generate a graph with a fixed out-degree and scattered, unsorted columns
fn generate_graph(n: usize, degree: usize) -> CsrMatrix<i64> {
    let mut indptr = vec![0i64];
    let mut indices = Vec::with_capacity(n * degree);

    for i in 0..n {
        for j in 0..degree.min(n) {
            let col = (j * 7919 + i * 31) % n;
            indices.push(col as i64);
        }
        indptr.push(indices.len() as i64);
    }

    CsrMatrix::new(n, n, indptr, indices, None, false)
}

fn bench_structure(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure");
    group.sample_size(20);

    for &n in &[1_000, 10_000, 100_000] {
        let graph = generate_graph(n, 16);

        group.bench_with_input(BenchmarkId::new("sort", n), &graph, |b, g| {
            b.iter(|| black_box(g.sort()))
        });
        group.bench_with_input(BenchmarkId::new("transpose", n), &graph, |b, g| {
            b.iter(|| black_box(g.transpose()))
        });
        group.bench_with_input(BenchmarkId::new("to_simple", n), &graph, |b, g| {
            b.iter(|| black_box(g.to_simple()))
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let n = 50_000;
    let graph = generate_graph(n, 16);
    let sorted = graph.sort();
    let rows: Vec<i64> = (0..n as i64).collect();
    let cols: Vec<i64> = rows.iter().map(|&r| (r * 31) % n as i64).collect();

    group.bench_function("get_data_unsorted", |b| {
        b.iter(|| black_box(graph.get_data(&rows, &cols)))
    });
    group.bench_function("get_data_sorted", |b| {
        b.iter(|| black_box(sorted.get_data(&rows, &cols)))
    });
    group.bench_function("is_nonzero_batch", |b| {
        b.iter(|| black_box(sorted.is_nonzero_batch(&rows, &cols)))
    });

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");
    let n = 100_000;
    let graph = generate_graph(n, 32);
    let rows: Vec<i64> = (0..n as i64).step_by(4).collect();
    let weights: Vec<f32> = (0..graph.nnz()).map(|i| (i % 13) as f32 + 0.5).collect();

    for (label, config) in [
        ("sequential", CsrConfig::sequential().with_seed(7)),
        ("parallel", CsrConfig::default().with_seed(7)),
    ] {
        group.bench_function(BenchmarkId::new("uniform", label), |b| {
            b.iter(|| black_box(row_wise_sampling(&graph, &rows, 10, &[] as &[f32], false, &config)))
        });
        group.bench_function(BenchmarkId::new("weighted", label), |b| {
            b.iter(|| black_box(row_wise_sampling(&graph, &rows, 10, &weights, false, &config)))
        });
        group.bench_function(BenchmarkId::new("topk", label), |b| {
            b.iter(|| black_box(row_wise_topk(&graph, &rows, 10, &weights, false, &config)))
        });
    }

    group.finish();
}

fn bench_union(c: &mut Criterion) {
    let graphs: Vec<_> = (0..4).map(|k| generate_graph(20_000, 8 + k)).collect();

    c.bench_function("union_csr_4x20k", |b| {
        b.iter(|| black_box(union_csr(&graphs)))
    });
}

criterion_group!(benches, bench_structure, bench_queries, bench_sampling, bench_union);
criterion_main!(benches);
