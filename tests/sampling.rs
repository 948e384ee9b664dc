//! Integration tests for row-wise sampling and top-k selection

use std::collections::HashSet;

use csrgraph::{row_wise_sampling, row_wise_topk, CsrConfig, CsrMatrix};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Row `r` has `r` entries, at columns `0..r`
fn create_staircase(n: usize) -> CsrMatrix<i64> {
    let mut indptr = vec![0i64];
    let mut indices = Vec::new();
    for row in 0..n {
        indices.extend(0..row as i64);
        indptr.push(indices.len() as i64);
    }
    CsrMatrix::new(n, n, indptr, indices, None, true)
}

#[test]
fn test_sampling_bound_without_replacement() {
    init_tracing();
    let csr = create_staircase(12);
    let rows: Vec<i64> = (0..12).collect();
    let config = CsrConfig::default().with_seed(1234);

    let coo = row_wise_sampling(&csr, &rows, 5, &[] as &[f64], false, &config);

    for &row in &rows {
        let picked: Vec<_> = coo
            .triples()
            .filter(|&(r, _, _)| r == row)
            .map(|(_, _, eid)| eid)
            .collect();
        assert_eq!(picked.len(), 5.min(row as usize));

        // No entry is picked twice and every pick belongs to the row
        let unique: HashSet<_> = picked.iter().copied().collect();
        assert_eq!(unique.len(), picked.len());
        let range = csr.row_range(row as usize);
        assert!(picked.iter().all(|&eid| range.contains(&(eid as usize))));
    }
}

#[test]
fn test_sampling_with_replacement_fills_nonempty_rows() {
    let csr = create_staircase(6);
    let config = CsrConfig::sequential().with_seed(99);

    let coo = row_wise_sampling(&csr, &[0, 1, 5], 4, &[] as &[f32], true, &config);
    assert_eq!(coo.nnz(), 8);
    assert_eq!(coo.row.as_slice(), &[1, 1, 1, 1, 5, 5, 5, 5]);
    assert_eq!((coo.num_rows, coo.num_cols), (6, 6));
}

#[test]
fn test_sampling_is_reproducible_across_schedules() {
    let csr = create_staircase(64);
    let rows: Vec<i64> = (0..64).rev().collect();
    let prob: Vec<f64> = (0..csr.nnz()).map(|eid| (eid % 7) as f64).collect();

    let sequential = CsrConfig::sequential().with_seed(5);
    let parallel = CsrConfig::default().with_seed(5).with_parallel_threshold(1);

    for replace in [false, true] {
        let a = row_wise_sampling(&csr, &rows, 3, &prob, replace, &sequential);
        let b = row_wise_sampling(&csr, &rows, 3, &prob, replace, &parallel);
        assert_eq!(a, b);
        assert!(a.data.unwrap().iter().all(|&eid| prob[eid as usize] > 0.0));
    }
}

#[test]
fn test_topk_selects_heaviest_entries() {
    init_tracing();
    let csr = create_staircase(5);
    // Weight of an entry is its column, so the top entries are the rightmost
    let weight: Vec<f32> = csr.indices.iter().map(|&c| c as f32).collect();

    let coo = row_wise_topk(&csr, &[4, 2, 0], 2, &weight, false, &CsrConfig::sequential());
    assert_eq!(coo.row.as_slice(), &[4, 4, 2, 2]);
    assert_eq!(coo.col.as_slice(), &[3, 2, 1, 0]);

    let coo = row_wise_topk(&csr, &[4], 2, &weight, true, &CsrConfig::sequential());
    assert_eq!(coo.col.as_slice(), &[0, 1]);
}
