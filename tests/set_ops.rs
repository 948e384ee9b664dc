//! Integration tests for unions, batching and duplicate removal

use csrgraph::{disjoint_partition_csr_by_sizes, disjoint_union_csr, union_csr, CsrMatrix, IdArray};

fn graph_a() -> CsrMatrix<i64> {
    // [0 1 1]
    // [0 0 0]
    // [1 0 0]
    CsrMatrix::new(3, 3, vec![0, 2, 2, 3], vec![1, 2, 0], None, true)
}

fn graph_b() -> CsrMatrix<i64> {
    // [0 1 0]
    // [1 0 1]
    // [0 0 0]
    CsrMatrix::new(3, 3, vec![0, 1, 3, 3], vec![1, 0, 2], None, true)
}

#[test]
fn test_union_row_degrees_add_up() {
    let (a, b) = (graph_a(), graph_b());
    let c = union_csr(&[a.clone(), b.clone()]);

    for row in 0..3 {
        assert_eq!(c.row_nnz(row), a.row_nnz(row) + b.row_nnz(row));
    }
    // Overlapping entry (0, 1) appears twice, once from each input
    assert_eq!(c.get_all_data(0, 1), vec![0, 3]);
    assert_eq!(c.nnz(), 6);
}

#[test]
fn test_union_of_one_matrix_keeps_entries() {
    let a = graph_a();
    let c = union_csr(std::slice::from_ref(&a));
    assert!(c.same_structure(&a));
}

#[test]
fn test_disjoint_union_and_partition() {
    let (a, b) = (graph_a(), graph_b());
    let small = CsrMatrix::<i64>::new(1, 2, vec![0, 2], vec![1, 0], Some(IdArray::new(vec![1, 0])), false);

    let batched = disjoint_union_csr(&[a.clone(), small.clone(), b.clone()]);
    assert_eq!((batched.num_rows, batched.num_cols), (7, 8));
    assert_eq!(batched.nnz(), 8);
    // Row 3 is the first row of `small`, shifted to columns 3 and 4
    assert_eq!(batched.row_column_indices(3), &[4, 3]);
    assert_eq!(batched.row_data(3).as_ref(), &[4, 3]);
    assert!(!batched.sorted);

    let parts = disjoint_partition_csr_by_sizes(
        &batched,
        3,
        &[0, 3, 5, 8],
        &[0, 3, 4, 7],
        &[0, 3, 5, 8],
    );
    assert_eq!(parts.len(), 3);
    assert!(parts[0].same_structure(&a));
    assert!(parts[1].same_structure(&small));
    assert!(parts[2].same_structure(&b));
}

#[test]
fn test_to_simple_counts_multiplicity() {
    // Row 0 holds three copies of column 2, row 1 a single entry
    let csr = CsrMatrix::<i32>::new(2, 3, vec![0, 3, 4], vec![2, 2, 2, 1], None, true);

    let (simple, cnt, edge_map) = csr.to_simple();
    assert_eq!(simple.indptr.as_slice(), &[0, 1, 2]);
    assert_eq!(simple.indices.as_slice(), &[2, 1]);
    assert_eq!(cnt.as_slice(), &[3, 1]);
    assert_eq!(edge_map.as_slice(), &[0, 0, 0, 1]);
    assert!(!simple.has_duplicate());
}

#[test]
fn test_to_simple_after_union() {
    let c = union_csr(&[graph_a(), graph_b()]);
    let (simple, cnt, edge_map) = c.to_simple();

    assert_eq!(simple.nnz(), 5);
    assert_eq!(cnt.iter().map(|&n| n as usize).sum::<usize>(), c.nnz());
    assert_eq!(edge_map.len(), c.nnz());
    assert_eq!(simple.get_data(&[0], &[1]).as_slice(), &[0]);
}
