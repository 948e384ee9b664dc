//! Multiset union and block-diagonal batching of matrices

use tracing::{debug, instrument};

use crate::matrix::{CsrMatrix, IdArray, IdType};

/// Union same-shaped matrices into one
///
/// Entries of all inputs are concatenated row by row, so duplicates are
/// kept: the result holds the (row, col) multiset union. Entry IDs of the
/// k-th input are shifted by the total nnz of the inputs before it. When
/// every input is sorted the result is sorted too, with equal columns in
/// input order.
///
/// Example:
///
/// A = [[0, 0, 1, 0],
///      [1, 0, 1, 1],
///      [0, 1, 0, 0]]
///
/// B = [[0, 1, 1, 0],
///      [0, 0, 0, 1],
///      [0, 0, 1, 0]]
///
/// C = union_csr(&[A, B])
///
/// C = [[0, 1, 2, 0],
///      [1, 0, 1, 2],
///      [0, 1, 1, 0]]
///
/// # Panics
///
/// Panics if `csrs` is empty or the inputs differ in shape or device.
#[instrument(skip(csrs), fields(n_inputs = csrs.len()))]
pub fn union_csr<I: IdType>(csrs: &[CsrMatrix<I>]) -> CsrMatrix<I> {
    assert!(!csrs.is_empty(), "union_csr needs at least one matrix");
    let first = &csrs[0];
    for csr in &csrs[1..] {
        assert_eq!(
            (csr.num_rows, csr.num_cols),
            (first.num_rows, first.num_cols),
            "union_csr inputs must share the same shape"
        );
        assert_eq!(csr.device(), first.device(), "union_csr inputs must share a device");
    }

    let (num_rows, num_cols) = (first.num_rows, first.num_cols);
    let total_nnz: usize = csrs.iter().map(|csr| csr.nnz()).sum();
    let sorted = csrs.iter().all(|csr| csr.sorted);

    let mut eid_offsets = Vec::with_capacity(csrs.len());
    let mut running = 0;
    for csr in csrs {
        eid_offsets.push(I::from_usize(running));
        running += csr.nnz();
    }

    let mut indptr = Vec::with_capacity(num_rows + 1);
    let mut entries: Vec<(I, I)> = Vec::with_capacity(total_nnz);
    indptr.push(I::zero());

    for row in 0..num_rows {
        let start = entries.len();
        for (csr, &offset) in csrs.iter().zip(&eid_offsets) {
            entries.extend(csr.row_iter(row).map(|(col, eid)| (col, eid + offset)));
        }
        if sorted {
            // Stable: equal columns stay in input order
            entries[start..].sort_by_key(|&(col, _)| col);
        }
        indptr.push(I::from_usize(entries.len()));
    }
    debug!(nnz = total_nnz, "union built");

    let device = first.device();
    let (indices, data): (Vec<I>, Vec<I>) = entries.into_iter().unzip();
    CsrMatrix::from_parts(
        num_rows,
        num_cols,
        IdArray::on_device(indptr, device),
        IdArray::on_device(indices, device),
        Some(IdArray::on_device(data, device)),
        sorted,
    )
}

/// Concatenate matrices along the diagonal
///
/// Rows of the k-th input are shifted by the rows of the inputs before it,
/// columns by their columns and entry IDs by their nnz. This batches
/// independent graphs into one.
///
/// Examples:
///
/// A = [[0, 0, 1],
///      [1, 0, 1],
///      [0, 1, 0]]
///
/// B = [[0, 0],
///      [1, 0]]
///
/// C = disjoint_union_csr(&[A, B])
///
/// C = [[0, 0, 1, 0, 0],
///      [1, 0, 1, 0, 0],
///      [0, 1, 0, 0, 0],
///      [0, 0, 0, 0, 0],
///      [0, 0, 0, 1, 0]]
///
/// # Panics
///
/// Panics if `csrs` is empty or the inputs live on different devices.
#[instrument(skip(csrs), fields(n_inputs = csrs.len()))]
pub fn disjoint_union_csr<I: IdType>(csrs: &[CsrMatrix<I>]) -> CsrMatrix<I> {
    assert!(!csrs.is_empty(), "disjoint_union_csr needs at least one matrix");
    let device = csrs[0].device();
    assert!(
        csrs.iter().all(|csr| csr.device() == device),
        "disjoint_union_csr inputs must share a device"
    );

    let num_rows: usize = csrs.iter().map(|csr| csr.num_rows).sum();
    let num_cols: usize = csrs.iter().map(|csr| csr.num_cols).sum();
    let total_nnz: usize = csrs.iter().map(|csr| csr.nnz()).sum();
    let has_data = csrs.iter().any(|csr| csr.has_data());

    let mut indptr = Vec::with_capacity(num_rows + 1);
    let mut indices = Vec::with_capacity(total_nnz);
    let mut data = Vec::with_capacity(if has_data { total_nnz } else { 0 });
    indptr.push(I::zero());

    let (mut col_offset, mut eid_offset) = (I::zero(), I::zero());
    for csr in csrs {
        let nnz_offset = I::from_usize(indices.len());
        indptr.extend(csr.indptr[1..].iter().map(|&p| p + nnz_offset));
        indices.extend(csr.indices.iter().map(|&c| c + col_offset));
        if has_data {
            data.extend((0..csr.nnz()).map(|pos| csr.entry_id(pos) + eid_offset));
        }
        col_offset = col_offset + I::from_usize(csr.num_cols);
        eid_offset = eid_offset + I::from_usize(csr.nnz());
    }
    debug!(num_rows, num_cols, nnz = total_nnz, "disjoint union built");

    CsrMatrix::new(
        num_rows,
        num_cols,
        IdArray::on_device(indptr, device),
        IdArray::on_device(indices, device),
        has_data.then(|| IdArray::on_device(data, device)),
        csrs.iter().all(|csr| csr.sorted),
    )
}
