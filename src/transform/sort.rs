//! Sorting column indices within rows and duplicate detection

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::constants::DEFAULT_PARALLEL_ROW_THRESHOLD;
use crate::matrix::{CsrMatrix, IdArray, IdType};

/// Split `buf` into one mutable slice per row of `indptr`
fn row_slices_mut<'a, I: IdType>(buf: &'a mut [I], indptr: &[I]) -> Vec<&'a mut [I]> {
    let mut slices = Vec::with_capacity(indptr.len().saturating_sub(1));
    let mut rest = buf;
    for w in indptr.windows(2) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut((w[1] - w[0]).as_usize());
        slices.push(head);
        rest = tail;
    }
    slices
}

/// Stable sort of one row's columns, permuting its entry IDs alongside
fn sort_row<I: IdType>(cols: &mut [I], data: &mut [I], scratch: &mut Vec<(I, I)>) {
    if cols.windows(2).all(|w| w[0] <= w[1]) {
        return;
    }
    scratch.clear();
    scratch.extend(cols.iter().copied().zip(data.iter().copied()));
    scratch.sort_by_key(|&(col, _)| col);
    for ((c, d), &(col, eid)) in cols.iter_mut().zip(data.iter_mut()).zip(scratch.iter()) {
        *c = col;
        *d = eid;
    }
}

impl<I: IdType> CsrMatrix<I> {
    /// Sort the column indices of every row in ascending order, in place
    ///
    /// Only the indices and data arrays are mutated; indptr stays the same.
    /// The sort is stable, so duplicate columns keep their relative order.
    /// A missing data array is materialized first so entries keep their IDs.
    /// Buffers shared with other matrices are copied before being written.
    ///
    /// Examples:
    /// num_rows = 4
    /// num_cols = 4
    /// indptr = [0, 2, 3, 3, 5]
    /// indices = [1, 0, 2, 3, 1]
    ///
    ///  After sort_in_place()
    ///
    /// indptr = [0, 2, 3, 3, 5]
    /// indices = [0, 1, 2, 1, 3]
    pub fn sort_in_place(&mut self) {
        if self.sorted {
            return;
        }
        if self.is_sorted() {
            self.sorted = true;
            return;
        }
        debug!(num_rows = self.num_rows, nnz = self.nnz(), "sorting rows in place");

        let (nnz, device) = (self.nnz(), self.device());
        let indptr = self.indptr.clone();
        let parallel = self.num_rows >= DEFAULT_PARALLEL_ROW_THRESHOLD;

        let indices = self.indices.make_mut();
        let data = self
            .data
            .get_or_insert_with(|| IdArray::range(nnz, device))
            .make_mut();

        let col_rows = row_slices_mut(indices, &indptr);
        let data_rows = row_slices_mut(data, &indptr);

        if parallel {
            col_rows
                .into_par_iter()
                .zip(data_rows)
                .for_each_init(Vec::new, |scratch, (cols, data)| sort_row(cols, data, scratch));
        } else {
            let mut scratch = Vec::new();
            for (cols, data) in col_rows.into_iter().zip(data_rows) {
                sort_row(cols, data, &mut scratch);
            }
        }

        self.sorted = true;
    }

    /// Return a new matrix with the column indices of every row sorted
    ///
    /// Returns the matrix unchanged (sharing its buffers) if it is already
    /// flagged as sorted.
    pub fn sort(&self) -> CsrMatrix<I> {
        let mut ret = self.clone();
        ret.sort_in_place();
        ret
    }

    /// True if any row holds two entries with the same column
    pub fn has_duplicate(&self) -> bool {
        if self.sorted {
            return (0..self.num_rows).any(|row| {
                self.row_column_indices(row)
                    .windows(2)
                    .any(|w| w[0] == w[1])
            });
        }
        let mut seen = HashSet::new();
        (0..self.num_rows).any(|row| {
            seen.clear();
            !self.row_column_indices(row).iter().all(|&col| seen.insert(col))
        })
    }
}
