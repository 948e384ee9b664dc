//! Row slicing and induced submatrices

use std::collections::HashMap;

use tracing::debug;

use crate::constants::DEFAULT_PARALLEL_ROW_THRESHOLD;
use crate::matrix::{CsrMatrix, IdArray, IdType};
use crate::parallel::scatter_with_offsets;

impl<I: IdType> CsrMatrix<I> {
    /// Slice the contiguous rows `start..end`
    ///
    /// The sliced rows are relabeled to start from zero; column IDs and
    /// entry IDs are kept.
    ///
    /// Examples:
    /// num_rows = 4
    /// num_cols = 4
    /// indptr = [0, 2, 3, 3, 5]
    /// indices = [1, 0, 2, 3, 1]
    ///
    ///  After slice_rows(1, 3)
    ///
    /// num_rows = 2
    /// num_cols = 4
    /// indptr = [0, 1, 1]
    /// indices = [2]
    pub fn slice_rows(&self, start: usize, end: usize) -> CsrMatrix<I> {
        assert!(
            start <= end && end <= self.num_rows,
            "Invalid row range {}..{} (num_rows = {})",
            start,
            end,
            self.num_rows
        );
        let device = self.device();
        let first = self.indptr[start];
        let (lo, hi) = (first.as_usize(), self.indptr[end].as_usize());

        let indptr: Vec<I> = self.indptr[start..=end].iter().map(|&p| p - first).collect();
        let indices = self.indices[lo..hi].to_vec();
        let data = match &self.data {
            Some(data) => Some(data[lo..hi].to_vec()),
            None if lo == 0 => None,
            None => Some((lo..hi).map(I::from_usize).collect()),
        };

        CsrMatrix::from_parts(
            end - start,
            self.num_cols,
            IdArray::on_device(indptr, device),
            IdArray::on_device(indices, device),
            data.map(|d| IdArray::on_device(d, device)),
            self.sorted,
        )
    }

    /// Slice the given rows, in the given order
    ///
    /// Row `i` of the result is row `rows[i]` of this matrix. Rows may
    /// repeat; column IDs and entry IDs are kept.
    pub fn slice_rows_by_ids(&self, rows: &[I]) -> CsrMatrix<I> {
        debug!(num_rows = rows.len(), "slicing rows by id");

        let (offsets, entries) = scatter_with_offsets(
            rows.len(),
            rows.len() >= DEFAULT_PARALLEL_ROW_THRESHOLD,
            |i| self.row_nnz(rows[i].as_usize()),
            |i, out: &mut [(I, I)]| {
                for (slot, pos) in out.iter_mut().zip(self.row_range(rows[i].as_usize())) {
                    *slot = (self.indices[pos], self.entry_id(pos));
                }
            },
        );

        let device = self.device();
        let (indices, data): (Vec<I>, Vec<I>) = entries.into_iter().unzip();
        CsrMatrix::from_parts(
            rows.len(),
            self.num_cols,
            IdArray::on_device(offsets.into_iter().map(I::from_usize).collect(), device),
            IdArray::on_device(indices, device),
            Some(IdArray::on_device(data, device)),
            self.sorted,
        )
    }

    /// Get the submatrix specified by the row and col ids
    ///
    /// In numpy notation, given matrix M, row index array I, col index array J
    /// this returns M[I, J]. Row `i` of the result is `rows[i]` and column
    /// `j` is `cols[j]`; entry IDs are kept.
    ///
    /// # Panics
    ///
    /// Panics if `cols` repeats a column.
    pub fn slice_matrix(&self, rows: &[I], cols: &[I]) -> CsrMatrix<I> {
        debug!(num_rows = rows.len(), num_cols = cols.len(), "slicing submatrix");

        let relabel: HashMap<I, I> = cols
            .iter()
            .enumerate()
            .map(|(j, &c)| (c, I::from_usize(j)))
            .collect();
        assert_eq!(relabel.len(), cols.len(), "slice_matrix cols must not repeat");
        let relabel = &relabel;
        let picked = move |row: usize| {
            self.row_range(row).filter_map(move |pos| {
                relabel
                    .get(&self.indices[pos])
                    .map(|&c| (c, self.entry_id(pos)))
            })
        };

        let (offsets, entries) = scatter_with_offsets(
            rows.len(),
            rows.len() >= DEFAULT_PARALLEL_ROW_THRESHOLD,
            |i| picked(rows[i].as_usize()).count(),
            |i, out: &mut [(I, I)]| {
                for (slot, entry) in out.iter_mut().zip(picked(rows[i].as_usize())) {
                    *slot = entry;
                }
            },
        );

        // Relabeling keeps ascending order only when cols ascend
        let sorted = self.sorted && cols.windows(2).all(|w| w[0] < w[1]);

        let device = self.device();
        let (indices, data): (Vec<I>, Vec<I>) = entries.into_iter().unzip();
        CsrMatrix::from_parts(
            rows.len(),
            cols.len(),
            IdArray::on_device(offsets.into_iter().map(I::from_usize).collect(), device),
            IdArray::on_device(indices, device),
            Some(IdArray::on_device(data, device)),
            sorted,
        )
    }
}
