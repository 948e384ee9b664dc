//! Transposition and conversion from CSR to COO

use tracing::trace;

use crate::matrix::{CooMatrix, CsrMatrix, IdArray, IdType};

impl<I: IdType> CsrMatrix<I> {
    /// Returns the transposed matrix
    ///
    /// Uses a counting sort over column IDs, so the cost is
    /// O(nnz + num_rows + num_cols). Rows of the result list their columns
    /// (old rows) in ascending order, and the result always carries a data
    /// array holding the original entry IDs.
    pub fn transpose(&self) -> CsrMatrix<I> {
        trace!(num_rows = self.num_rows, num_cols = self.num_cols, nnz = self.nnz(), "transpose");

        // Count entries per column
        let mut col_counts = vec![0usize; self.num_cols];

        for &col in self.indices.iter() {
            col_counts[col.as_usize()] += 1;
        }

        // Compute new row pointers via prefix sum
        let mut indptr = vec![I::zero(); self.num_cols + 1];
        let mut sum = 0;

        for (i, &count) in col_counts.iter().enumerate() {
            indptr[i] = I::from_usize(sum);
            sum += count;
        }
        indptr[self.num_cols] = I::from_usize(sum);

        // Scatter every entry into its bucket
        let nnz = self.nnz();
        let mut indices = vec![I::zero(); nnz];
        let mut data = vec![I::zero(); nnz];
        let mut next: Vec<usize> = indptr[..self.num_cols].iter().map(|p| p.as_usize()).collect();

        for row in 0..self.num_rows {
            for pos in self.row_range(row) {
                let col = self.indices[pos].as_usize();
                let dst = next[col];

                indices[dst] = I::from_usize(row);
                data[dst] = self.entry_id(pos);

                next[col] += 1;
            }
        }

        let device = self.device();
        CsrMatrix::from_parts(
            self.num_cols,
            self.num_rows,
            IdArray::on_device(indptr, device),
            IdArray::on_device(indices, device),
            Some(IdArray::on_device(data, device)),
            true,
        )
    }

    /// Converts this CSR matrix to COO format
    ///
    /// - If `data_as_order` is false, the column and data arrays of the
    ///   result are the indices and data arrays of this matrix, the result
    ///   is row sorted, and it is also column sorted if this matrix is.
    /// - If `data_as_order` is true, the data array gives the position each
    ///   entry takes in the result; the result then has no data array since
    ///   its entry IDs are the consecutive range.
    ///
    /// Complexity: O(nnz)
    pub fn to_coo(&self, data_as_order: bool) -> CooMatrix<I> {
        let device = self.device();
        let rows = self.expand_rows();

        match (&self.data, data_as_order) {
            (Some(order), true) => {
                let nnz = self.nnz();
                let mut row = vec![I::zero(); nnz];
                let mut col = vec![I::zero(); nnz];

                for pos in 0..nnz {
                    let dst = order[pos].as_usize();
                    assert!(dst < nnz, "data as order holds {} but nnz is {}", dst, nnz);
                    row[dst] = rows[pos];
                    col[dst] = self.indices[pos];
                }

                CooMatrix::new(
                    self.num_rows,
                    self.num_cols,
                    IdArray::on_device(row, device),
                    IdArray::on_device(col, device),
                    None,
                    false,
                    false,
                )
            }
            _ => CooMatrix::new(
                self.num_rows,
                self.num_cols,
                IdArray::on_device(rows, device),
                self.indices.clone(),
                self.data.clone(),
                true,
                self.sorted,
            ),
        }
    }

    /// The row ID of every entry, expanded from `indptr`
    pub(crate) fn expand_rows(&self) -> Vec<I> {
        let mut rows = Vec::with_capacity(self.nnz());
        for row in 0..self.num_rows {
            let len = self.row_range(row).len();
            rows.extend(std::iter::repeat(I::from_usize(row)).take(len));
        }
        rows
    }
}
