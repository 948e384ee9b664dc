//! Relabeling rows and columns

use tracing::{debug, instrument};

use crate::matrix::{CsrMatrix, IdArray, IdType};
use crate::utils::exclusive_scan;

impl<I: IdType> CsrMatrix<I> {
    /// Reorder the rows and columns according to new row and column IDs
    ///
    /// `new_row_ids[r]` is the new ID of old row `r`, and likewise for
    /// columns. Both must be permutations of their ID spaces. Entries keep
    /// their IDs and their within-row order.
    ///
    /// # Panics
    ///
    /// Panics if either ID sequence is not a permutation.
    #[instrument(skip(self, new_row_ids, new_col_ids), fields(num_rows = self.num_rows, nnz = self.nnz()))]
    pub fn reorder(&self, new_row_ids: &[I], new_col_ids: &[I]) -> CsrMatrix<I> {
        assert_eq!(
            new_row_ids.len(),
            self.num_rows,
            "new_row_ids must have one entry per row"
        );
        assert_eq!(
            new_col_ids.len(),
            self.num_cols,
            "new_col_ids must have one entry per column"
        );
        assert_permutation(new_row_ids, "new_row_ids");
        assert_permutation(new_col_ids, "new_col_ids");

        // Degree of every new row
        let mut degrees = vec![0usize; self.num_rows];
        for (old_row, &new_row) in new_row_ids.iter().enumerate() {
            degrees[new_row.as_usize()] = self.row_nnz(old_row);
        }
        let offsets = exclusive_scan(&degrees);
        debug!(nnz = offsets[self.num_rows], "computed reordered row offsets");

        // Copy every old row into its new bucket
        let nnz = self.nnz();
        let mut indices = vec![I::zero(); nnz];
        let mut data = vec![I::zero(); nnz];
        for (old_row, &new_row) in new_row_ids.iter().enumerate() {
            let start = offsets[new_row.as_usize()];
            for (k, pos) in self.row_range(old_row).enumerate() {
                indices[start + k] = new_col_ids[self.indices[pos].as_usize()];
                data[start + k] = self.entry_id(pos);
            }
        }

        let device = self.device();
        CsrMatrix::from_parts(
            self.num_rows,
            self.num_cols,
            IdArray::on_device(offsets.into_iter().map(I::from_usize).collect(), device),
            IdArray::on_device(indices, device),
            Some(IdArray::on_device(data, device)),
            false,
        )
    }
}

/// Panic unless `ids` holds every value of `0..ids.len()` exactly once
fn assert_permutation<I: IdType>(ids: &[I], name: &str) {
    let mut seen = vec![false; ids.len()];
    for &id in ids {
        assert!(
            id >= I::zero() && id.as_usize() < ids.len(),
            "{} is not a permutation: {} out of range",
            name,
            id
        );
        let slot = &mut seen[id.as_usize()];
        assert!(!*slot, "{} is not a permutation: {} repeats", name, id);
        *slot = true;
    }
}
