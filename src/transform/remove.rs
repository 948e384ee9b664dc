//! Removing entries by entry ID

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::matrix::{CsrMatrix, IdArray, IdType};

impl<I: IdType> CsrMatrix<I> {
    /// Remove the entries whose entry IDs appear in `entries`
    ///
    /// # Returns
    ///
    /// The remaining matrix (without a data array, so its entry IDs are
    /// `0..nnz`) and a mapping whose i-th value is the original entry ID of
    /// the i-th remaining entry. Callers use the mapping to re-index any
    /// per-entry state such as edge features.
    #[instrument(skip(self, entries), fields(nnz = self.nnz(), removed = entries.len()))]
    pub fn remove(&self, entries: &[I]) -> (CsrMatrix<I>, IdArray<I>) {
        let to_remove: HashSet<I> = entries.iter().copied().collect();

        let mut indptr = Vec::with_capacity(self.num_rows + 1);
        let mut indices = Vec::with_capacity(self.nnz());
        let mut mapping = Vec::with_capacity(self.nnz());
        indptr.push(I::zero());

        for row in 0..self.num_rows {
            for pos in self.row_range(row) {
                let eid = self.entry_id(pos);
                if !to_remove.contains(&eid) {
                    indices.push(self.indices[pos]);
                    mapping.push(eid);
                }
            }
            indptr.push(I::from_usize(indices.len()));
        }
        debug!(kept = indices.len(), "removed entries");

        let device = self.device();
        let csr = CsrMatrix::from_parts(
            self.num_rows,
            self.num_cols,
            IdArray::on_device(indptr, device),
            IdArray::on_device(indices, device),
            None,
            self.sorted,
        );
        (csr, IdArray::on_device(mapping, device))
    }
}
