//! Collapsing duplicate entries of a multigraph

use tracing::{debug, instrument};

use crate::matrix::{CsrMatrix, IdArray, IdType};

impl<I: IdType> CsrMatrix<I> {
    /// Collapse duplicate (row, col) entries into one
    ///
    /// The rows are sorted first, so the result is sorted and holds one
    /// entry per distinct (row, col) pair. It has no data array.
    ///
    /// Examples:
    ///
    /// A = [[0, 0, 0],
    ///      [3, 0, 2],
    ///      [1, 1, 0],
    ///      [0, 0, 4]]
    ///
    /// B, cnt, edge_map = A.to_simple()
    ///
    /// B = [[0, 0, 0],
    ///      [1, 0, 1],
    ///      [1, 1, 0],
    ///      [0, 0, 1]]
    /// cnt = [3, 2, 1, 1, 4]
    /// edge_map = [0, 0, 0, 1, 1, 2, 3, 4, 4, 4, 4]
    ///
    /// # Returns
    ///
    /// The simple matrix, the multiplicity of each of its entries, and an
    /// edge map with one value per original position: the position of the
    /// simple entry that absorbed it.
    #[instrument(skip(self), fields(num_rows = self.num_rows, nnz = self.nnz()))]
    pub fn to_simple(&self) -> (CsrMatrix<I>, IdArray<I>, IdArray<I>) {
        // Sorting permutes positions; its data array remembers where each
        // entry came from, as long as we start from the identity.
        let mut sorted = self.clone();
        sorted.data = None;
        sorted.sort_in_place();

        let mut indptr = Vec::with_capacity(self.num_rows + 1);
        let mut indices = Vec::with_capacity(self.nnz());
        let mut counts: Vec<I> = Vec::with_capacity(self.nnz());
        let mut edge_map = vec![I::zero(); self.nnz()];
        indptr.push(I::zero());

        for row in 0..sorted.num_rows {
            let mut last_col = None;
            for (col, origin) in sorted.row_iter(row) {
                if last_col != Some(col) {
                    indices.push(col);
                    counts.push(I::zero());
                    last_col = Some(col);
                }
                let simple_pos = indices.len() - 1;
                counts[simple_pos] = counts[simple_pos] + I::one();
                edge_map[origin.as_usize()] = I::from_usize(simple_pos);
            }
            indptr.push(I::from_usize(indices.len()));
        }
        debug!(simple_nnz = indices.len(), "collapsed duplicate entries");

        let device = self.device();
        let simple = CsrMatrix::from_parts(
            self.num_rows,
            self.num_cols,
            IdArray::on_device(indptr, device),
            IdArray::on_device(indices, device),
            None,
            true,
        );
        (
            simple,
            IdArray::on_device(counts, device),
            IdArray::on_device(edge_map, device),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_simple() {
        let csr = CsrMatrix::<i64>::new(
            4,
            3,
            vec![0, 0, 5, 7, 11],
            vec![0, 0, 0, 2, 2, 0, 1, 2, 2, 2, 2],
            None,
            true,
        );

        let (simple, cnt, edge_map) = csr.to_simple();
        assert_eq!(simple.indptr.as_slice(), &[0, 0, 2, 4, 5]);
        assert_eq!(simple.indices.as_slice(), &[0, 2, 0, 1, 2]);
        assert!(simple.sorted);
        assert!(!simple.has_data());
        assert_eq!(cnt.as_slice(), &[3, 2, 1, 1, 4]);
        assert_eq!(edge_map.as_slice(), &[0, 0, 0, 1, 1, 2, 3, 4, 4, 4, 4]);
    }

    #[test]
    fn test_to_simple_unsorted_input() {
        // Row 0 holds cols 2, 0, 2 at positions 0, 1, 2
        let csr = CsrMatrix::<i32>::new(1, 3, vec![0, 3], vec![2, 0, 2], None, false);

        let (simple, cnt, edge_map) = csr.to_simple();
        assert_eq!(simple.indices.as_slice(), &[0, 2]);
        assert_eq!(cnt.as_slice(), &[1, 2]);
        assert_eq!(edge_map.as_slice(), &[1, 0, 1]);
    }

    #[test]
    fn test_to_simple_ignores_entry_ids() {
        let csr = CsrMatrix::<i64>::new(
            1,
            2,
            vec![0, 3],
            vec![1, 1, 0],
            Some(IdArray::new(vec![9, 8, 7])),
            false,
        );
        let (simple, cnt, edge_map) = csr.to_simple();
        assert_eq!(simple.indices.as_slice(), &[0, 1]);
        assert_eq!(cnt.as_slice(), &[1, 2]);
        assert_eq!(edge_map.as_slice(), &[1, 1, 0]);
    }
}
