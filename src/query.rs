//! Point and batched queries over a CSR matrix
//!
//! Batched forms accept row and column sequences that broadcast: when one
//! of them has length 1 it is repeated to the length of the other.

use std::borrow::Cow;
use std::ops::Range;

use crate::constants::PARALLEL_QUERY_THRESHOLD;
use crate::matrix::{CsrMatrix, IdArray, IdType};
use crate::parallel::{map_tasks, scatter_with_offsets};
use crate::utils::{broadcast_get, broadcast_len};

impl<I: IdType> CsrMatrix<I> {
    /// Positions in `row` holding column `col`, in within-row order
    fn matches(&self, row: usize, col: I) -> impl Iterator<Item = usize> + '_ {
        assert!(
            col >= I::zero() && col.as_usize() < self.num_cols,
            "Column index {} out of bounds (num_cols = {})",
            col,
            self.num_cols
        );
        let range = self.row_range(row);
        let range: Range<usize> = if self.sorted {
            let cols = &self.indices[range.clone()];
            let lo = cols.partition_point(|&c| c < col);
            let hi = cols.partition_point(|&c| c <= col);
            range.start + lo..range.start + hi
        } else {
            range
        };
        range.filter(move |&pos| self.indices[pos] == col)
    }

    /// Return true if the value (row, col) is non-zero
    pub fn is_nonzero(&self, row: usize, col: usize) -> bool {
        self.matches(row, I::from_usize(col)).next().is_some()
    }

    /// Batched [`CsrMatrix::is_nonzero`] with broadcasting
    pub fn is_nonzero_batch(&self, rows: &[I], cols: &[I]) -> Vec<bool> {
        let len = broadcast_len(rows.len(), cols.len());
        map_tasks(len, len >= PARALLEL_QUERY_THRESHOLD, |i| {
            let row = broadcast_get(rows, i).as_usize();
            self.matches(row, broadcast_get(cols, i)).next().is_some()
        })
    }

    /// Return the nnz of the given row
    pub fn row_nnz(&self, row: usize) -> usize {
        self.row_range(row).len()
    }

    /// Batched [`CsrMatrix::row_nnz`]
    pub fn row_nnz_batch(&self, rows: &[I]) -> IdArray<I> {
        let counts = map_tasks(rows.len(), rows.len() >= PARALLEL_QUERY_THRESHOLD, |i| {
            I::from_usize(self.row_nnz(rows[i].as_usize()))
        });
        IdArray::on_device(counts, self.device())
    }

    /// Return the column indices of the given row
    pub fn row_column_indices(&self, row: usize) -> &[I] {
        &self.indices[self.row_range(row)]
    }

    /// Return the entry IDs of the given row
    ///
    /// Borrowed from the data array when present, computed from positions
    /// otherwise.
    pub fn row_data(&self, row: usize) -> Cow<'_, [I]> {
        let range = self.row_range(row);
        match &self.data {
            Some(data) => Cow::Borrowed(&data[range]),
            None => Cow::Owned(range.map(I::from_usize).collect()),
        }
    }

    /// Whether the column indices of each row are in ascending order
    ///
    /// Scans the arrays; the `sorted` flag is not consulted.
    pub fn is_sorted(&self) -> bool {
        (0..self.num_rows).all(|row| {
            self.row_column_indices(row)
                .windows(2)
                .all(|w| w[0] <= w[1])
        })
    }

    /// Get the data and the row, col indices of every matched entry
    ///
    /// Every stored entry matching a query pair is returned, so a pair that
    /// hits duplicate entries contributes several outputs, and a pair with
    /// no entry contributes none. The query pairs themselves must not repeat.
    ///
    /// # Returns
    ///
    /// Three arrays `(rows, cols, data)`.
    pub fn get_data_and_indices(&self, rows: &[I], cols: &[I]) -> (IdArray<I>, IdArray<I>, IdArray<I>) {
        let len = broadcast_len(rows.len(), cols.len());
        let query = |i: usize| (broadcast_get(rows, i), broadcast_get(cols, i));

        let (_, triples) = scatter_with_offsets(
            len,
            len >= PARALLEL_QUERY_THRESHOLD,
            |i| {
                let (row, col) = query(i);
                self.matches(row.as_usize(), col).count()
            },
            |i, out: &mut [(I, I, I)]| {
                let (row, col) = query(i);
                for (slot, pos) in out.iter_mut().zip(self.matches(row.as_usize(), col)) {
                    *slot = (row, col, self.entry_id(pos));
                }
            },
        );

        let device = self.device();
        let (out_rows, (out_cols, out_data)): (Vec<I>, (Vec<I>, Vec<I>)) =
            triples.into_iter().map(|(r, c, d)| (r, (c, d))).unzip();
        (
            IdArray::on_device(out_rows, device),
            IdArray::on_device(out_cols, device),
            IdArray::on_device(out_data, device),
        )
    }

    /// All entry IDs stored at (row, col)
    pub fn get_all_data(&self, row: usize, col: usize) -> Vec<I> {
        self.matches(row, I::from_usize(col))
            .map(|pos| self.entry_id(pos))
            .collect()
    }

    /// Get the data for each (row, col) pair
    ///
    /// Query pairs may repeat. A pair with no stored entry yields -1. When
    /// the matrix holds several entries for a pair, the one at the smallest
    /// position within the row is reported.
    pub fn get_data(&self, rows: &[I], cols: &[I]) -> IdArray<I> {
        let len = broadcast_len(rows.len(), cols.len());
        let missing = -I::one();
        let data = map_tasks(len, len >= PARALLEL_QUERY_THRESHOLD, |i| {
            let row = broadcast_get(rows, i).as_usize();
            self.matches(row, broadcast_get(cols, i))
                .next()
                .map_or(missing, |pos| self.entry_id(pos))
        });
        IdArray::on_device(data, self.device())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(sorted: bool) -> CsrMatrix<i64> {
        // row 0: cols 0, 1, 1 (duplicate)
        // row 1: col 2
        // row 2: empty
        CsrMatrix::new(
            3,
            3,
            vec![0, 3, 4, 4],
            vec![0, 1, 1, 2],
            Some(IdArray::new(vec![10, 11, 12, 13])),
            sorted,
        )
    }

    #[test]
    fn test_is_nonzero() {
        for sorted in [false, true] {
            let csr = example(sorted);
            assert!(csr.is_nonzero(0, 1));
            assert!(csr.is_nonzero(1, 2));
            assert!(!csr.is_nonzero(1, 0));
            assert!(!csr.is_nonzero(2, 2));
        }
    }

    #[test]
    fn test_is_nonzero_batch_broadcast() {
        let csr = example(false);
        assert_eq!(csr.is_nonzero_batch(&[0], &[0, 1, 2]), vec![true, true, false]);
        assert_eq!(csr.is_nonzero_batch(&[0, 1, 2], &[2]), vec![false, true, false]);
        assert_eq!(csr.is_nonzero_batch(&[0, 1], &[1, 2]), vec![true, true]);
    }

    #[test]
    fn test_row_nnz() {
        let csr = example(false);
        assert_eq!(csr.row_nnz(0), 3);
        assert_eq!(csr.row_nnz(2), 0);
        assert_eq!(csr.row_nnz_batch(&[2, 0, 1]).as_slice(), &[0, 3, 1]);
    }

    #[test]
    fn test_row_slices() {
        let csr = example(false);
        assert_eq!(csr.row_column_indices(0), &[0, 1, 1]);
        assert_eq!(csr.row_data(1).as_ref(), &[13]);

        let no_data = CsrMatrix::<i32>::new(2, 2, vec![0, 1, 2], vec![1, 0], None, false);
        assert_eq!(no_data.row_data(1).as_ref(), &[1]);
        assert!(!no_data.has_data());
    }

    #[test]
    fn test_is_sorted() {
        assert!(example(false).is_sorted());
        let unsorted = CsrMatrix::<i64>::new(1, 3, vec![0, 2], vec![2, 0], None, false);
        assert!(!unsorted.is_sorted());
    }

    #[test]
    fn test_get_data_and_indices() {
        let csr = example(true);
        let (rows, cols, data) = csr.get_data_and_indices(&[0, 1, 2], &[1, 0, 1]);
        assert_eq!(rows.as_slice(), &[0, 0]);
        assert_eq!(cols.as_slice(), &[1, 1]);
        assert_eq!(data.as_slice(), &[11, 12]);

        assert_eq!(csr.get_all_data(0, 1), vec![11, 12]);
        assert!(csr.get_all_data(2, 0).is_empty());
    }

    #[test]
    fn test_get_data_sentinel_and_first_match() {
        let csr = example(false);
        let data = csr.get_data(&[0, 0, 1, 0], &[1, 2, 2, 1]);
        assert_eq!(data.as_slice(), &[11, -1, 13, 11]);
    }

    #[test]
    fn test_get_data_broadcast() {
        for sorted in [false, true] {
            let csr = example(sorted);
            assert_eq!(csr.get_data(&[0], &[0, 1, 2]).as_slice(), &[10, 11, -1]);
            assert_eq!(csr.get_data(&[0, 1, 2], &[2]).as_slice(), &[-1, 13, -1]);
        }
    }

    #[test]
    fn test_get_data_and_indices_broadcast() {
        for sorted in [false, true] {
            let csr = example(sorted);

            // A single row against several columns, one of them duplicated
            let (rows, cols, data) = csr.get_data_and_indices(&[0], &[1, 2, 0]);
            assert_eq!(rows.as_slice(), &[0, 0, 0]);
            assert_eq!(cols.as_slice(), &[1, 1, 0]);
            assert_eq!(data.as_slice(), &[11, 12, 10]);

            // Several rows against a single column
            let (rows, cols, data) = csr.get_data_and_indices(&[0, 1, 2], &[1]);
            assert_eq!(rows.as_slice(), &[0, 0]);
            assert_eq!(cols.as_slice(), &[1, 1]);
            assert_eq!(data.as_slice(), &[11, 12]);
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_query_row_out_of_bounds() {
        example(false).is_nonzero(3, 0);
    }
}
