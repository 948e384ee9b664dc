//! Coordinate (COO) matrix produced at the CSR boundary
//!
//! Only the fields and checks needed to hand results of CSR routines to
//! callers live here.

use crate::matrix::array::{Device, IdArray, IdType};

/// A sparse matrix stored as explicit (row, col[, data]) triples
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix<I: IdType> {
    /// Number of rows in the matrix
    pub num_rows: usize,

    /// Number of columns in the matrix
    pub num_cols: usize,

    /// Row index of every entry
    pub row: IdArray<I>,

    /// Column index of every entry
    pub col: IdArray<I>,

    /// Entry IDs, `None` when they are the identity range
    pub data: Option<IdArray<I>>,

    /// Whether entries are ordered by row
    pub row_sorted: bool,

    /// Whether entries are ordered by column within each row
    pub col_sorted: bool,
}

impl<I: IdType> CooMatrix<I> {
    /// Creates a new COO matrix
    ///
    /// # Panics
    ///
    /// Panics if the triple arrays have different lengths or live on
    /// different devices.
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        row: IdArray<I>,
        col: IdArray<I>,
        data: Option<IdArray<I>>,
        row_sorted: bool,
        col_sorted: bool,
    ) -> Self {
        assert_eq!(row.len(), col.len(), "row.len() must equal col.len()");
        assert_eq!(row.device(), col.device(), "row and col must share a device");
        if let Some(data) = &data {
            assert_eq!(data.len(), row.len(), "data.len() must equal row.len()");
            assert_eq!(data.device(), row.device(), "data and row must share a device");
        }

        Self {
            num_rows,
            num_cols,
            row,
            col,
            data,
            row_sorted,
            col_sorted,
        }
    }

    /// Returns the number of stored entries
    pub fn nnz(&self) -> usize {
        self.row.len()
    }

    /// Whether an explicit data array is present
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Device on which the arrays live
    pub fn device(&self) -> Device {
        self.row.device()
    }

    /// Iterate over `(row, col, entry_id)` triples
    pub fn triples(&self) -> impl Iterator<Item = (I, I, I)> + '_ {
        (0..self.nnz()).map(move |i| {
            let eid = match &self.data {
                Some(data) => data[i],
                None => I::from_usize(i),
            };
            (self.row[i], self.col[i], eid)
        })
    }
}
