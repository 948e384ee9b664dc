//! Compressed Sparse Row (CSR) matrix format implementation

use std::fmt;
use std::ops::Range;

use crate::error::{CsrError, Result};
use crate::matrix::array::{DataType, Device, IdArray, IdType};

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - indptr: Array of size num_rows + 1 containing offsets into indices and data
/// - indices: Array of size nnz containing the column index of every entry
/// - data: Optional array of size nnz holding an entry ID (for example an edge ID)
///
/// Column indices are 0-based and need not be sorted within a row unless
/// `sorted` is set. Duplicate (row, col) entries are allowed, which is how
/// multigraphs are represented. A missing `data` array means the entry IDs
/// are `0..nnz`.
#[derive(Clone)]
pub struct CsrMatrix<I: IdType> {
    /// Number of rows in the matrix
    pub num_rows: usize,

    /// Number of columns in the matrix
    pub num_cols: usize,

    /// Row pointers (size: num_rows + 1)
    /// indptr[i] is the position in indices and data where row i starts
    /// indptr[num_rows] is equal to nnz
    pub indptr: IdArray<I>,

    /// Column indices (size: nnz)
    pub indices: IdArray<I>,

    /// Entry IDs (size: nnz), `None` when they are the identity range
    pub data: Option<IdArray<I>>,

    /// Whether the column indices of every row are in ascending order
    pub sorted: bool,
}

impl<I: IdType> CsrMatrix<I> {
    /// Creates a new CSR matrix, validating the arrays against the shape
    ///
    /// # Panics
    ///
    /// Panics if the arrays violate any matrix invariant. Use
    /// [`CsrMatrix::try_new`] to inspect the failure instead.
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        indptr: impl Into<IdArray<I>>,
        indices: impl Into<IdArray<I>>,
        data: Option<IdArray<I>>,
        sorted: bool,
    ) -> Self {
        match Self::try_new(num_rows, num_cols, indptr, indices, data, sorted) {
            Ok(csr) => csr,
            Err(err) => panic!("Invalid CSR matrix: {err}"),
        }
    }

    /// Creates a new CSR matrix, returning the first violated invariant
    ///
    /// # Errors
    ///
    /// - arrays on different devices
    /// - `I` cannot represent `num_rows` or `num_cols`
    /// - `indptr.len() != num_rows + 1`, or `indptr` is not a prefix sum ending at nnz
    /// - `data` present with a length other than nnz
    /// - a column index outside `[0, num_cols)`
    pub fn try_new(
        num_rows: usize,
        num_cols: usize,
        indptr: impl Into<IdArray<I>>,
        indices: impl Into<IdArray<I>>,
        data: Option<IdArray<I>>,
        sorted: bool,
    ) -> Result<Self> {
        let csr = Self {
            num_rows,
            num_cols,
            indptr: indptr.into(),
            indices: indices.into(),
            data,
            sorted,
        };
        csr.check_validity()?;
        Ok(csr)
    }

    /// Builds a matrix whose arrays are correct by construction
    ///
    /// Used by the transforms in this crate, which only produce valid
    /// layouts; debug builds still run the full check.
    pub(crate) fn from_parts(
        num_rows: usize,
        num_cols: usize,
        indptr: IdArray<I>,
        indices: IdArray<I>,
        data: Option<IdArray<I>>,
        sorted: bool,
    ) -> Self {
        let csr = Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            data,
            sorted,
        };
        debug_assert!(
            csr.check_validity().is_ok(),
            "transform produced an invalid CSR matrix: {:?}",
            csr.check_validity().err()
        );
        csr
    }

    /// Verifies every structural invariant of the matrix
    pub fn check_validity(&self) -> Result<()> {
        let device = self.indptr.device();
        if self.indices.device() != device {
            return Err(CsrError::DeviceMismatch {
                expected: device,
                got: self.indices.device(),
                array: "indices",
            });
        }
        if let Some(data) = &self.data {
            if data.device() != device {
                return Err(CsrError::DeviceMismatch {
                    expected: device,
                    got: data.device(),
                    array: "data",
                });
            }
        }

        let max_dim = self.num_rows.max(self.num_cols);
        if max_dim as u64 > I::DTYPE.max_value() as u64 {
            return Err(CsrError::Overflow {
                dtype: I::DTYPE,
                value: max_dim,
            });
        }

        if self.indptr.len() != self.num_rows + 1 {
            return Err(CsrError::InvalidIndptrLength {
                expected: self.num_rows + 1,
                got: self.indptr.len(),
            });
        }
        if self.indptr[0] != I::zero() {
            return Err(CsrError::invalid_indptr(format!(
                "indptr[0] must be 0, got {}",
                self.indptr[0]
            )));
        }
        if let Some(row) = self.indptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(CsrError::invalid_indptr(format!(
                "indptr decreases at row {row}"
            )));
        }
        let nnz = self.indptr[self.num_rows].as_usize();
        if nnz != self.indices.len() {
            return Err(CsrError::LengthMismatch {
                expected: nnz,
                got: self.indices.len(),
                context: "indices",
            });
        }
        if let Some(data) = &self.data {
            if data.len() != nnz {
                return Err(CsrError::LengthMismatch {
                    expected: nnz,
                    got: data.len(),
                    context: "data",
                });
            }
        }

        // Check that column indices are within bounds
        let num_cols = I::from_usize(self.num_cols);
        if let Some(&col) = self
            .indices
            .iter()
            .find(|&&col| col < I::zero() || col >= num_cols)
        {
            return Err(CsrError::IndexOutOfBounds {
                index: col.as_i64(),
                bound: self.num_cols,
            });
        }

        Ok(())
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self::new(
            num_rows,
            num_cols,
            vec![I::zero(); num_rows + 1],
            Vec::new(),
            None,
            true,
        )
    }

    /// Creates an identity pattern of the given size, one entry per row
    pub fn identity(n: usize) -> Self {
        Self::new(
            n,
            n,
            IdArray::range(n + 1, Device::Cpu),
            IdArray::range(n, Device::Cpu),
            None,
            true,
        )
    }

    /// Returns the number of stored entries in the matrix
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Whether an explicit data array is present
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Device on which the index arrays live
    pub fn device(&self) -> Device {
        self.indptr.device()
    }

    /// Element type of the index arrays
    pub fn dtype(&self) -> DataType {
        I::DTYPE
    }

    /// Positions in `indices`/`data` belonging to `row`
    #[inline]
    pub fn row_range(&self, row: usize) -> Range<usize> {
        assert!(
            row < self.num_rows,
            "Row index {} out of bounds (num_rows = {})",
            row,
            self.num_rows
        );
        self.indptr[row].as_usize()..self.indptr[row + 1].as_usize()
    }

    /// Entry ID stored at `pos`, falling back to the position itself
    #[inline]
    pub fn entry_id(&self, pos: usize) -> I {
        match &self.data {
            Some(data) => data[pos],
            None => I::from_usize(pos),
        }
    }

    /// The data array, materializing the identity range when absent
    pub fn data_or_identity(&self) -> IdArray<I> {
        match &self.data {
            Some(data) => data.clone(),
            None => IdArray::range(self.nnz(), self.device()),
        }
    }

    /// Returns an iterator over the entries of row `row`
    ///
    /// Each item is a tuple `(col, entry_id)`.
    pub fn row_iter(&self, row: usize) -> impl Iterator<Item = (I, I)> + '_ {
        self.row_range(row)
            .map(move |pos| (self.indices[pos], self.entry_id(pos)))
    }

    /// Return a copy of this matrix on the given device
    ///
    /// When the matrix already lives on `device` the arrays are shared, not
    /// copied.
    pub fn copy_to(&self, device: Device) -> Self {
        if device == self.device() {
            return self.clone();
        }
        Self {
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            indptr: self.indptr.copy_to(device),
            indices: self.indices.copy_to(device),
            data: self.data.as_ref().map(|d| d.copy_to(device)),
            sorted: self.sorted,
        }
    }

    /// Structural equality: same shape, arrays and entry IDs, ignoring the sorted flag
    pub fn same_structure(&self, other: &Self) -> bool {
        self.num_rows == other.num_rows
            && self.num_cols == other.num_cols
            && self.indptr.as_slice() == other.indptr.as_slice()
            && self.indices.as_slice() == other.indices.as_slice()
            && self.data_or_identity().as_slice() == other.data_or_identity().as_slice()
    }
}

impl<I: IdType> PartialEq for CsrMatrix<I> {
    fn eq(&self, other: &Self) -> bool {
        self.num_rows == other.num_rows
            && self.num_cols == other.num_cols
            && self.indptr == other.indptr
            && self.indices == other.indices
            && self.data == other.data
            && self.sorted == other.sorted
    }
}

impl<I: IdType> fmt::Debug for CsrMatrix<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CsrMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.num_rows, self.num_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;
        writeln!(f, "  dtype: {:?}, device: {:?}", I::DTYPE, self.device())?;
        writeln!(f, "  has_data: {}, sorted: {}", self.has_data(), self.sorted)?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.num_rows);

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for row in 0..max_rows_to_print {
                write!(f, "    row {}: ", row)?;
                let range = self.row_range(row);

                if range.is_empty() {
                    writeln!(f, "(empty)")?;
                } else {
                    let len = range.len();
                    let max_elements = 5.min(len);

                    for (col, eid) in self.row_iter(row).take(max_elements) {
                        write!(f, "({}, #{}) ", col, eid)?;
                    }

                    if len > max_elements {
                        write!(f, "... ({} more)", len - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.num_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.num_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> CsrMatrix<i64> {
        CsrMatrix::new(4, 4, vec![0, 2, 3, 3, 5], vec![1, 0, 2, 3, 1], None, false)
    }

    #[test]
    fn test_new_matrix() {
        let matrix = example();

        assert_eq!(matrix.num_rows, 4);
        assert_eq!(matrix.num_cols, 4);
        assert_eq!(matrix.nnz(), 5);
        assert!(!matrix.has_data());
        assert_eq!(matrix.data_or_identity().as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_row_iter() {
        let matrix = CsrMatrix::<i32>::new(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 1, 1, 0, 2],
            Some(IdArray::new(vec![10, 11, 12, 13, 14])),
            false,
        );

        let row0: Vec<_> = matrix.row_iter(0).collect();
        assert_eq!(row0, vec![(0, 10), (1, 11)]);

        let row2: Vec<_> = matrix.row_iter(2).collect();
        assert_eq!(row2, vec![(0, 13), (2, 14)]);
    }

    #[test]
    fn test_identity() {
        let identity = CsrMatrix::<i32>::identity(3);

        assert_eq!(identity.nnz(), 3);
        assert_eq!(identity.indptr.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(identity.indices.as_slice(), &[0, 1, 2]);
        assert!(identity.sorted);
    }

    #[test]
    #[should_panic(expected = "indptr length must be num_rows + 1")]
    fn test_invalid_indptr_length() {
        CsrMatrix::<i64>::new(3, 3, vec![0, 2, 3], vec![0, 1, 1], None, false);
    }

    #[test]
    fn test_validity_errors() {
        let err = CsrMatrix::<i64>::try_new(2, 2, vec![0, 2, 1], vec![0], None, false);
        assert!(matches!(err, Err(CsrError::InvalidIndptr(_))));

        let err = CsrMatrix::<i64>::try_new(1, 2, vec![0, 2], vec![0, 5], None, false);
        assert!(matches!(
            err,
            Err(CsrError::IndexOutOfBounds { index: 5, bound: 2 })
        ));

        let err = CsrMatrix::<i64>::try_new(
            1,
            2,
            vec![0, 2],
            vec![0, 1],
            Some(IdArray::new(vec![0])),
            false,
        );
        assert!(matches!(err, Err(CsrError::LengthMismatch { context: "data", .. })));
    }

    #[test]
    fn test_overflow_detected() {
        let rows = i32::MAX as usize + 1;
        let err = CsrMatrix::<i32>::try_new(0, rows, vec![0], vec![], None, false);
        assert!(matches!(err, Err(CsrError::Overflow { .. })));
    }

    #[test]
    fn test_device_mismatch() {
        let err = CsrMatrix::<i64>::try_new(
            1,
            1,
            IdArray::new(vec![0, 1]),
            IdArray::on_device(vec![0], Device::Cuda(0)),
            None,
            false,
        );
        assert!(matches!(err, Err(CsrError::DeviceMismatch { array: "indices", .. })));
    }

    #[test]
    fn test_copy_to() {
        let matrix = example();
        let same = matrix.copy_to(Device::Cpu);
        assert!(same.indices.shares_buffer(&matrix.indices));

        let moved = matrix.copy_to(Device::Cuda(1));
        assert_eq!(moved.device(), Device::Cuda(1));
        assert!(!moved.indices.shares_buffer(&matrix.indices));
        assert!(moved.same_structure(&matrix));
    }

    #[test]
    fn test_debug_output() {
        let text = format!("{:?}", example());
        assert!(text.contains("dimensions: 4 × 4"));
        assert!(text.contains("row 2: (empty)"));
    }
}
