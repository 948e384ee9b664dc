//! Host interchange envelope shared by every sparse layout
//!
//! A [`SparseMatrix`] carries a format tag, the shape, the layout's index
//! buffers in a fixed order and its boolean flags. For CSR the buffers are
//! `[indptr, indices, data]` and the flags are `[sorted]`.

use std::convert::TryFrom;

use crate::error::{CsrError, Result};
use crate::matrix::array::{AnyIdArray, IdArray, IdType};
use crate::matrix::CsrMatrix;

/// Sparse layouts known to the interchange envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate triples
    Coo,
    /// Compressed sparse rows
    Csr,
    /// Compressed sparse columns
    Csc,
}

impl SparseFormat {
    /// Integer code of the format tag
    pub fn code(&self) -> i32 {
        match self {
            SparseFormat::Coo => 1,
            SparseFormat::Csr => 2,
            SparseFormat::Csc => 3,
        }
    }

    /// Recover a format tag from its code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(SparseFormat::Coo),
            2 => Some(SparseFormat::Csr),
            3 => Some(SparseFormat::Csc),
            _ => None,
        }
    }
}

/// A dtype-erased sparse matrix handed across the host boundary
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    /// Layout of the buffers
    pub format: SparseFormat,
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Index buffers in layout order, `None` for an absent optional buffer
    pub indices: Vec<Option<AnyIdArray>>,
    /// Layout flags in layout order
    pub flags: Vec<bool>,
}

impl<I: IdType> CsrMatrix<I> {
    /// Wrap this matrix in the interchange envelope
    pub fn to_sparse_matrix(&self) -> SparseMatrix {
        SparseMatrix {
            format: SparseFormat::Csr,
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            indices: vec![
                Some(I::into_any(self.indptr.clone())),
                Some(I::into_any(self.indices.clone())),
                self.data.clone().map(I::into_any),
            ],
            flags: vec![self.sorted],
        }
    }
}

impl<I: IdType> TryFrom<&SparseMatrix> for CsrMatrix<I> {
    type Error = CsrError;

    fn try_from(spmat: &SparseMatrix) -> Result<Self> {
        match spmat.format {
            SparseFormat::Csr => {}
            other => {
                return Err(CsrError::UnsupportedFormat(format!(
                    "expected Csr, got {:?}",
                    other
                )))
            }
        }
        if spmat.indices.len() != 3 || spmat.flags.len() != 1 {
            return Err(CsrError::invalid_format(format!(
                "CSR envelope needs 3 buffers and 1 flag, got {} and {}",
                spmat.indices.len(),
                spmat.flags.len()
            )));
        }

        let typed = |slot: &Option<AnyIdArray>, name: &'static str| -> Result<Option<IdArray<I>>> {
            match slot {
                None => Ok(None),
                Some(any) => I::from_any(any).map(Some).ok_or(CsrError::DTypeMismatch {
                    expected: I::DTYPE,
                    got: any.dtype(),
                    array: name,
                }),
            }
        };

        let indptr = typed(&spmat.indices[0], "indptr")?
            .ok_or_else(|| CsrError::invalid_format("CSR envelope is missing indptr"))?;
        let indices = typed(&spmat.indices[1], "indices")?
            .ok_or_else(|| CsrError::invalid_format("CSR envelope is missing indices"))?;
        let data = typed(&spmat.indices[2], "data")?;

        CsrMatrix::try_new(
            spmat.num_rows,
            spmat.num_cols,
            indptr,
            indices,
            data,
            spmat.flags[0],
        )
    }
}

impl<I: IdType> TryFrom<SparseMatrix> for CsrMatrix<I> {
    type Error = CsrError;

    fn try_from(spmat: SparseMatrix) -> Result<Self> {
        Self::try_from(&spmat)
    }
}
