//! Utilities for converting between our CSR matrix and the sprs crate
//!
//! sprs matrices hold numeric values and forbid duplicate entries, so only
//! simple graphs cross this boundary. The sprs value of an entry is its
//! entry ID.

use sprs::CsMat;

use crate::error::{CsrError, Result};
use crate::matrix::{CsrMatrix, IdArray, IdType};

/// Converts a CSR matrix to sprs CsMat format
///
/// Rows are sorted first; the stored values are the entry IDs.
///
/// # Errors
///
/// Returns `InvalidFormat` if the matrix holds duplicate (row, col) entries.
pub fn to_sprs_csr<I: IdType>(matrix: &CsrMatrix<I>) -> Result<CsMat<I>> {
    let sorted = matrix.sort();
    if sorted.has_duplicate() {
        return Err(CsrError::invalid_format(
            "sprs matrices cannot hold duplicate entries",
        ));
    }

    Ok(CsMat::new(
        (sorted.num_rows, sorted.num_cols),
        sorted.indptr.iter().map(|&p| p.as_usize()).collect(),
        sorted.indices.iter().map(|&c| c.as_usize()).collect(),
        sorted.data_or_identity().to_vec(),
    ))
}

/// Converts sprs CsMat in CSR format to our CsrMatrix format
///
/// The sprs values become the entry IDs of the result.
pub fn from_sprs_csr<I: IdType>(matrix: CsMat<I>) -> Result<CsrMatrix<I>> {
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let shape = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    CsrMatrix::try_new(
        shape.0,
        shape.1,
        IdArray::from_usizes(&indptr),
        IdArray::from_usizes(&indices),
        Some(IdArray::new(data)),
        true,
    )
}
