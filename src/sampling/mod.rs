//! Per-row selection of entries
//!
//! Both routines pick entries from each requested row independently and
//! return the picks as a COO matrix whose rows repeat the requesting row ID.
//! Output sizes are data dependent, so both run through the two-phase
//! scatter in [`crate::parallel`].

pub mod rowwise;
pub mod topk;

pub use rowwise::row_wise_sampling;
pub use topk::row_wise_topk;

use crate::matrix::{CooMatrix, CsrMatrix, IdArray, IdType};

/// Weight of the entry with ID `eid`
///
/// Panics if `weights` does not cover `eid`.
#[inline]
pub(crate) fn weight_of<W: Into<f64> + Copy>(weights: &[W], eid: usize) -> f64 {
    match weights.get(eid) {
        Some(&w) => w.into(),
        None => panic!(
            "weight slice has {} entries but entry ID {} needs a weight",
            weights.len(),
            eid
        ),
    }
}

/// Assemble picked `(row, col, entry_id)` triples into a COO matrix
pub(crate) fn picks_to_coo<I: IdType>(mat: &CsrMatrix<I>, picks: Vec<(I, I, I)>) -> CooMatrix<I> {
    let device = mat.device();
    let (rows, (cols, data)): (Vec<I>, (Vec<I>, Vec<I>)) =
        picks.into_iter().map(|(r, c, d)| (r, (c, d))).unzip();

    CooMatrix::new(
        mat.num_rows,
        mat.num_cols,
        IdArray::on_device(rows, device),
        IdArray::on_device(cols, device),
        Some(IdArray::on_device(data, device)),
        false,
        false,
    )
}
