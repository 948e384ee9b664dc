//! Row-wise top-k selection by weight

use tracing::{debug, instrument};

use crate::matrix::{CooMatrix, CsrConfig, CsrMatrix, IdType};
use crate::parallel::scatter_with_offsets;
use crate::sampling::{picks_to_coo, weight_of};

/// Select the K entries with the largest weights along each given row
///
/// Rows with fewer than `k` entries give all of them. With `ascending` set
/// the K smallest weights are selected instead. Ties are broken by position
/// within the row (earlier entries win), and each row's picks are emitted in
/// rank order. An empty `weight` treats all entries as tied, which selects
/// the first `k` entries of every row.
///
/// `weight` is indexed by entry ID, like the probabilities of
/// [`crate::row_wise_sampling`].
///
/// Examples:
///
/// ```
/// use csrgraph::{row_wise_topk, CsrConfig, CsrMatrix, IdArray};
///
/// let csr = CsrMatrix::<i64>::new(
///     4, 4,
///     vec![0, 2, 3, 3, 5],
///     vec![0, 1, 1, 2, 3],
///     Some(IdArray::new(vec![2, 3, 0, 1, 4])),
///     true,
/// );
/// let weight = [1.0f32, 0.0, -1.0, 10.0, 20.0];
/// let picked = row_wise_topk(&csr, &[0, 1, 3], 1, &weight, false, &CsrConfig::default());
///
/// assert_eq!(picked.row.as_slice(), &[0, 1, 3]);
/// assert_eq!(picked.col.as_slice(), &[1, 1, 3]);
/// assert_eq!(picked.data.unwrap().as_slice(), &[3, 0, 4]);
/// ```
///
/// # Returns
///
/// A COO matrix holding the picked rows and columns. Its data field holds
/// the entry ID of each pick, i.e. its index into `weight`.
///
/// # Panics
///
/// Panics if a requested row is out of range, or if `weight` is non-empty
/// and does not cover every entry ID in the requested rows.
#[instrument(skip(mat, rows, weight, config), fields(num_rows = rows.len()))]
pub fn row_wise_topk<I, W>(
    mat: &CsrMatrix<I>,
    rows: &[I],
    k: usize,
    weight: &[W],
    ascending: bool,
    config: &CsrConfig,
) -> CooMatrix<I>
where
    I: IdType,
    W: Into<f64> + Copy + Send + Sync,
{
    let count = |i: usize| mat.row_nnz(rows[i].as_usize()).min(k);

    let fill = |i: usize, out: &mut [(I, I, I)]| {
        let row = rows[i];
        let mut positions: Vec<usize> = mat.row_range(row.as_usize()).collect();

        if !weight.is_empty() {
            let key = |pos: usize| weight_of(weight, mat.entry_id(pos).as_usize());
            // Stable: equal weights keep their within-row order
            if ascending {
                positions.sort_by(|&a, &b| key(a).total_cmp(&key(b)));
            } else {
                positions.sort_by(|&a, &b| key(b).total_cmp(&key(a)));
            }
        }

        for (slot, &pos) in out.iter_mut().zip(&positions) {
            *slot = (row, mat.indices[pos], mat.entry_id(pos));
        }
    };

    let parallel = config.use_parallel(rows.len());
    let (offsets, picks) = if parallel {
        config.install(|| scatter_with_offsets(rows.len(), true, count, fill))
    } else {
        scatter_with_offsets(rows.len(), false, count, fill)
    };
    debug!(picked = offsets[rows.len()], "row-wise top-k finished");

    picks_to_coo(mat, picks)
}
