//! Splitting a batched matrix back into its blocks

use tracing::{debug, instrument};

use crate::matrix::{CsrMatrix, IdArray, IdType};
use crate::parallel::map_tasks;

/// Split a block-diagonal matrix into `batch_size` matrices
///
/// The inverse of [`crate::disjoint_union_csr`]. The cumulative sums, each
/// of length `batch_size + 1` and starting at zero, give the boundaries of
/// every block: block `i` owns rows `src_vertex_cumsum[i]..src_vertex_cumsum[i + 1]`,
/// columns `dst_vertex_cumsum[i]..dst_vertex_cumsum[i + 1]` and entry IDs
/// `edge_cumsum[i]..edge_cumsum[i + 1]`. Each block is rebased so its rows,
/// columns and entry IDs start from zero.
///
/// # Panics
///
/// Panics if a cumulative sum has the wrong length, or if a block has
/// entries outside its column range or a different entry count than
/// `edge_cumsum` states.
#[instrument(
    skip(csr, edge_cumsum, src_vertex_cumsum, dst_vertex_cumsum),
    fields(nnz = csr.nnz())
)]
pub fn disjoint_partition_csr_by_sizes<I: IdType>(
    csr: &CsrMatrix<I>,
    batch_size: usize,
    edge_cumsum: &[I],
    src_vertex_cumsum: &[I],
    dst_vertex_cumsum: &[I],
) -> Vec<CsrMatrix<I>> {
    for (name, cumsum) in [
        ("edge_cumsum", edge_cumsum),
        ("src_vertex_cumsum", src_vertex_cumsum),
        ("dst_vertex_cumsum", dst_vertex_cumsum),
    ] {
        assert_eq!(
            cumsum.len(),
            batch_size + 1,
            "{} must have batch_size + 1 = {} entries",
            name,
            batch_size + 1
        );
    }
    assert_eq!(
        src_vertex_cumsum[batch_size].as_usize(),
        csr.num_rows,
        "src_vertex_cumsum must end at num_rows"
    );

    let blocks = map_tasks(batch_size, batch_size > 1, |i| {
        let block = csr.slice_rows(
            src_vertex_cumsum[i].as_usize(),
            src_vertex_cumsum[i + 1].as_usize(),
        );
        let (edge_lo, edge_hi) = (edge_cumsum[i], edge_cumsum[i + 1]);
        assert_eq!(
            block.nnz(),
            (edge_hi - edge_lo).as_usize(),
            "block {} holds {} entries but edge_cumsum expects {}",
            i,
            block.nnz(),
            edge_hi - edge_lo
        );

        let col_lo = dst_vertex_cumsum[i];
        let indices: Vec<I> = block.indices.iter().map(|&c| c - col_lo).collect();
        let data: Option<Vec<I>> = csr
            .data
            .as_ref()
            .map(|_| block.data_or_identity().iter().map(|&eid| eid - edge_lo).collect());

        let device = csr.device();
        CsrMatrix::new(
            block.num_rows,
            (dst_vertex_cumsum[i + 1] - col_lo).as_usize(),
            block.indptr,
            IdArray::on_device(indices, device),
            data.map(|d| IdArray::on_device(d, device)),
            block.sorted,
        )
    });
    debug!(n_blocks = blocks.len(), "partitioned matrix");

    blocks
}
