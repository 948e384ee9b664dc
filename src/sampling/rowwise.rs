//! Row-wise weighted sampling with or without replacement

use std::cmp::Ordering;
use std::ops::Range;

use rand::distributions::{Distribution, WeightedIndex};
use rand::{thread_rng, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::matrix::{CooMatrix, CsrConfig, CsrMatrix, IdType};
use crate::parallel::scatter_with_offsets;
use crate::sampling::{picks_to_coo, weight_of};

/// How many entries a row yields
///
/// `candidates` is the row degree for uniform sampling and the number of
/// positive-weight entries otherwise.
fn num_picks(candidates: usize, num_samples: usize, replace: bool) -> usize {
    if candidates == 0 {
        0
    } else if replace {
        num_samples
    } else {
        num_samples.min(candidates)
    }
}

/// Randomly select a fixed number of entries along each given row
///
/// Rows are sampled independently: row `i` of the request draws from its
/// own generator seeded with `seed + i`, so results depend only on the
/// inputs and the seed, never on scheduling.
///
/// - `prob` holds an unnormalized weight per entry ID (indexed by the data
///   array). An empty `prob` means uniform weights. Entries whose weight is
///   not positive are never picked, and a row without positive weights
///   yields nothing.
/// - Without replacement, a row with fewer candidates than `num_samples`
///   yields all of its candidates.
///
/// Examples:
///
/// ```
/// use csrgraph::{row_wise_sampling, CsrConfig, CsrMatrix, IdArray};
///
/// // indptr = [0, 2, 3, 3, 5], indices = [0, 1, 1, 2, 3], data = [2, 3, 0, 1, 4]
/// let csr = CsrMatrix::<i64>::new(
///     4, 4,
///     vec![0, 2, 3, 3, 5],
///     vec![0, 1, 1, 2, 3],
///     Some(IdArray::new(vec![2, 3, 0, 1, 4])),
///     true,
/// );
/// let config = CsrConfig::default().with_seed(42);
/// let sampled = row_wise_sampling(&csr, &[1, 3], 2, &[] as &[f32], false, &config);
///
/// // Row 1 only has one entry, row 3 gives both of its entries
/// assert_eq!(sampled.nnz(), 3);
/// assert_eq!(sampled.row.as_slice(), &[1, 3, 3]);
/// ```
///
/// # Returns
///
/// A COO matrix with the shape of `mat` holding the picked rows, columns
/// and entry IDs.
///
/// # Panics
///
/// Panics if a requested row is out of range or a weight is infinite. A
/// non-empty `prob` must have more elements than the largest entry ID in
/// the requested rows.
#[instrument(skip(mat, rows, prob, config), fields(num_rows = rows.len()))]
pub fn row_wise_sampling<I, W>(
    mat: &CsrMatrix<I>,
    rows: &[I],
    num_samples: usize,
    prob: &[W],
    replace: bool,
    config: &CsrConfig,
) -> CooMatrix<I>
where
    I: IdType,
    W: Into<f64> + Copy + Send + Sync,
{
    let seed = config.seed.unwrap_or_else(|| thread_rng().gen());
    let uniform = prob.is_empty();

    let positive = |range: Range<usize>| -> Vec<usize> {
        range
            .filter(|&pos| weight_of(prob, mat.entry_id(pos).as_usize()) > 0.0)
            .collect()
    };

    let count = |i: usize| {
        let range = mat.row_range(rows[i].as_usize());
        let candidates = if uniform {
            range.len()
        } else {
            positive(range).len()
        };
        num_picks(candidates, num_samples, replace)
    };

    let fill = |i: usize, out: &mut [(I, I, I)]| {
        if out.is_empty() {
            return;
        }
        let row = rows[i];
        let range = mat.row_range(row.as_usize());
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));

        let picked: Vec<usize> = if uniform {
            pick_uniform(range, out.len(), replace, &mut rng)
        } else {
            let candidates = positive(range);
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&pos| weight_of(prob, mat.entry_id(pos).as_usize()))
                .collect();
            pick_weighted(&candidates, &weights, out.len(), replace, &mut rng)
        };

        for (slot, pos) in out.iter_mut().zip(picked) {
            *slot = (row, mat.indices[pos], mat.entry_id(pos));
        }
    };

    let parallel = config.use_parallel(rows.len());
    let (offsets, picks) = if parallel {
        config.install(|| scatter_with_offsets(rows.len(), true, count, fill))
    } else {
        scatter_with_offsets(rows.len(), false, count, fill)
    };
    debug!(picked = offsets[rows.len()], "row-wise sampling finished");

    picks_to_coo(mat, picks)
}

/// Pick `amount` positions of `range` with equal probability
fn pick_uniform<R: Rng>(range: Range<usize>, amount: usize, replace: bool, rng: &mut R) -> Vec<usize> {
    let degree = range.len();
    if replace {
        (0..amount)
            .map(|_| range.start + rng.gen_range(0..degree))
            .collect()
    } else if amount >= degree {
        range.collect()
    } else {
        rand::seq::index::sample(rng, degree, amount)
            .into_iter()
            .map(|k| range.start + k)
            .collect()
    }
}

/// Pick `amount` of `candidates` with probability proportional to `weights`
fn pick_weighted<R: Rng>(
    candidates: &[usize],
    weights: &[f64],
    amount: usize,
    replace: bool,
    rng: &mut R,
) -> Vec<usize> {
    if replace {
        let dist = match WeightedIndex::new(weights) {
            Ok(dist) => dist,
            Err(err) => panic!("Invalid sampling weights: {err}"),
        };
        return (0..amount).map(|_| candidates[dist.sample(rng)]).collect();
    }
    if amount >= candidates.len() {
        return candidates.to_vec();
    }

    // Weighted sampling without replacement (Efraimidis-Spirakis):
    // keep the `amount` largest keys ln(u) / w.
    let mut keyed: Vec<(f64, usize)> = candidates
        .iter()
        .zip(weights)
        .map(|(&pos, &w)| {
            assert!(w.is_finite(), "Invalid sampling weight {w}");
            let u: f64 = rng.gen();
            (u.ln() / w, pos)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    keyed.truncate(amount);
    keyed.into_iter().map(|(_, pos)| pos).collect()
}
