//! # Two-phase parallel scatter
//!
//! Per-row routines whose output length depends on the data (lookup with
//! omission, sampling, top-k) run in two passes: the first computes how
//! many outputs every task produces, an exclusive scan turns those counts
//! into offsets, and the second pass lets every task write into its own
//! pre-assigned slice of the output. Tasks never share output memory, so the
//! second pass parallelizes with Rayon without synchronization.

use rayon::prelude::*;

use crate::utils::exclusive_scan;

/// Runs `count` then `fill` for each of `n_tasks` tasks
///
/// `count(i)` must return exactly the number of elements `fill(i, out)`
/// writes; `out` is the task's slice of the combined output.
///
/// # Returns
///
/// The offsets (length `n_tasks + 1`) and the combined output.
pub fn scatter_with_offsets<T, C, F>(
    n_tasks: usize,
    parallel: bool,
    count: C,
    fill: F,
) -> (Vec<usize>, Vec<T>)
where
    T: Copy + Default + Send + Sync,
    C: Fn(usize) -> usize + Sync + Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    // 1. Count outputs per task
    let counts: Vec<usize> = if parallel {
        (0..n_tasks).into_par_iter().map(&count).collect()
    } else {
        (0..n_tasks).map(&count).collect()
    };

    // 2. Prefix sum gives every task its output range
    let offsets = exclusive_scan(&counts);
    let mut output = vec![T::default(); offsets[n_tasks]];

    // 3. Carve the output into disjoint per-task slices
    let mut chunks: Vec<&mut [T]> = Vec::with_capacity(n_tasks);
    let mut rest: &mut [T] = &mut output;
    for &len in &counts {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
        chunks.push(head);
        rest = tail;
    }

    // 4. Fill each slice independently
    if parallel {
        chunks
            .into_par_iter()
            .enumerate()
            .for_each(|(i, chunk)| fill(i, chunk));
    } else {
        for (i, chunk) in chunks.into_iter().enumerate() {
            fill(i, chunk);
        }
    }

    (offsets, output)
}

/// Maps every task to one output value, on Rayon when `parallel` is set
pub fn map_tasks<T, F>(n_tasks: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..n_tasks).into_par_iter().map(f).collect()
    } else {
        (0..n_tasks).map(f).collect()
    }
}
