//! Utility functions and helpers

pub mod formats;

pub use formats::{from_sprs_csr, to_sprs_csr};

/// Computes an exclusive prefix sum (scan) for a vector
///
/// The result has one more element than the input; its last element is the
/// total.
pub fn exclusive_scan(input: &[usize]) -> Vec<usize> {
    let mut result = Vec::with_capacity(input.len() + 1);
    let mut sum = 0;

    result.push(0); // First element is always 0

    for &val in input {
        sum += val;
        result.push(sum);
    }

    result
}

/// Output length of a batched operation over two broadcastable sequences
///
/// # Panics
///
/// Panics unless the lengths are equal or one of them is 1.
pub fn broadcast_len(lhs: usize, rhs: usize) -> usize {
    assert!(
        lhs == rhs || lhs == 1 || rhs == 1,
        "Cannot broadcast sequences of length {} and {}",
        lhs,
        rhs
    );
    if lhs == 1 {
        rhs
    } else {
        lhs
    }
}

/// Index into a sequence that may be broadcast from length 1
#[inline]
pub(crate) fn broadcast_get<T: Copy>(values: &[T], i: usize) -> T {
    if values.len() == 1 {
        values[0]
    } else {
        values[i]
    }
}
