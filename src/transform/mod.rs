//! Structural transforms producing new matrices
//!
//! - Row slicing and induced submatrices
//! - Sorting rows in place or into a new matrix, duplicate detection
//! - Relabeling rows and columns
//! - Removing entries by entry ID
//!
//! Transposition and CSR to COO conversion live in `matrix::conversion`.

pub mod remove;
pub mod reorder;
pub mod slice;
pub mod sort;
