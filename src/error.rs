//! Error types for csrgraph
//!
//! Contract violations detected while building or reading a matrix surface
//! as [`CsrError`]. The panicking constructors format the same variants.

use thiserror::Error;

use crate::matrix::array::{DataType, Device};

/// Result type alias using the crate's error type
pub type Result<T> = std::result::Result<T, CsrError>;

/// Errors raised when a matrix fails validation or cannot be decoded
#[derive(Error, Debug)]
pub enum CsrError {
    /// Index arrays of one matrix carry different element types
    #[error("DType mismatch: expected {expected:?}, got {got:?} for {array}")]
    DTypeMismatch {
        /// The element type required
        expected: DataType,
        /// The element type found
        got: DataType,
        /// Which array disagreed
        array: &'static str,
    },

    /// Index arrays of one matrix live on different devices
    #[error("Device mismatch: {array} is on {got:?} but indptr is on {expected:?}")]
    DeviceMismatch {
        /// Device of indptr
        expected: Device,
        /// Device of the offending array
        got: Device,
        /// Which array disagreed
        array: &'static str,
    },

    /// The element type cannot hold a row or column ID of the matrix
    #[error("{dtype:?} cannot represent dimension {value} without overflow")]
    Overflow {
        /// The index element type
        dtype: DataType,
        /// The dimension that does not fit
        value: usize,
    },

    /// indptr does not have num_rows + 1 entries
    #[error("indptr length must be num_rows + 1 = {expected}, got {got}")]
    InvalidIndptrLength {
        /// num_rows + 1
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// indptr is not a valid prefix sum
    #[error("Invalid indptr: {0}")]
    InvalidIndptr(String),

    /// Two per-entry arrays disagree in length
    #[error("Length mismatch in {context}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
        /// Where the mismatch was found
        context: &'static str,
    },

    /// A column index lies outside the column ID space
    #[error("Column index {index} out of bounds (num_cols = {bound})")]
    IndexOutOfBounds {
        /// The offending index
        index: i64,
        /// The exclusive upper bound
        bound: usize,
    },

    /// The leading magic value of a record is not the expected one
    #[error("Invalid magic number {found:#018x}, expected {expected:#018x}")]
    InvalidMagic {
        /// Magic value expected for the record
        expected: u64,
        /// Magic value read from the stream
        found: u64,
    },

    /// A record field could not be interpreted
    #[error("Invalid record: {0}")]
    InvalidFormat(String),

    /// The interchange envelope does not describe a CSR matrix
    #[error("Unsupported sparse format: {0}")]
    UnsupportedFormat(String),

    /// IO error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CsrError {
    /// Create an error for an indptr that is not a prefix sum
    pub fn invalid_indptr(reason: impl Into<String>) -> Self {
        Self::InvalidIndptr(reason.into())
    }

    /// Create an error for an unreadable record field
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat(reason.into())
    }
}
