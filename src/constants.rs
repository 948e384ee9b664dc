//! Centralized constants for the csrgraph library
//!
//! Constants are organized by category for easy reference and maintenance.

// ============================================================================
// PERSISTED FORMAT
// ============================================================================

/// Magic value opening a serialized CSR matrix record ("CSR matrix v1")
pub const CSR_MATRIX_MAGIC: u64 = 0xDD6c_d312_05df_f127;

/// Magic value opening every serialized index array record
pub const ID_ARRAY_MAGIC: u64 = 0xDD5E_40F0_96B4_A13F;

/// Reserved field written after the array magic
pub const ID_ARRAY_RESERVED: u64 = 0;

/// Elements read per step when decoding an array record
pub const READ_CHUNK_ELEMENTS: usize = 1 << 16;

// ============================================================================
// PARALLEL EXECUTION
// ============================================================================

/// Default number of rows before per-row work is spread over rayon
pub const DEFAULT_PARALLEL_ROW_THRESHOLD: usize = 4096;

/// Default number of query pairs before batched lookups run in parallel
pub const PARALLEL_QUERY_THRESHOLD: usize = 16_384;
