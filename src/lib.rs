//! # csrgraph: Compressed Sparse Row matrices for graphs
//!
//! csrgraph stores graph adjacency structures, including multigraphs, as
//! Compressed Sparse Row (CSR) matrices and provides the per-row queries,
//! structural transforms, sampling and set operations that graph learning
//! pipelines run on them.
//!
//! ## Overview
//!
//! A [`CsrMatrix`] holds `indptr`, `indices` and an optional `data` array of
//! entry IDs. Entry IDs identify edges: they survive every transform, so
//! per-edge features stored elsewhere can be re-indexed after slicing,
//! sampling or reordering. When `data` is absent the entry ID of the entry at
//! position `k` is `k` itself.
//!
//! Duplicate (row, col) entries are allowed, which makes every operation
//! multigraph-aware.
//!
//! ## Layers
//!
//! 1. **Matrix core**: construction with validation, COO conversion,
//!    transposition, device transfer and persistence
//!
//! 2. **Query**: membership tests, row degrees, entry ID lookup
//!
//! 3. **Transforms**: row slicing, submatrices, sorting, relabeling and
//!    entry removal
//!
//! 4. **Sampling**: row-wise random sampling and top-k selection
//!
//! 5. **Set operations**: unions, block-diagonal batching and duplicate
//!    removal
//!
//! ## Usage
//!
//! ```
//! use csrgraph::{CsrMatrix, IdArray};
//!
//! // indptr = [0, 2, 3, 3, 5], indices = [1, 0, 2, 3, 1], data = [0, 2, 3, 1, 4]
//! let csr = CsrMatrix::<i64>::new(
//!     4, 4,
//!     vec![0, 2, 3, 3, 5],
//!     vec![1, 0, 2, 3, 1],
//!     Some(IdArray::new(vec![0, 2, 3, 1, 4])),
//!     false,
//! );
//!
//! assert!(csr.is_nonzero(0, 1));
//! assert_eq!(csr.row_nnz(3), 2);
//! assert_eq!(csr.get_data(&[0, 2], &[0, 0]).as_slice(), &[2, -1]);
//!
//! let sorted = csr.sort();
//! assert_eq!(sorted.indices.as_slice(), &[0, 1, 2, 1, 3]);
//! assert_eq!(sorted.data.unwrap().as_slice(), &[2, 0, 3, 4, 1]);
//! ```

pub mod constants;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod query;
pub mod sampling;
pub mod serialize;
pub mod setops;
pub mod transform;
pub mod utils;

// Re-export primary components
pub use error::{CsrError, Result};
pub use matrix::{AnyIdArray, DataType, Device, IdArray, IdType};
pub use matrix::{CooMatrix, CsrMatrix, SparseFormat, SparseMatrix};
pub use matrix::config::{CsrConfig, SystemParameters};
pub use sampling::{row_wise_sampling, row_wise_topk};
pub use serialize::{load_sparse, save_sparse, SerializerEntry, SERIALIZERS};
pub use setops::{disjoint_partition_csr_by_sizes, disjoint_union_csr, union_csr};
pub use utils::{from_sprs_csr, to_sprs_csr};

/// Version information for the csrgraph library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
